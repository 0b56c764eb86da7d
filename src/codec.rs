//! Hosts text <-> `HostsDocument`.
//!
//! Line shapes understood by [`decode`]:
//! - `<ip> <domain>... [# comment [tag, ...]]`: active entry
//! - `# <ip> <domain>... [# comment]`: disabled entry
//! - `# === Title ===`, `# SECTION: Title`, `# Short title:`: section banner
//!   (`# [off] ...` marks a disabled section)
//! - any other `#` line: standalone comment, attached to the entry directly below it
//!
//! Everything else is inert and dropped. [`encode`] writes the same shapes back,
//! so `decode(encode(d)) == d` for every document `decode` produces.

use crate::error::ParseError;
use crate::model::{HostEntry, HostsDocument, Section};
use crate::validate::validate_ip;

const SECTION_PREFIX: &str = "SECTION:";
const DISABLED_SECTION: &str = "[off]";

/// Decode raw bytes, rejecting binary or non-UTF-8 content.
pub fn decode_bytes(bytes: &[u8]) -> Result<HostsDocument, ParseError> {
    if let Some(offset) = bytes.iter().position(|b| *b == 0) {
        return Err(ParseError::Binary { offset });
    }
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    decode(text)
}

/// Parse hosts text. Malformed lines are skipped; only binary input fails.
pub fn decode(text: &str) -> Result<HostsDocument, ParseError> {
    if let Some(offset) = text.find('\0') {
        return Err(ParseError::Binary { offset });
    }
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut doc = HostsDocument::default();
    let mut pending: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending = None;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            let body = rest.trim();
            if body.is_empty() {
                continue;
            }
            if let Some(entry) = parse_entry(body, false, pending.take()) {
                doc.entries.push(entry);
            } else if let Some(section) = parse_banner(body, doc.entries.len()) {
                doc.sections.push(section);
                pending = None;
            } else {
                pending = Some(body.to_string());
            }
            continue;
        }

        if let Some(entry) = parse_entry(trimmed, true, pending.take()) {
            doc.entries.push(entry);
        }
    }

    Ok(doc)
}

/// Serialize a document. Banners are interleaved at their recorded positions.
pub fn encode(doc: &HostsDocument) -> String {
    let mut out = String::new();
    let mut cursor = 0;

    for section in &doc.sections {
        let target = section.position.min(doc.entries.len());
        while cursor < target {
            write_entry(&mut out, &doc.entries[cursor]);
            cursor += 1;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        write_banner(&mut out, section);
    }
    for entry in &doc.entries[cursor..] {
        write_entry(&mut out, entry);
    }
    out
}

fn parse_entry(line: &str, enabled: bool, pending: Option<String>) -> Option<HostEntry> {
    let (entry_part, inline) = match line.split_once('#') {
        Some((e, c)) => (e, Some(c.trim())),
        None => (line, None),
    };

    let mut tokens = entry_part.split_whitespace();
    let ip = tokens.next()?;
    if !validate_ip(ip) {
        return None;
    }
    let domains: Vec<String> = tokens.map(String::from).collect();
    if domains.is_empty() {
        return None;
    }

    let comment_text = match inline {
        Some(c) if !c.is_empty() => Some(c.to_string()),
        _ => pending,
    };
    let (comment, tags) = comment_text
        .as_deref()
        .map(split_comment)
        .unwrap_or((None, None));

    Some(HostEntry {
        enabled,
        ip: ip.to_string(),
        domains,
        comment,
        tags,
    })
}

/// Split `note [a, b]` into the comment and its trailing tag group.
fn split_comment(text: &str) -> (Option<String>, Option<Vec<String>>) {
    let text = text.trim();
    if let Some(open) = text.rfind('[').filter(|_| text.ends_with(']')) {
        let tags: Vec<String> = text[open + 1..text.len() - 1]
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let comment = text[..open].trim();
        return (
            non_empty(comment),
            if tags.is_empty() { None } else { Some(tags) },
        );
    }
    (non_empty(text), None)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_banner(body: &str, position: usize) -> Option<Section> {
    let (enabled, text) = match body.strip_prefix(DISABLED_SECTION) {
        Some(rest) => (false, rest.trim()),
        None => (true, body),
    };

    let title = match strip_section_prefix(text) {
        Some(title) => title,
        None if is_banner_title(text) => text,
        None => return None,
    };

    Some(Section {
        title: title.to_string(),
        enabled,
        position,
    })
}

fn strip_section_prefix(text: &str) -> Option<&str> {
    let head = text.get(..SECTION_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(SECTION_PREFIX) {
        return None;
    }
    let title = text[SECTION_PREFIX.len()..].trim();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn is_banner_title(text: &str) -> bool {
    text.contains("===")
        || text.contains("---")
        || (text.ends_with(':')
            && text.chars().count() < 30
            && !text.to_lowercase().contains("example"))
}

fn write_banner(out: &mut String, section: &Section) {
    out.push_str("# ");
    if !section.enabled {
        out.push_str(DISABLED_SECTION);
        out.push(' ');
    }
    // Titles that would not decode back as themselves get the explicit prefix.
    let bare = is_banner_title(&section.title)
        && strip_section_prefix(&section.title).is_none()
        && !section.title.starts_with(DISABLED_SECTION)
        && parse_entry(&section.title, false, None).is_none();
    if !bare {
        out.push_str(SECTION_PREFIX);
        out.push(' ');
    }
    out.push_str(&section.title);
    out.push('\n');
}

fn write_entry(out: &mut String, entry: &HostEntry) {
    if !entry.enabled {
        out.push_str("# ");
    }
    out.push_str(&entry.ip);
    out.push('\t');
    out.push_str(&entry.domains.join(" "));

    let mut note = entry.comment.clone().unwrap_or_default();
    if let Some(tags) = entry.tags.as_ref().filter(|t| !t.is_empty()) {
        if !note.is_empty() {
            note.push(' ');
        }
        note.push('[');
        note.push_str(&tags.join(", "));
        note.push(']');
    }
    if !note.is_empty() {
        out.push_str(" # ");
        out.push_str(&note);
    }
    out.push('\n');
}
