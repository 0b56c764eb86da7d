//! Field validation for hosts entries (IP, hostname, tag limits).

use std::net::IpAddr;

use crate::error::{Field, ValidationError, ValidationRule};
use crate::model::{HostEntry, HostsDocument, Section};

pub const MAX_DOMAIN_LEN: usize = 253;
pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_DOMAINS: usize = 100;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 50;

/// Characters that would break the inline `[tag, ...]` encoding.
const TAG_FORBIDDEN: &[char] = &[',', '[', ']', '#'];

/// Trim and drop `< > ' "` from user input before it is validated.
pub fn sanitize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"'))
        .collect()
}

/// IPv4 dotted quad or IPv6 literal (`::` compression and IPv4 tails allowed).
pub fn validate_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

pub fn check_ip(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::new(Field::Ip, ValidationRule::Empty, s));
    }
    if !validate_ip(s) {
        return Err(ValidationError::new(
            Field::Ip,
            ValidationRule::InvalidIpLiteral,
            s,
        ));
    }
    Ok(())
}

pub fn validate_domain(s: &str) -> bool {
    check_domain(s).is_ok()
}

/// Hostname rules: labels of 1-63 letters, digits or hyphens, no hyphen at
/// either end of a label, 253 characters overall.
pub fn check_domain(s: &str) -> Result<(), ValidationError> {
    let fail = |rule| Err(ValidationError::new(Field::Domain, rule, s));
    if s.is_empty() {
        return fail(ValidationRule::Empty);
    }
    if s.len() > MAX_DOMAIN_LEN {
        return fail(ValidationRule::TooLong {
            max: MAX_DOMAIN_LEN,
        });
    }
    for label in s.split('.') {
        if label.is_empty() {
            return fail(ValidationRule::LabelEmpty);
        }
        if label.len() > MAX_LABEL_LEN {
            return fail(ValidationRule::LabelTooLong { max: MAX_LABEL_LEN });
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return fail(ValidationRule::LabelCharacters);
        }
        if label.starts_with('-') || label.ends_with('-') {
            return fail(ValidationRule::LabelHyphen);
        }
    }
    Ok(())
}

pub fn check_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new(
            Field::Tags,
            ValidationRule::TooMany { max: MAX_TAGS },
            tags.join(", "),
        ));
    }
    for tag in tags {
        if tag.is_empty() {
            return Err(ValidationError::new(Field::Tag, ValidationRule::Empty, tag));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(ValidationError::new(
                Field::Tag,
                ValidationRule::TooLong { max: MAX_TAG_LEN },
                tag,
            ));
        }
        if has_control(tag) {
            return Err(ValidationError::new(
                Field::Tag,
                ValidationRule::ControlCharacters,
                tag,
            ));
        }
        if tag.contains(TAG_FORBIDDEN) {
            return Err(ValidationError::new(
                Field::Tag,
                ValidationRule::TagCharacters,
                tag,
            ));
        }
    }
    Ok(())
}

/// Line breaks and other control characters; tab is ordinary hosts-file whitespace.
fn has_control(s: &str) -> bool {
    s.chars().any(|c| c.is_control() && c != '\t')
}

/// Free text written after `#` must stay on its line.
pub fn check_comment(comment: &str) -> Result<(), ValidationError> {
    if has_control(comment) {
        return Err(ValidationError::new(
            Field::Comment,
            ValidationRule::ControlCharacters,
            comment,
        ));
    }
    Ok(())
}

pub fn validate_section(section: &Section) -> Result<(), ValidationError> {
    let fail = |rule| Err(ValidationError::new(Field::Section, rule, &section.title));
    if section.title.trim().is_empty() {
        return fail(ValidationRule::Empty);
    }
    if has_control(&section.title) {
        return fail(ValidationRule::ControlCharacters);
    }
    Ok(())
}

/// Validate every entry and section of a document from an untrusted source.
pub fn validate_document(doc: &HostsDocument) -> Result<(), ValidationError> {
    for entry in &doc.entries {
        validate_entry(entry)?;
    }
    for section in &doc.sections {
        validate_section(section)?;
    }
    Ok(())
}

/// Validate a whole entry, reporting the first rule it breaks.
pub fn validate_entry(entry: &HostEntry) -> Result<(), ValidationError> {
    check_ip(&entry.ip)?;
    if entry.domains.is_empty() {
        return Err(ValidationError::new(Field::Domains, ValidationRule::Empty, ""));
    }
    if entry.domains.len() > MAX_DOMAINS {
        return Err(ValidationError::new(
            Field::Domains,
            ValidationRule::TooMany { max: MAX_DOMAINS },
            format!("{} domains", entry.domains.len()),
        ));
    }
    for d in &entry.domains {
        check_domain(d)?;
    }
    if let Some(comment) = &entry.comment {
        check_comment(comment)?;
    }
    if let Some(tags) = &entry.tags {
        check_tags(tags)?;
    }
    Ok(())
}

/// Build a validated entry from form-style input: whitespace-separated
/// domains and comma-separated tags. Every field is sanitized first.
pub fn entry_from_input(
    ip: &str,
    domains: &str,
    comment: Option<&str>,
    tags: Option<&str>,
) -> Result<HostEntry, ValidationError> {
    let ip = sanitize(ip);
    let domains: Vec<String> = sanitize(domains)
        .split_whitespace()
        .map(String::from)
        .collect();
    let comment = comment.map(sanitize).filter(|c| !c.is_empty());
    let tags = tags
        .map(|t| {
            sanitize(t)
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|t| !t.is_empty());

    let entry = HostEntry {
        enabled: true,
        ip,
        domains,
        comment,
        tags,
    };
    validate_entry(&entry)?;
    Ok(entry)
}

/// Remote source URLs must be http or https with a host part.
pub fn check_url(url: &str) -> Result<(), ValidationError> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(r) if !r.is_empty() && !r.starts_with('/') => Ok(()),
        _ => Err(ValidationError::new(Field::Url, ValidationRule::UrlScheme, url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_boundaries() {
        assert!(validate_ip("127.0.0.1"));
        assert!(validate_ip("255.255.255.255"));
        assert!(!validate_ip("256.1.1.1"));
        assert!(!validate_ip("1.2.3"));
        assert!(!validate_ip("1.2.3.4.5"));
        assert!(!validate_ip(""));
    }

    #[test]
    fn ipv6_forms() {
        assert!(validate_ip("::1"));
        assert!(validate_ip("fe80::1"));
        assert!(validate_ip("2001:0db8:85a3::8a2e:0370:7334"));
        assert!(validate_ip("::ffff:192.168.1.1"));
        assert!(!validate_ip("gggg::1"));
        assert!(!validate_ip("1::2::3"));
    }

    #[test]
    fn domain_rules() {
        assert!(validate_domain("example.com"));
        assert!(validate_domain("localhost"));
        assert!(validate_domain("my-host.lan"));
        assert!(!validate_domain(""));
        assert!(!validate_domain(&format!("{}.com", "a".repeat(64))));
        assert!(validate_domain(&format!("{}.com", "a".repeat(63))));
        assert!(!validate_domain("-bad.com"));
        assert!(!validate_domain("bad-.com"));
        assert!(!validate_domain("bad..com"));
        assert!(!validate_domain("under_score.com"));
    }

    #[test]
    fn domain_total_length_cap() {
        let label = "a".repeat(63);
        let ok = format!("{label}.{label}.{label}.{}", &label[..61]);
        assert_eq!(ok.len(), 253);
        assert!(validate_domain(&ok));
        let too_long = format!("{label}.{label}.{label}.{}", &label[..62]);
        let err = check_domain(&too_long).unwrap_err();
        assert_eq!(err.rule, ValidationRule::TooLong { max: 253 });
    }

    #[test]
    fn entry_reports_specific_rule() {
        let e = HostEntry::new("1.1.1.1", vec![]);
        let err = validate_entry(&e).unwrap_err();
        assert_eq!(err.field, Field::Domains);
        assert_eq!(err.rule, ValidationRule::Empty);

        let e = HostEntry::new("1.1.1.1", vec!["a.test".into()])
            .with_tags((0..21).map(|i| format!("t{i}")));
        let err = validate_entry(&e).unwrap_err();
        assert_eq!(err.field, Field::Tags);

        let e = HostEntry::new("1.1.1.1", vec!["a.test".into()]).with_tags(["x".repeat(51)]);
        assert_eq!(validate_entry(&e).unwrap_err().field, Field::Tag);

        let e = HostEntry::new("1.1.1.1", vec!["a.test".into()]).with_tags(["a,b"]);
        assert_eq!(
            validate_entry(&e).unwrap_err().rule,
            ValidationRule::TagCharacters
        );

        let e = HostEntry::new("1.1.1.1", (0..101).map(|i| format!("h{i}.test")).collect());
        assert_eq!(
            validate_entry(&e).unwrap_err().rule,
            ValidationRule::TooMany { max: 100 }
        );
    }

    #[test]
    fn sanitize_strips_markup_characters() {
        assert_eq!(sanitize("  <a.test>  "), "a.test");
        assert_eq!(sanitize("\"it's\""), "its");
    }

    #[test]
    fn entry_from_form_input() {
        let e = entry_from_input(
            " 10.0.0.5 ",
            "api.test  www.api.test",
            Some("  staging "),
            Some("dev, , api"),
        )
        .unwrap();
        assert_eq!(e.ip, "10.0.0.5");
        assert_eq!(e.domains, vec!["api.test", "www.api.test"]);
        assert_eq!(e.comment.as_deref(), Some("staging"));
        assert_eq!(e.tags, Some(vec!["dev".to_string(), "api".to_string()]));

        let e = entry_from_input("10.0.0.5", "a.test", Some(""), Some(" ")).unwrap();
        assert!(e.comment.is_none());
        assert!(e.tags.is_none());

        assert!(entry_from_input("999.0.0.1", "a.test", None, None).is_err());
    }

    #[test]
    fn line_breaks_in_free_text_are_rejected() {
        let err = entry_from_input(
            "127.0.0.1",
            "a.test",
            Some("note\n6.6.6.6 bank.test"),
            Some("x"),
        )
        .unwrap_err();
        assert_eq!(err.field, Field::Comment);
        assert_eq!(err.rule, ValidationRule::ControlCharacters);

        let err = entry_from_input("127.0.0.1", "a.test", None, Some("ok, bad\rtag")).unwrap_err();
        assert_eq!(err.field, Field::Tag);
        assert_eq!(err.rule, ValidationRule::ControlCharacters);

        let e = HostEntry::new("127.0.0.1", vec!["a.test".into()]).with_comment("bell\u{7}");
        assert_eq!(
            validate_entry(&e).unwrap_err().rule,
            ValidationRule::ControlCharacters
        );
        let e = HostEntry::new("127.0.0.1", vec!["a.test".into()]).with_comment("tab\tok");
        assert!(validate_entry(&e).is_ok());
    }

    #[test]
    fn section_titles_stay_on_one_line() {
        assert!(validate_section(&Section::new("=== Work ===", 0)).is_ok());
        let err = validate_section(&Section::new("Work\n1.1.1.1 x.test", 0)).unwrap_err();
        assert_eq!(err.field, Field::Section);
        assert_eq!(err.rule, ValidationRule::ControlCharacters);
        assert_eq!(
            validate_section(&Section::new("  ", 0)).unwrap_err().rule,
            ValidationRule::Empty
        );
    }

    #[test]
    fn document_validation_reports_first_bad_entry() {
        let doc = HostsDocument::new(
            vec![
                HostEntry::new("1.1.1.1", vec!["a.test".into()]),
                HostEntry::new("garbage", vec![]),
            ],
            vec![],
        );
        let err = validate_document(&doc).unwrap_err();
        assert_eq!(err.field, Field::Ip);
        assert_eq!(err.value, "garbage");
    }

    #[test]
    fn url_needs_http_scheme_and_host() {
        assert!(check_url("https://example.com/hosts").is_ok());
        assert!(check_url("HTTP://example.com").is_ok());
        assert!(check_url("ftp://example.com").is_err());
        assert!(check_url("https://").is_err());
        assert_eq!(check_url("example.com").unwrap_err().field, Field::Url);
    }
}
