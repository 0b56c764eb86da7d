//! JSON and hosts-format export/import.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{HostsError, Result};
use crate::model::{HostEntry, HostsDocument, Section};
use crate::validate;

pub const EXPORT_VERSION: u32 = 1;

fn default_version() -> u32 {
    EXPORT_VERSION
}

/// Export file: a serialized document plus version and export time.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEnvelope {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(flatten)]
    pub document: HostsDocument,
}

/// Shapes `import_json` accepts: our envelope, a bare document, or the
/// desktop app's `{ version, timestamp, hosts_data: { entries, sections } }`.
#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    hosts_data: Option<HostsDocument>,
    #[serde(default)]
    entries: Option<Vec<HostEntry>>,
    #[serde(default)]
    sections: Option<Vec<Section>>,
}

pub fn export_json(doc: &HostsDocument) -> Result<String> {
    let envelope = ExportEnvelope {
        version: EXPORT_VERSION,
        exported_at: Some(chrono::Local::now().to_rfc3339()),
        document: doc.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse and validate an export. The document is returned only when every
/// entry and section passes validation, so it encodes to exactly these lines.
pub fn import_json(json: &str) -> Result<HostsDocument> {
    let file: ImportFile = serde_json::from_str(json)?;
    if file.version > EXPORT_VERSION {
        return Err(HostsError::UnsupportedVersion {
            found: file.version,
            supported: EXPORT_VERSION,
        });
    }
    let doc = match (file.hosts_data, file.entries) {
        (Some(doc), _) => doc,
        (None, Some(entries)) => HostsDocument::new(entries, file.sections.unwrap_or_default()),
        (None, None) => return Err(HostsError::NotAnExport),
    };
    validate::validate_document(&doc)?;
    Ok(doc)
}

pub fn export_hosts(doc: &HostsDocument) -> String {
    codec::encode(doc)
}

pub fn import_hosts(text: &str) -> Result<HostsDocument> {
    Ok(codec::decode(text)?)
}
