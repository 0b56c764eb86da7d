//! Error types shared by the codec, validators and persistence gateway.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Catastrophic decode failure: the input is not hosts-file text at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input contains binary data (NUL byte at offset {offset})")]
    Binary { offset: usize },

    #[error("input is not valid UTF-8 (first bad byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

/// Field a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ip,
    Domain,
    Domains,
    Tags,
    Tag,
    Url,
    Name,
    Ssid,
    Comment,
    Section,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Ip => "ip",
            Field::Domain => "domain",
            Field::Domains => "domains",
            Field::Tags => "tags",
            Field::Tag => "tag",
            Field::Url => "url",
            Field::Name => "name",
            Field::Ssid => "ssid",
            Field::Comment => "comment",
            Field::Section => "section title",
        };
        f.write_str(s)
    }
}

/// The specific rule a value broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    Empty,
    InvalidIpLiteral,
    TooLong { max: usize },
    LabelEmpty,
    LabelTooLong { max: usize },
    LabelCharacters,
    LabelHyphen,
    TooMany { max: usize },
    TagCharacters,
    ControlCharacters,
    UrlScheme,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Empty => write!(f, "must not be empty"),
            ValidationRule::InvalidIpLiteral => write!(f, "not an IPv4 or IPv6 literal"),
            ValidationRule::TooLong { max } => write!(f, "longer than {max} characters"),
            ValidationRule::LabelEmpty => write!(f, "contains an empty label"),
            ValidationRule::LabelTooLong { max } => {
                write!(f, "contains a label longer than {max} characters")
            }
            ValidationRule::LabelCharacters => {
                write!(f, "labels may only contain letters, digits and hyphens")
            }
            ValidationRule::LabelHyphen => write!(f, "labels cannot start or end with a hyphen"),
            ValidationRule::TooMany { max } => write!(f, "more than {max} items"),
            ValidationRule::TagCharacters => write!(f, "may not contain ',', '[', ']' or '#'"),
            ValidationRule::ControlCharacters => {
                write!(f, "may not contain line breaks or control characters")
            }
            ValidationRule::UrlScheme => write!(f, "must start with http:// or https://"),
        }
    }
}

/// A field failed a format or limit rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} {value:?}: {rule}")]
pub struct ValidationError {
    pub field: Field,
    pub rule: ValidationRule,
    pub value: String,
}

impl ValidationError {
    pub fn new(field: Field, rule: ValidationRule, value: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HostsError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("not a backup of the hosts file: {}", path.display())]
    NotABackup { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve {domain}: {source}")]
    Resolve {
        domain: String,
        #[source]
        source: io::Error,
    },

    #[error("fetch {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("unsupported export version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("JSON has neither \"entries\" nor \"hosts_data\"; not a hosts export")]
    NotAnExport,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl HostsError {
    /// Classify an I/O failure against the path it happened on.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => HostsError::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotFound => HostsError::NotFound {
                path: path.to_path_buf(),
            },
            _ => HostsError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, HostsError::PermissionDenied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HostsError::NotFound { .. })
    }
}

pub type Result<T, E = HostsError> = std::result::Result<T, E>;
