//! EasyHosts - hosts file editor with backups, profiles and remote lists.

pub mod backup;
pub mod cli;
pub mod codec;
pub mod config;
pub mod conflicts;
pub mod doctor;
pub mod error;
pub mod filter;
pub mod history;
pub mod hosts;
pub mod interchange;
pub mod logging;
pub mod merge;
pub mod model;
pub mod platform;
pub mod profile;
pub mod rawedit;
pub mod remote;
pub mod store;
pub mod validate;

pub use error::{HostsError, ParseError, ValidationError};
pub use model::{HostEntry, HostsDocument, Section};
