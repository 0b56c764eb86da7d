//! Windows platform implementations.

use std::io;
use std::path::PathBuf;

use super::Privilege;

/// `%SystemRoot%\System32\drivers\etc\hosts`.
pub fn hosts_path() -> PathBuf {
    let root = std::env::var("SystemRoot").unwrap_or_else(|_| r"C:\Windows".to_string());
    PathBuf::from(root)
        .join("System32")
        .join("drivers")
        .join("etc")
        .join("hosts")
}

/// The sample file Windows ships with.
pub const DEFAULT_HOSTS: &str = "\
# Copyright (c) 1993-2009 Microsoft Corp.
#
# This is a sample HOSTS file used by Microsoft TCP/IP for Windows.
#
# This file contains the mappings of IP addresses to host names. Each
# entry should be kept on an individual line. The IP address should
# be placed in the first column followed by the corresponding host name.
# The IP address and the host name should be separated by at least one
# space.
#
# Additionally, comments (such as these) may be inserted on individual
# lines or following the machine name denoted by a '#' symbol.
#
# For example:
#
#      102.54.94.97     rhino.acme.com          # source server
#       38.25.63.10     x.acme.com              # x client host

# localhost name resolution is handled within DNS itself.
#\t127.0.0.1       localhost
#\t::1             localhost
";

/// Elevated means the hosts file can be opened for appending.
pub struct WindowsPrivilege {
    path: PathBuf,
}

impl WindowsPrivilege {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Privilege for WindowsPrivilege {
    fn is_elevated(&self) -> bool {
        std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .is_ok()
    }
}

/// Windows renames replace the target in place; no fallback applies.
pub fn rename_refused(_err: &io::Error) -> bool {
    false
}
