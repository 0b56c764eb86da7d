//! Unix (macOS, Linux) platform implementations.

use std::io;

use super::Privilege;

pub const HOSTS_PATH: &str = "/etc/hosts";

/// Stock loopback mappings written by `reset`.
pub const DEFAULT_HOSTS: &str = "\
# /etc/hosts: static table lookup for hostnames.
#
# Each line maps an IP address to one or more host names:
#   <ip-address>  <hostname> [aliases...]

127.0.0.1\tlocalhost
::1\tlocalhost ip6-localhost ip6-loopback
";

/// Elevated means effective uid 0.
pub struct UnixPrivilege;

impl Privilege for UnixPrivilege {
    fn is_elevated(&self) -> bool {
        // SAFETY: geteuid takes no arguments and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
}

/// Rename failures that mean "this path cannot be replaced", not "no access".
///
/// EBUSY: the target is a mount point (Docker bind-mounts /etc/hosts).
/// EXDEV: temp file and target ended up on different filesystems.
pub fn rename_refused(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EBUSY) | Some(libc::EXDEV))
}
