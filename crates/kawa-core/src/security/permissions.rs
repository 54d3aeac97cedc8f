//! File permission handling for extracted entries.

/// Permission bits kept from an archive entry: read, write and execute for
/// user, group and other.
const PERMISSION_MASK: u32 = 0o777;

/// Strips setuid, setgid, sticky and file-type bits from a declared mode.
///
/// # Examples
///
/// ```
/// use kawa_core::security::sanitize_permissions;
///
/// assert_eq!(sanitize_permissions(0o100_755), 0o755);
/// assert_eq!(sanitize_permissions(0o4755), 0o755);
/// ```
#[must_use]
pub const fn sanitize_permissions(mode: u32) -> u32 {
    mode & PERMISSION_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_rwx() {
        assert_eq!(sanitize_permissions(0o644), 0o644);
        assert_eq!(sanitize_permissions(0o755), 0o755);
    }

    #[test]
    fn test_sanitize_strips_special_bits() {
        assert_eq!(sanitize_permissions(0o6755), 0o755);
        assert_eq!(sanitize_permissions(0o1777), 0o777);
    }
}
