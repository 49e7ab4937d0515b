use crate::error::{ErrorKind, Result};

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Refuse to continue unless running as the superuser.
pub fn require_root() -> Result<()> {
    if !is_root() {
        exn::bail!(ErrorKind::NotRoot);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_root_follows_euid() {
        match is_root() {
            true => require_root().unwrap(),
            false => {
                let err = require_root().unwrap_err();
                assert!(matches!(&*err, ErrorKind::NotRoot));
                assert_eq!((*err).to_string(), "Root privileges are required for this operation");
            },
        }
    }
}
