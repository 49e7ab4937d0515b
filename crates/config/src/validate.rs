//! Checks applied to configuration values after extraction.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path};

/// Configured locations are always absolute; a relative path would depend on
/// whatever directory the tool happened to be started from.
pub(crate) fn absolute(key: &'static str, path: &Path) -> Result<()> {
    if !path.is_absolute() {
        exn::bail!(ErrorKind::Invalid { key, reason: format!("`{}` is not an absolute path", path.display()) });
    }
    Ok(())
}

/// A record name must be exactly one normal path component, so the record
/// can never land outside its root.
pub(crate) fn record_name(key: &'static str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if !part.as_encoded_bytes().contains(&0) => Ok(()),
        _ => exn::bail!(ErrorKind::Invalid { key, reason: format!("`{name}` is not a plain file name") }),
    }
}

/// Names used for lookups (platforms, drivers) must not be blank.
pub(crate) fn not_blank(key: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        exn::bail!(ErrorKind::Invalid { key, reason: "value is empty".to_string() });
    }
    Ok(())
}
