//! Platform identification.
//!
//! Resolved once at startup, in order: configuration override, the
//! `PLATFORM` environment variable, then the machine configuration file
//! written by the installer (`onie_platform=` or `aboot_platform=`).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::fs;
use syseeprom_config::PlatformConfig;
use tracing::instrument;

pub const PLATFORM_ENV: &str = "PLATFORM";
const MACHINE_CONF_KEYS: [&str; 2] = ["onie_platform", "aboot_platform"];

/// Identify the platform this process runs on.
pub fn identify(config: &PlatformConfig) -> Result<String> {
    identify_with(config, std::env::var(PLATFORM_ENV).ok())
}

#[instrument(level = "debug", skip(config), fields(machine_conf = %config.machine_conf.display()))]
pub(crate) fn identify_with(config: &PlatformConfig, env: Option<String>) -> Result<String> {
    if let Some(name) = &config.name {
        return Ok(name.trim().to_string());
    }
    if let Some(name) = env
        && !name.trim().is_empty()
    {
        return Ok(name.trim().to_string());
    }
    let path = &config.machine_conf;
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => exn::bail!(ErrorKind::PlatformUndetected),
        Err(err) => return Err(err).or_raise(|| ErrorKind::MachineConf(path.clone())),
    };
    parse_machine_conf(&content).ok_or_raise(|| ErrorKind::PlatformUndetected)
}

/// Extract the platform identifier from machine configuration content.
///
/// ```
/// use syseeprom_boards::parse_machine_conf;
///
/// let conf = "onie_arch=x86_64\nonie_platform=x86_64-kvm_x86_64-r0\n";
/// assert_eq!(parse_machine_conf(conf).as_deref(), Some("x86_64-kvm_x86_64-r0"));
/// ```
pub fn parse_machine_conf(content: &str) -> Option<String> {
    let entries: HashMap<&str, &str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect();
    MACHINE_CONF_KEYS
        .iter()
        .filter_map(|key| entries.get(key))
        .find(|value| !value.is_empty())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    fn config(machine_conf: &Path, name: Option<&str>) -> PlatformConfig {
        PlatformConfig { machine_conf: machine_conf.to_path_buf(), name: name.map(str::to_string) }
    }

    #[rstest]
    #[case("onie_platform=x86_64-kvm_x86_64-r0", Some("x86_64-kvm_x86_64-r0"))]
    #[case("aboot_platform=x86_64-arista_7050_qx32", Some("x86_64-arista_7050_qx32"))]
    #[case("onie_platform=\"x86_64-quoted-r0\"", Some("x86_64-quoted-r0"))]
    #[case("  onie_platform = x86_64-spaced-r0  ", Some("x86_64-spaced-r0"))]
    #[case("aboot_platform=second\nonie_platform=first", Some("first"))]
    #[case("onie_platform=\naboot_platform=fallback", Some("fallback"))]
    #[case("# onie_platform=commented\nonie_arch=x86_64", None)]
    #[case("", None)]
    #[case("garbage without equals", None)]
    fn test_parse_machine_conf(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_machine_conf(content).as_deref(), expected);
    }

    #[test]
    fn test_config_override_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conf = temp_dir.path().join("machine.conf");
        fs::write(&conf, "onie_platform=from-file").unwrap();
        let platform = identify_with(&config(&conf, Some("from-config")), Some("from-env".to_string())).unwrap();
        assert_eq!(platform, "from-config");
    }

    #[test]
    fn test_env_beats_machine_conf() {
        let temp_dir = tempfile::tempdir().unwrap();
        let conf = temp_dir.path().join("machine.conf");
        fs::write(&conf, "onie_platform=from-file").unwrap();
        assert_eq!(identify_with(&config(&conf, None), Some("from-env".to_string())).unwrap(), "from-env");
        // Blank environment values are ignored.
        assert_eq!(identify_with(&config(&conf, None), Some("  ".to_string())).unwrap(), "from-file");
    }

    #[test]
    fn test_missing_machine_conf() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = identify_with(&config(&temp_dir.path().join("absent"), None), None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::PlatformUndetected));
    }

    #[test]
    fn test_unreadable_machine_conf() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory can't be read as a file.
        let err = identify_with(&config(temp_dir.path(), None), None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MachineConf(_)));
    }
}
