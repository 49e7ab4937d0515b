//! Compile-time registry of board drivers.

use crate::error::{ErrorKind, Result};
use crate::virtual_board::VirtualBoard;
use exn::OptionExt;
use syseeprom_config::BoardConfig;
use syseeprom_driver::DriverHandle;

pub type Constructor = fn(&BoardConfig) -> Result<DriverHandle>;

/// A driver and the platforms it handles.
///
/// A platform pattern is either an exact identifier or a prefix ending in
/// `*` (e.g. `"x86_64-kvm_x86_64-*"`).
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub name: &'static str,
    pub platforms: &'static [&'static str],
    construct: Constructor,
}
impl Entry {
    pub const fn new(name: &'static str, platforms: &'static [&'static str], construct: Constructor) -> Self {
        Self { name, platforms, construct }
    }

    fn matches_exactly(&self, platform: &str) -> bool {
        self.platforms.iter().any(|pattern| *pattern == platform)
    }

    fn matches(&self, platform: &str) -> bool {
        self.platforms.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => platform.starts_with(prefix),
            None => *pattern == platform,
        })
    }
}

/// Known drivers, selected once at startup.
///
/// # Examples
///
/// ```no_run
/// use syseeprom_boards::Registry;
/// use syseeprom_config::BoardConfig;
///
/// # fn example() -> syseeprom_boards::error::Result<()> {
/// let driver = Registry::builtin().resolve("x86_64-kvm_x86_64-r0", &BoardConfig::default())?;
/// assert_eq!(driver.name(), "virtual");
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    entries: Vec<Entry>,
}
impl Registry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Every driver shipped with this build.
    pub fn builtin() -> Self {
        Self::empty().with(VirtualBoard::ENTRY)
    }

    pub fn with(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Pick the entry for `platform`, unless `driver` names one directly.
    ///
    /// Exact platform matches win over prefix matches, whatever order the
    /// entries were registered in.
    pub fn find(&self, platform: &str, driver: Option<&str>) -> Result<&Entry> {
        if let Some(name) = driver {
            return self
                .entries
                .iter()
                .find(|entry| entry.name == name)
                .ok_or_raise(|| ErrorKind::UnknownDriver(name.to_string()));
        }
        self.entries
            .iter()
            .find(|entry| entry.matches_exactly(platform))
            .or_else(|| self.entries.iter().find(|entry| entry.matches(platform)))
            .ok_or_raise(|| ErrorKind::UnsupportedPlatform(platform.to_string()))
    }

    /// Construct the driver for `platform`.
    pub fn resolve(&self, platform: &str, config: &BoardConfig) -> Result<DriverHandle> {
        let entry = self.find(platform, config.driver.as_deref())?;
        tracing::info!(platform, driver = entry.name, "Selected board driver");
        (entry.construct)(config).map_err(|e| e.raise(ErrorKind::Driver(entry.name.to_string())))
    }
}
impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
