//! Read-only view of the hierarchical configuration store (the Windows
//! registry on Windows hosts).

use std::collections::BTreeMap;
use std::fmt;
use tracesweep_core::{SweepError, SweepResult};

/// The two root stores a scan root may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

impl Hive {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
        }
    }

    /// Splits `HKEY_...\sub\key` into its hive and subkey path. Returns `None`
    /// for any other root store.
    pub fn split(root: &str) -> Option<(Hive, &str)> {
        [Hive::LocalMachine, Hive::CurrentUser]
            .into_iter()
            .find_map(|hive| {
                let rest = root.strip_prefix(hive.prefix())?;
                if rest.is_empty() {
                    Some((hive, rest))
                } else {
                    rest.strip_prefix('\\').map(|sub| (hive, sub))
                }
            })
    }
}

/// Typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    ExpandText(String),
    MultiText(Vec<String>),
    Dword(u32),
    Qword(u64),
    Binary(Vec<u8>),
    None,
    Other(u32),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(s) | ConfigValue::ExpandText(s) => f.write_str(s),
            ConfigValue::MultiText(items) => f.write_str(&items.join(", ")),
            ConfigValue::Dword(n) => write!(f, "{}", n),
            ConfigValue::Qword(n) => write!(f, "{}", n),
            ConfigValue::Binary(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                f.write_str(&hex.join(" "))
            }
            ConfigValue::None => Ok(()),
            ConfigValue::Other(kind) => write!(f, "<opaque value kind {}>", kind),
        }
    }
}

pub trait ConfigKey {
    fn value_names(&self) -> SweepResult<Vec<String>>;

    fn value(&self, name: &str) -> SweepResult<Option<ConfigValue>>;
}

pub trait ConfigStore {
    /// `Ok(None)` when the subkey does not exist.
    fn open_subkey<'a>(
        &'a self,
        hive: Hive,
        path: &str,
    ) -> SweepResult<Option<Box<dyn ConfigKey + 'a>>>;
}

/// Store for hosts without a registry: every key is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl ConfigStore for EmptyStore {
    fn open_subkey<'a>(
        &'a self,
        _hive: Hive,
        _path: &str,
    ) -> SweepResult<Option<Box<dyn ConfigKey + 'a>>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
enum MemoryKey {
    Values(Vec<(String, Option<ConfigValue>)>),
    Denied(String),
}

/// In-memory store. Key paths compare case-insensitively, like the registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keys: BTreeMap<(Hive, String), MemoryKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key<I, S>(mut self, hive: Hive, path: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (S, ConfigValue)>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(name, value)| (name.into(), Some(value)))
            .collect();
        self.keys
            .insert((hive, path.to_lowercase()), MemoryKey::Values(values));
        self
    }

    /// A value that is listed but cannot be read back.
    pub fn with_unreadable_value(mut self, hive: Hive, path: &str, name: &str) -> Self {
        let entry = self
            .keys
            .entry((hive, path.to_lowercase()))
            .or_insert_with(|| MemoryKey::Values(Vec::new()));
        if let MemoryKey::Values(values) = entry {
            values.push((name.to_string(), None));
        }
        self
    }

    /// Opening this key fails with `message`.
    pub fn with_denied_key(mut self, hive: Hive, path: &str, message: &str) -> Self {
        self.keys.insert(
            (hive, path.to_lowercase()),
            MemoryKey::Denied(message.to_string()),
        );
        self
    }
}

struct MemoryKeyView<'a> {
    values: &'a [(String, Option<ConfigValue>)],
}

impl ConfigKey for MemoryKeyView<'_> {
    fn value_names(&self) -> SweepResult<Vec<String>> {
        Ok(self.values.iter().map(|(name, _)| name.clone()).collect())
    }

    fn value(&self, name: &str) -> SweepResult<Option<ConfigValue>> {
        Ok(self
            .values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.clone()))
    }
}

impl ConfigStore for MemoryStore {
    fn open_subkey<'a>(
        &'a self,
        hive: Hive,
        path: &str,
    ) -> SweepResult<Option<Box<dyn ConfigKey + 'a>>> {
        match self.keys.get(&(hive, path.to_lowercase())) {
            None => Ok(None),
            Some(MemoryKey::Denied(message)) => Err(SweepError::Store {
                path: format!("{}\\{}", hive.prefix(), path),
                message: message.clone(),
            }),
            Some(MemoryKey::Values(values)) => Ok(Some(Box::new(MemoryKeyView { values }))),
        }
    }
}

/// Store backing the configuration pass on this host.
pub fn host_store() -> Box<dyn ConfigStore> {
    #[cfg(windows)]
    {
        Box::new(super::registry::RegistryStore)
    }
    #[cfg(not(windows))]
    {
        Box::new(EmptyStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_known_hives() {
        assert_eq!(
            Hive::split("HKEY_LOCAL_MACHINE\\Software"),
            Some((Hive::LocalMachine, "Software"))
        );
        assert_eq!(
            Hive::split("HKEY_CURRENT_USER\\Software\\Valve\\Steam"),
            Some((Hive::CurrentUser, "Software\\Valve\\Steam"))
        );
        assert_eq!(Hive::split("HKEY_CURRENT_USER"), Some((Hive::CurrentUser, "")));
    }

    #[test]
    fn test_split_rejects_other_roots() {
        assert_eq!(Hive::split("HKEY_CLASSES_ROOT\\exefile"), None);
        assert_eq!(Hive::split("HKEY_USERS\\.DEFAULT"), None);
        assert_eq!(Hive::split("HKEY_LOCAL_MACHINEX\\Software"), None);
        assert_eq!(Hive::split(""), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ConfigValue::Text("C:\\cheat.exe".into()).to_string(), "C:\\cheat.exe");
        assert_eq!(
            ConfigValue::ExpandText("%TEMP%\\x".into()).to_string(),
            "%TEMP%\\x"
        );
        assert_eq!(
            ConfigValue::MultiText(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
        assert_eq!(ConfigValue::Dword(4096).to_string(), "4096");
        assert_eq!(ConfigValue::Qword(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(ConfigValue::Binary(vec![0x00, 0xab, 0x10]).to_string(), "00 ab 10");
        assert_eq!(ConfigValue::None.to_string(), "");
        assert_eq!(ConfigValue::Other(8).to_string(), "<opaque value kind 8>");
    }

    #[test]
    fn test_memory_store_lookup_ignores_case() {
        let store = MemoryStore::new().with_key(
            Hive::CurrentUser,
            "Software\\Tools",
            [("Launcher", ConfigValue::Text("x".into()))],
        );

        let key = store
            .open_subkey(Hive::CurrentUser, "SOFTWARE\\tools")
            .unwrap()
            .unwrap();
        assert_eq!(key.value_names().unwrap(), vec!["Launcher".to_string()]);
        assert_eq!(
            key.value("launcher").unwrap(),
            Some(ConfigValue::Text("x".into()))
        );
        assert!(store
            .open_subkey(Hive::LocalMachine, "Software\\Tools")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_memory_store_denied_key() {
        let store = MemoryStore::new().with_denied_key(
            Hive::LocalMachine,
            "Software",
            "Requested registry access is not allowed.",
        );
        let err = store
            .open_subkey(Hive::LocalMachine, "Software")
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Requested registry access is not allowed.");
    }

    #[test]
    fn test_empty_store_has_no_keys() {
        assert!(EmptyStore
            .open_subkey(Hive::LocalMachine, "Software")
            .unwrap()
            .is_none());
    }
}
