//! Windows registry backend.

use super::store::{ConfigKey, ConfigStore, ConfigValue, Hive};
use std::io;
use tracesweep_core::{SweepError, SweepResult};
use winreg::enums::{RegType, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};
use winreg::{RegKey, RegValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStore;

struct RegistryKey {
    key: RegKey,
    path: String,
}

impl RegistryKey {
    fn failure(&self, err: io::Error) -> SweepError {
        SweepError::Store {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

impl ConfigStore for RegistryStore {
    fn open_subkey<'a>(
        &'a self,
        hive: Hive,
        path: &str,
    ) -> SweepResult<Option<Box<dyn ConfigKey + 'a>>> {
        let root = match hive {
            Hive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
            Hive::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        };
        let full_path = format!("{}\\{}", hive.prefix(), path);

        match root.open_subkey_with_flags(path, KEY_READ) {
            Ok(key) => Ok(Some(Box::new(RegistryKey {
                key,
                path: full_path,
            }))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SweepError::Store {
                path: full_path,
                message: err.to_string(),
            }),
        }
    }
}

impl ConfigKey for RegistryKey {
    fn value_names(&self) -> SweepResult<Vec<String>> {
        self.key
            .enum_values()
            .map(|item| item.map(|(name, _)| name))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|err| self.failure(err))
    }

    fn value(&self, name: &str) -> SweepResult<Option<ConfigValue>> {
        match self.key.get_raw_value(name) {
            Ok(raw) => Ok(Some(convert(raw))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.failure(err)),
        }
    }
}

fn convert(raw: RegValue) -> ConfigValue {
    match raw.vtype {
        RegType::REG_SZ => ConfigValue::Text(utf16_text(&raw.bytes)),
        RegType::REG_EXPAND_SZ => ConfigValue::ExpandText(utf16_text(&raw.bytes)),
        RegType::REG_MULTI_SZ => ConfigValue::MultiText(
            utf16_text(&raw.bytes)
                .split('\0')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        RegType::REG_DWORD => match <[u8; 4]>::try_from(raw.bytes.as_slice()) {
            Ok(bytes) => ConfigValue::Dword(u32::from_le_bytes(bytes)),
            Err(_) => ConfigValue::Binary(raw.bytes),
        },
        RegType::REG_QWORD => match <[u8; 8]>::try_from(raw.bytes.as_slice()) {
            Ok(bytes) => ConfigValue::Qword(u64::from_le_bytes(bytes)),
            Err(_) => ConfigValue::Binary(raw.bytes),
        },
        RegType::REG_BINARY => ConfigValue::Binary(raw.bytes),
        RegType::REG_NONE => ConfigValue::None,
        other => ConfigValue::Other(other as u32),
    }
}

fn utf16_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_convert_text_kinds() {
        let raw = RegValue {
            bytes: utf16("C:\\trainer.exe\0"),
            vtype: RegType::REG_SZ,
        };
        assert_eq!(convert(raw), ConfigValue::Text("C:\\trainer.exe".into()));

        let raw = RegValue {
            bytes: utf16("a\0b\0\0"),
            vtype: RegType::REG_MULTI_SZ,
        };
        assert_eq!(
            convert(raw),
            ConfigValue::MultiText(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_convert_numbers() {
        let raw = RegValue {
            bytes: 7u32.to_le_bytes().to_vec(),
            vtype: RegType::REG_DWORD,
        };
        assert_eq!(convert(raw), ConfigValue::Dword(7));
    }

    #[test]
    fn test_missing_key_is_absent() {
        let key = RegistryStore
            .open_subkey(Hive::CurrentUser, "Software\\tracesweep-test-key-that-does-not-exist")
            .unwrap();
        assert!(key.is_none());
    }
}
