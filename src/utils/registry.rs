// src/utils/registry.rs

use std::fmt;

use winreg::{
    enums::{
        RegType::{REG_BINARY, REG_DWORD, REG_SZ},
        HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
        KEY_READ,
    },
    RegKey, RegValue,
};

use crate::errors::ActionError;

/// Typed registry payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    Dword(u32),
    String(String),
    Binary(Vec<u8>),
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValue::Dword(v) => write!(f, "Dword({})", v),
            RegistryValue::String(s) => write!(f, "String({})", s),
            RegistryValue::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
        }
    }
}

/// Splits a full registry path into its hive and subkey path.
fn split_hive(path: &str) -> Result<(RegKey, String), ActionError> {
    let (hive_name, subkey) = path.split_once('\\').ok_or_else(|| {
        ActionError::InvalidTarget(format!("registry path '{}' has no subkey", path))
    })?;
    let hive = match hive_name.to_uppercase().as_str() {
        "HKEY_LOCAL_MACHINE" | "HKLM" => HKEY_LOCAL_MACHINE,
        "HKEY_CURRENT_USER" | "HKCU" => HKEY_CURRENT_USER,
        "HKEY_CLASSES_ROOT" | "HKCR" => HKEY_CLASSES_ROOT,
        "HKEY_USERS" | "HKU" => HKEY_USERS,
        "HKEY_CURRENT_CONFIG" => HKEY_CURRENT_CONFIG,
        other => {
            return Err(ActionError::InvalidTarget(format!(
                "unsupported registry hive '{}'",
                other
            )))
        }
    };
    if subkey.is_empty() {
        return Err(ActionError::InvalidTarget(format!(
            "registry path '{}' has an empty subkey",
            path
        )));
    }
    Ok((RegKey::predef(hive), subkey.to_string()))
}

/// Reads a named value. A missing key or value is `Ok(None)`, never an
/// error.
pub fn read_value(path: &str, value_name: &str) -> Result<Option<RegistryValue>, ActionError> {
    let (hive, subkey) = split_hive(path)?;
    let key = match hive.open_subkey_with_flags(&subkey, KEY_READ) {
        Ok(key) => key,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ActionError::from_io(e, path)),
    };
    match key.get_raw_value(value_name) {
        Ok(raw) => decode(raw, path, value_name).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ActionError::from_io(e, path)),
    }
}

fn decode(raw: RegValue, path: &str, value_name: &str) -> Result<RegistryValue, ActionError> {
    match raw.vtype {
        REG_DWORD => {
            let bytes: [u8; 4] = raw
                .bytes
                .get(..4)
                .and_then(|slice| slice.try_into().ok())
                .ok_or_else(|| {
                    ActionError::Unknown(anyhow::anyhow!(
                        "REG_DWORD data too small at '{}\\{}'",
                        path,
                        value_name
                    ))
                })?;
            Ok(RegistryValue::Dword(u32::from_le_bytes(bytes)))
        }
        REG_SZ => {
            // Stop at the terminator: values written by the OS carry one,
            // values written through winreg round-trip either way.
            let wide: Vec<u16> = raw
                .bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                .take_while(|&c| c != 0)
                .collect();
            Ok(RegistryValue::String(String::from_utf16_lossy(&wide)))
        }
        REG_BINARY => Ok(RegistryValue::Binary(raw.bytes)),
        other => Err(ActionError::Unknown(anyhow::anyhow!(
            "unsupported registry value type {:?} at '{}\\{}'",
            other,
            path,
            value_name
        ))),
    }
}

/// Writes a named value, creating the key path (all missing intermediate
/// segments) first.
pub fn write_value(path: &str, value_name: &str, value: &RegistryValue) -> Result<(), ActionError> {
    let (hive, subkey) = split_hive(path)?;
    let (key, _) = hive
        .create_subkey(&subkey)
        .map_err(|e| ActionError::from_io(e, path))?;
    let written = match value {
        RegistryValue::Dword(v) => key.set_value(value_name, v),
        RegistryValue::String(s) => key.set_value(value_name, s),
        RegistryValue::Binary(bytes) => key.set_raw_value(
            value_name,
            &RegValue {
                bytes: bytes.clone(),
                vtype: REG_BINARY,
            },
        ),
    };
    written.map_err(|e| ActionError::from_io(e, path))
}

/// Whether the key itself exists.
pub fn key_exists(path: &str) -> Result<bool, ActionError> {
    let (hive, subkey) = split_hive(path)?;
    match hive.open_subkey_with_flags(&subkey, KEY_READ) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ActionError::from_io(e, path)),
    }
}

/// Removes a key and everything under it. An already-absent key is
/// success, not an error.
pub fn delete_key(path: &str) -> Result<(), ActionError> {
    let (hive, subkey) = split_hive(path)?;
    match hive.delete_subkey_all(&subkey) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ActionError::from_io(e, path)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use lazy_static::lazy_static;

    use super::*;

    lazy_static! {
        static ref TEST_MUTEX: Mutex<()> = Mutex::new(());
    }

    const TEST_ROOT: &str = "HKEY_CURRENT_USER\\Software\\WinplanTest";

    #[test]
    fn dword_round_trip_and_delete() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let path = format!("{}\\Dword", TEST_ROOT);

        write_value(&path, "Flag", &RegistryValue::Dword(1)).expect("write failed");
        assert_eq!(
            read_value(&path, "Flag").expect("read failed"),
            Some(RegistryValue::Dword(1))
        );

        delete_key(&path).expect("delete failed");
        assert_eq!(read_value(&path, "Flag").expect("read failed"), None);
    }

    #[test]
    fn string_round_trip_survives_reencoding() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let path = format!("{}\\String", TEST_ROOT);

        let value = RegistryValue::String("hello registry".to_string());
        write_value(&path, "Greeting", &value).expect("write failed");
        assert_eq!(
            read_value(&path, "Greeting").expect("read failed"),
            Some(value)
        );

        delete_key(&path).expect("delete failed");
    }

    #[test]
    fn missing_key_and_value_read_as_none() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let path = format!("{}\\DoesNotExist", TEST_ROOT);
        assert_eq!(read_value(&path, "Anything").expect("read failed"), None);

        let path = format!("{}\\Existing", TEST_ROOT);
        write_value(&path, "Present", &RegistryValue::Dword(7)).expect("write failed");
        assert_eq!(read_value(&path, "Absent").expect("read failed"), None);
        delete_key(&path).expect("delete failed");
    }

    #[test]
    fn deleting_an_absent_key_is_success() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let path = format!("{}\\NeverCreated", TEST_ROOT);
        delete_key(&path).expect("absent key must delete cleanly");
        assert!(!key_exists(&path).expect("probe failed"));
    }

    #[test]
    fn malformed_paths_are_invalid_targets() {
        for path in ["", "HKEY_CURRENT_USER", "NOT_A_HIVE\\Software", "HKCU\\"] {
            let err = read_value(path, "x").expect_err("path must be rejected");
            assert!(
                matches!(err, ActionError::InvalidTarget(_)),
                "'{}' produced {:?}",
                path,
                err
            );
        }
    }
}
