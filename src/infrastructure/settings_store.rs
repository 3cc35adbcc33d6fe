// TOML-file settings provider
use crate::application::ports::SettingsProvider;
use crate::error::SettingsError;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

#[derive(Debug)]
pub struct TomlSettingsStore {
    path: Option<PathBuf>,
    table: RwLock<Table>,
}

impl TomlSettingsStore {
    /// Open a settings file; a missing file starts out empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            toml::from_str::<Table>(&fs::read_to_string(&path)?)?
        } else {
            Table::new()
        };

        Ok(Self {
            path: Some(path),
            table: RwLock::new(table),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            table: RwLock::new(Table::new()),
        }
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut table = self.table.write();
        table.insert(key.to_string(), value);

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, toml::to_string(&*table)?)?;
        }
        Ok(())
    }
}

impl SettingsProvider for TomlSettingsStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.table.read().get(key).and_then(Value::as_bool)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        match self.table.read().get(key)? {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.table.read().get(key).and_then(Value::as_integer)
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set_value(key, Value::Boolean(value))
    }

    fn set_f64(&self, key: &str, value: f64) -> Result<(), SettingsError> {
        self.set_value(key, Value::Float(value))
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.set_value(key, Value::Integer(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_values_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let store = TomlSettingsStore::open(&path).unwrap();
        store.set_bool("notifications_enabled", true).unwrap();
        store.set_f64("fatigue_threshold", 6.5).unwrap();
        store.set_i64("early_notification_time", 60).unwrap();

        let reopened = TomlSettingsStore::open(&path).unwrap();
        assert_eq!(reopened.get_bool("notifications_enabled"), Some(true));
        assert_eq!(reopened.get_f64("fatigue_threshold"), Some(6.5));
        assert_eq!(reopened.get_i64("early_notification_time"), Some(60));
    }

    #[test]
    fn test_integer_threshold_reads_as_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "fatigue_threshold = 8\n").unwrap();

        let store = TomlSettingsStore::open(&path).unwrap();

        assert_eq!(store.get_f64("fatigue_threshold"), Some(8.0));
        assert_eq!(store.get_bool("fatigue_threshold"), None);
        assert_eq!(store.get_bool("missing"), None);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "fatigue_threshold = = 8").unwrap();

        assert!(matches!(
            TomlSettingsStore::open(&path),
            Err(SettingsError::Parse(_))
        ));
    }
}
