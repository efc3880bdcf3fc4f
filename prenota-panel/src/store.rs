use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use parking_lot::Mutex;
use prenota_core::{PreferenceStore, StoreError};

/// Preferences kept as a flat JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store. A missing file starts empty, an unreadable one is
    /// discarded with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt preferences in {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());

        let raw = serde_json::to_string_pretty(&*values)?;
        fs::write(&self.path, raw)?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use prenota_core::{ChatHistory, PanelPreferences, ViewMode};

    use super::*;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = FileStore::open(&path).unwrap();
        let mut prefs = PanelPreferences::load(&store);
        prefs.cycle_view_mode();
        prefs.save(&store).unwrap();

        let mut history = ChatHistory::load(&store);
        history.ask("Siete aperti domenica?");
        history.persist(&store);

        let reopened = FileStore::open(&path).unwrap();

        assert_eq!(PanelPreferences::load(&reopened).view_mode, ViewMode::Tabella);
        assert_eq!(ChatHistory::load(&reopened).messages().len(), 2);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);

        store.set("galax_admin_sound", "0").unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("galax_admin_sound").as_deref(), Some("0"));
    }
}
