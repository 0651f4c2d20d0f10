use std::{fs, io::ErrorKind, path::PathBuf};

use crate::error::FavoritesError;

/// Saved city labels, in display order, mirrored to a JSON array on disk.
///
/// Every successful mutation rewrites the whole file. Mutations take
/// `&mut self`, so a store shared between threads has to sit behind a lock.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    items: Vec<String>,
}

impl FavoritesStore {
    /// Empty store bound to `path`; nothing is read or written.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    /// Read the store. A missing file is an empty list; anything unreadable is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FavoritesError> {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::empty(path)),
            Err(source) => return Err(FavoritesError::Io { path, source }),
        };

        let mut items: Vec<String> = match serde_json::from_str(&contents) {
            Ok(items) => items,
            Err(source) => return Err(FavoritesError::Corrupt { path, source }),
        };

        // Keep the first occurrence if the file was edited by hand.
        let mut seen = std::collections::HashSet::new();
        items.retain(|item| seen.insert(item.clone()));

        Ok(Self { path, items })
    }

    /// Like [`FavoritesStore::load`], but treats a failed load as "no favorites yet".
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::load(path.clone()).unwrap_or_else(|e| {
            tracing::warn!("{e}; starting with no favorites");
            Self::empty(path)
        })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, label: &str) -> bool {
        self.items.iter().any(|i| i == label)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append `label` and persist. Returns `Ok(false)` for a duplicate.
    pub fn add(&mut self, label: &str) -> Result<bool, FavoritesError> {
        if self.contains(label) {
            return Ok(false);
        }

        self.items.push(label.to_string());
        if let Err(e) = self.save() {
            self.items.pop();
            return Err(e);
        }

        tracing::info!(%label, "favorite added");
        Ok(true)
    }

    /// Remove `label` and persist. Returns `Ok(false)` when it was not stored.
    pub fn remove(&mut self, label: &str) -> Result<bool, FavoritesError> {
        let Some(index) = self.items.iter().position(|i| i == label) else {
            return Ok(false);
        };

        let removed = self.items.remove(index);
        if let Err(e) = self.save() {
            self.items.insert(index, removed);
            return Err(e);
        }

        tracing::info!(%label, "favorite removed");
        Ok(true)
    }

    fn save(&self) -> Result<(), FavoritesError> {
        let io_err = |source| FavoritesError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.items).map_err(|source| {
            FavoritesError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn on_disk(path: &Path) -> Vec<String> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::load(dir.path().join("favorites.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_is_distinguishable_from_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        let err = FavoritesStore::load(&path).unwrap_err();
        assert!(matches!(err, FavoritesError::Corrupt { .. }));

        let store = FavoritesStore::load_or_default(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn add_appends_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let mut store = FavoritesStore::load(&path).unwrap();

        assert!(store.add("London").unwrap());
        assert!(store.add("Paris").unwrap());

        assert_eq!(store.items(), ["London", "Paris"]);
        assert_eq!(on_disk(&path), ["London", "Paris"]);
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let mut store = FavoritesStore::load(&path).unwrap();

        store.add("London").unwrap();
        assert!(!store.add("London").unwrap());
        assert_eq!(on_disk(&path), ["London"]);

        // Exact match only.
        assert!(store.add("london").unwrap());
        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn remove_shrinks_by_one_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        let mut store = FavoritesStore::load(&path).unwrap();
        store.add("London").unwrap();
        store.add("Paris").unwrap();

        assert!(store.remove("London").unwrap());
        assert_eq!(store.items(), ["Paris"]);
        assert_eq!(on_disk(&path), ["Paris"]);

        assert!(!store.remove("Berlin").unwrap());
        assert_eq!(store.items(), ["Paris"]);
    }

    #[test]
    fn reload_round_trips_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.json");
        let mut store = FavoritesStore::load(&path).unwrap();
        store.add("Tokyo").unwrap();
        store.add("Lima").unwrap();

        let reloaded = FavoritesStore::load(&path).unwrap();
        assert_eq!(reloaded.items(), ["Tokyo", "Lima"]);
    }

    #[test]
    fn failed_save_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("favorites.json");
        fs::create_dir(&path).unwrap();

        let mut store = FavoritesStore::empty(&path);
        let err = store.add("London").unwrap_err();
        assert!(matches!(err, FavoritesError::Io { .. }));
        assert!(store.is_empty());
    }
}
