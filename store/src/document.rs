//! JSON document persistence.
//!
//! The store owns the path to the document and serialises access to
//! it. Saving goes through a temp file in the same directory followed
//! by a rename, so a crash mid-write can never leave a torn document
//! behind and readers only ever observe complete states.
use crate::StoreError;
use quadra_core::state::Tournament;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct DocumentStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles; a single writer suffices
    /// for the document's consistency model.
    lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DocumentStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document; an absent file yields the default
    /// settings with no categories.
    pub fn load(&self) -> Result<Tournament, StoreError> {
        let _guard = self.lock.lock().expect("document lock");
        self.read_unlocked()
    }

    /// Replace the whole document.
    pub fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let _guard = self.lock.lock().expect("document lock");
        self.write_unlocked(tournament)
    }

    /// One serialised read-modify-write cycle. The closure's changes
    /// are persisted only when it succeeds.
    pub fn update<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Tournament) -> Result<T, quadra_core::Error>,
    {
        let _guard = self.lock.lock().expect("document lock");
        let mut tournament = self.read_unlocked()?;
        let value = f(&mut tournament)?;
        self.write_unlocked(&tournament)?;
        Ok(value)
    }

    fn read_unlocked(&self) -> Result<Tournament, StoreError> {
        if !self.path.exists() {
            return Ok(Tournament::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write_unlocked(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tournament)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadra_core::clock::Minutes;

    #[test]
    fn absent_file_yields_default_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("tournament.json"));
        let tournament = store.load().unwrap();
        assert!(tournament.categories.is_empty());
        assert_eq!(
            tournament.settings.estimated_match_duration,
            Minutes::from(20)
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("tournament.json"));
        let mut tournament = store.load().unwrap();
        tournament.settings.estimated_match_duration = Minutes::from(25);
        store.save(&tournament).unwrap();
        let back = store.load().unwrap();
        assert_eq!(back.settings.estimated_match_duration, Minutes::from(25));
    }

    #[test]
    fn update_commits_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("tournament.json"));
        let failed: Result<(), StoreError> = store.update(|tournament| {
            tournament.settings.estimated_match_duration = Minutes::from(45);
            Err(quadra_core::ops::OpsError::MatchNotFound("nope".into()).into())
        });
        assert!(failed.is_err());
        let back = store.load().unwrap();
        assert_eq!(
            back.settings.estimated_match_duration,
            Minutes::from(20)
        );
    }
}
