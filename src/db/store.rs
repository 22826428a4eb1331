use std::fs;
use std::path::PathBuf;

use parking_lot::{Mutex, MutexGuard};

use crate::db::Snapshot;
use crate::error::AppError;

/// File-backed store for the whole [`Snapshot`] document.
///
/// The document is the unit of persistence: an operation takes the lock,
/// loads, mutates in memory, and saves the whole thing back. The lock
/// serializes operations within the process so that two writers never race
/// on the file.
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Takes the exclusive lock. The guard must be held for the duration of
    /// one load-mutate-save cycle.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Reads the current document. On first run the file does not exist yet;
    /// an empty document is persisted and returned.
    pub fn load(&self) -> Result<Snapshot, AppError> {
        if !self.path.exists() {
            let snapshot = Snapshot::default();
            self.save(&snapshot)?;
            return Ok(snapshot);
        }
        let content = fs::read_to_string(&self.path)?;
        // files edited by hand on Windows sometimes grow a BOM
        let content = content.trim_start_matches('\u{FEFF}');
        Ok(serde_json::from_str(content)?)
    }

    /// Persists the document, replacing any prior content.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(snapshot)?)?;
        Ok(())
    }

    /// Rewrites the document as an empty one.
    pub fn reset(&self) -> Result<(), AppError> {
        let _guard = self.lock();
        self.save(&Snapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_creates_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("db.json");
        let store = Store::new(path.clone());

        let snapshot = store.load().expect("load");
        assert!(snapshot.users.is_empty());
        assert!(snapshot.scores.is_empty());
        assert!(snapshot.achievements.is_empty());
        assert!(snapshot.tournaments.is_empty());
        assert!(snapshot.activities.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("db.json"));

        let mut snapshot = store.load().expect("load");
        snapshot.users.push(crate::db::User {
            id: crate::db::UserId::random(),
            username: "nova".to_string(),
            email: "nova@x.io".to_string(),
            password: "pw123".to_string(),
            role: crate::db::Role::User,
            status: crate::db::UserStatus::Active,
            created_at: chrono::Utc::now(),
        });
        store.save(&snapshot).expect("save");

        let reloaded = store.load().expect("reload");
        assert_eq!(reloaded.users.len(), 1);
        assert_eq!(reloaded.users[0].username, "nova");
    }

    #[test]
    fn load_tolerates_byte_order_mark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("db.json");
        let store = Store::new(path.clone());
        store.load().expect("create");

        let content = std::fs::read_to_string(&path).expect("read");
        std::fs::write(&path, format!("\u{FEFF}{content}")).expect("write");
        store.load().expect("load with BOM");
    }

    #[test]
    fn reset_clears_the_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("db.json"));

        let mut snapshot = store.load().expect("load");
        snapshot.users.push(crate::db::User {
            id: crate::db::UserId::random(),
            username: "nova".to_string(),
            email: "nova@x.io".to_string(),
            password: "pw123".to_string(),
            role: crate::db::Role::User,
            status: crate::db::UserStatus::Active,
            created_at: chrono::Utc::now(),
        });
        store.save(&snapshot).expect("save");

        store.reset().expect("reset");
        assert!(store.load().expect("reload").users.is_empty());
    }
}
