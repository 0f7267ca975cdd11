use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::session::{Session, SessionKind};

/// Durable storage for API sessions, one slot per [`SessionKind`].
///
/// Each slot is a JSON file in the store directory. `read` only ever
/// returns a usable session: stale, malformed, or unreadable entries
/// all read as a miss. Stale entries are left on disk; deleting a slot
/// is the gateway's call, made when the server explicitly rejects the
/// session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn slot_path(&self, kind: SessionKind) -> PathBuf {
        self.dir.join(kind.slot_file())
    }

    /// Fresh session for `kind`, or `None` on any kind of miss.
    pub fn read(&self, kind: SessionKind) -> Option<Session> {
        let path = self.slot_path(kind);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return None,
        };

        let session: Session = match serde_json::from_str(&contents) {
            Ok(session) => session,
            Err(e) => {
                // Malformed entries self-heal on the next write
                debug!(kind = %kind, error = %e, "Discarding malformed session entry");
                return None;
            }
        };

        if session.is_stale() {
            debug!(kind = %kind, "Cached session is stale");
            return None;
        }

        Some(session)
    }

    /// Persist `session` into the slot for `kind`, replacing any prior
    /// entry.
    pub fn write(&self, kind: SessionKind, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create session directory: {}", self.dir.display())
        })?;
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(self.slot_path(kind), contents)
            .with_context(|| format!("Failed to write {} session", kind))?;
        Ok(())
    }

    /// Delete the slot for `kind`. Deleting an absent slot is a no-op.
    pub fn invalidate(&self, kind: SessionKind) -> Result<()> {
        let path = self.slot_path(kind);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {} session", kind))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn write_then_read_round_trips_per_kind() {
        let (_dir, store) = store();
        store
            .write(SessionKind::User, &Session::new("user-tok", None))
            .unwrap();
        store
            .write(SessionKind::Public, &Session::new("public-tok", None))
            .unwrap();

        assert_eq!(store.read(SessionKind::User).unwrap().token, "user-tok");
        assert_eq!(store.read(SessionKind::Public).unwrap().token, "public-tok");
    }

    #[test]
    fn write_replaces_the_prior_entry() {
        let (_dir, store) = store();
        store
            .write(SessionKind::Public, &Session::new("old", None))
            .unwrap();
        store
            .write(SessionKind::Public, &Session::new("new", None))
            .unwrap();
        assert_eq!(store.read(SessionKind::Public).unwrap().token, "new");
    }

    #[test]
    fn read_after_invalidate_is_a_miss() {
        let (_dir, store) = store();
        store
            .write(SessionKind::User, &Session::new("tok", None))
            .unwrap();
        store.invalidate(SessionKind::User).unwrap();
        assert!(store.read(SessionKind::User).is_none());
    }

    #[test]
    fn invalidate_is_idempotent() {
        let (_dir, store) = store();
        store.invalidate(SessionKind::Public).unwrap();
        store.invalidate(SessionKind::Public).unwrap();
    }

    #[test]
    fn stale_entry_reads_as_miss_but_stays_on_disk() {
        let (dir, store) = store();
        let soon = Some(Utc::now() + Duration::seconds(10));
        store
            .write(SessionKind::Public, &Session::new("tok", soon))
            .unwrap();

        assert!(store.read(SessionKind::Public).is_none());
        assert!(dir.path().join(SessionKind::Public.slot_file()).exists());
    }

    #[test]
    fn malformed_entry_reads_as_miss_without_error() {
        let (dir, store) = store();
        std::fs::write(
            dir.path().join(SessionKind::User.slot_file()),
            "{not json at all",
        )
        .unwrap();

        assert!(store.read(SessionKind::User).is_none());

        // and the slot self-heals on the next write
        store
            .write(SessionKind::User, &Session::new("fixed", None))
            .unwrap();
        assert_eq!(store.read(SessionKind::User).unwrap().token, "fixed");
    }

    #[test]
    fn missing_directory_reads_as_miss() {
        let store = SessionStore::new(PathBuf::from("/nonexistent/modshelf-test"));
        assert!(store.read(SessionKind::User).is_none());
    }
}
