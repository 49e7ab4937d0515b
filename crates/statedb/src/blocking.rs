//! Synchronous facade over the state database.

use crate::error::{ErrorKind, Result};
use crate::{Database, Repository};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use tokio::runtime::{Builder, Runtime};

struct Connection {
    runtime: Runtime,
    db: Database,
    repo: Repository,
}

/// State database usable from synchronous code.
///
/// Nothing is opened until the first read or write, so constructing one for
/// an invocation that never touches the database tier costs nothing. Each
/// operation runs to completion on a private current-thread runtime.
///
/// # Examples
///
/// ```no_run
/// use syseeprom_statedb::BlockingStateDb;
///
/// # fn example() -> syseeprom_statedb::error::Result<()> {
/// let mut db = BlockingStateDb::new("/var/lib/decode-syseeprom/state.db");
/// db.write("syseeprom", b"...")?;
/// assert!(db.read("syseeprom")?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct BlockingStateDb {
    path: PathBuf,
    connection: Option<Connection>,
}
impl BlockingStateDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), connection: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            if let Some(parent) = self.path.parent()
                && let Err(err) = std::fs::create_dir_all(parent)
            {
                // The connect below reports the failure that matters.
                tracing::debug!(path = %parent.display(), error = %err, "Could not create state database directory");
            }
            let runtime = Builder::new_current_thread().enable_all().build().or_raise(|| ErrorKind::Runtime)?;
            let db = runtime.block_on(Database::connect(&self.path))?;
            let repo = Repository::from(&db);
            tracing::debug!(path = %self.path.display(), "State database opened");
            self.connection = Some(Connection { runtime, db, repo });
        }
        self.connection.as_ref().ok_or_raise(|| ErrorKind::Database)
    }

    /// Contents stored under `key`, if any.
    pub fn read(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.connect()?;
        let record = conn.runtime.block_on(conn.repo.get(key))?;
        Ok(record.map(|r| r.content))
    }

    /// Store `content` under `key`, replacing whatever was there.
    pub fn write(&mut self, key: &str, content: &[u8]) -> Result<()> {
        let conn = self.connect()?;
        conn.runtime.block_on(conn.repo.put(key, content))
    }
}
impl Drop for BlockingStateDb {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.runtime.block_on(conn.db.close());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_opened_until_used() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.db");
        let db = BlockingStateDb::new(&path);
        assert_eq!(db.path(), path);
        drop(db);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_then_read_across_instances() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/state.db");
        let mut first = BlockingStateDb::new(&path);
        assert!(first.read("syseeprom").unwrap().is_none());
        first.write("syseeprom", b"image").unwrap();
        drop(first);
        let mut second = BlockingStateDb::new(&path);
        assert_eq!(second.read("syseeprom").unwrap().as_deref(), Some(&b"image"[..]));
    }

    #[test]
    fn test_unopenable_path_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let mut db = BlockingStateDb::new(blocker.join("state.db"));
        let err = db.read("syseeprom").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Database));
    }
}
