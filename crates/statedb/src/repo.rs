//! Repository for stored EEPROM images.

use crate::Database;
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqlitePool;
use time::UtcDateTime;

/// A stored EEPROM image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub content: Vec<u8>,
    pub written_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    key: String,
    content: Vec<u8>,
    content_hash: String,
    written_at: i64,
}
impl TryFrom<RecordRow> for Record {
    type Error = Error;
    fn try_from(row: RecordRow) -> std::result::Result<Self, Self::Error> {
        if content_hash(&row.content) != row.content_hash {
            exn::bail!(ErrorKind::InvalidData("content hash mismatch"));
        }
        Ok(Self {
            key: row.key,
            content: row.content,
            written_at: UtcDateTime::from_unix_timestamp(row.written_at)
                .or_raise(|| ErrorKind::InvalidData("write timestamp"))?,
        })
    }
}

fn content_hash(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// Keyed access to the `eeprom_info` table.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the image stored under `key`.
    ///
    /// Returns [`ErrorKind::InvalidData`] if the stored content no longer
    /// matches the hash it was written with.
    pub async fn get(&self, key: &str) -> Result<Option<Record>> {
        let row: Option<RecordRow> = sqlx::query_as(include_str!("../queries/get_record.sql"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Record::try_from).transpose()
    }

    /// Insert or replace the image stored under `key`.
    pub async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        sqlx::query(include_str!("../queries/upsert_record.sql"))
            .bind(key)
            .bind(content)
            .bind(content_hash(content))
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    async fn repository() -> Repository {
        Repository::from(&Database::connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_missing_key() {
        let repo = repository().await;
        assert!(repo.get("syseeprom").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let repo = repository().await;
        repo.put("syseeprom", b"first").await.unwrap();
        repo.put("syseeprom", b"second").await.unwrap();
        let record = repo.get("syseeprom").await.unwrap().unwrap();
        assert_eq!(record.key, "syseeprom");
        assert_eq!(record.content, b"second");
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM eeprom_info").fetch_one(&repo.pool).await.unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let repo = repository().await;
        repo.put("a", b"one").await.unwrap();
        repo.put("b", b"two").await.unwrap();
        repo.put("a", b"three").await.unwrap();
        assert_eq!(repo.get("a").await.unwrap().unwrap().content, b"three");
        assert_eq!(repo.get("b").await.unwrap().unwrap().content, b"two");
    }

    #[rstest]
    #[case::content("UPDATE eeprom_info SET content = x'666f72676564' WHERE key = 'syseeprom'")]
    #[case::hash("UPDATE eeprom_info SET content_hash = 'deadbeef' WHERE key = 'syseeprom'")]
    #[case::emptied("UPDATE eeprom_info SET content = x'' WHERE key = 'syseeprom'")]
    #[tokio::test]
    async fn test_tampered_record_is_rejected(#[case] tamper: &str) {
        let repo = repository().await;
        repo.put("syseeprom", b"genuine").await.unwrap();
        sqlx::query(tamper).execute(&repo.pool).await.unwrap();
        let err = repo.get("syseeprom").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData(_)));
    }
}
