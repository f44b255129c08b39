use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use shared::types::Result;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::lsa::LsaModel;

/// SQLite store for one fitted model, keyed by a fingerprint of the corpus
/// and fit parameters.
pub struct IndexStorage {
    conn: Connection,
}

impl IndexStorage {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open index store {}", db_path.display()))?;
        Self::setup_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup_db(&conn)?;
        Ok(Self { conn })
    }

    fn setup_db(conn: &Connection) -> SqlResult<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS models (
                fingerprint TEXT PRIMARY KEY,
                vectorizer BLOB NOT NULL,
                svd BLOB NOT NULL,
                doc_vectors BLOB NOT NULL,
                created_at INTEGER NOT NULL
            );
        ",
        )
    }

    pub fn load(&self, fingerprint: &str) -> Result<Option<LsaModel>> {
        let row = self
            .conn
            .query_row(
                "SELECT vectorizer, svd, doc_vectors FROM models WHERE fingerprint = ?1",
                [fingerprint],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((vectorizer, svd, doc_vectors)) = row else {
            return Ok(None);
        };
        let model = LsaModel {
            vectorizer: serde_json::from_slice(&vectorizer)
                .context("corrupt stored vectorizer")?,
            svd: serde_json::from_slice(&svd).context("corrupt stored svd")?,
            doc_vectors: serde_json::from_slice(&doc_vectors)
                .context("corrupt stored document vectors")?,
        };
        Ok(Some(model))
    }

    /// Store `model` under `fingerprint`, dropping any model stored for a
    /// different corpus.
    pub fn save(&self, fingerprint: &str, model: &LsaModel) -> Result<()> {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let tx = self.conn.unchecked_transaction()?;
        let stale = "DELETE FROM models WHERE fingerprint != ?1";
        tx.execute(stale, [fingerprint])?;
        tx.execute(
            "INSERT OR REPLACE INTO models (fingerprint, vectorizer, svd, doc_vectors, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fingerprint,
                serde_json::to_vec(&model.vectorizer)?,
                serde_json::to_vec(&model.svd)?,
                serde_json::to_vec(&model.doc_vectors)?,
                created_at
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn fingerprints(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT fingerprint FROM models")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<SqlResult<Vec<String>>>()?)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM models", [])?;
        Ok(())
    }
}
