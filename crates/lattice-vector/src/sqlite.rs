//! `sqlite` backend: the flat in-memory index persisted as a SQLite file.
//!
//! Each persist builds a fresh database beside the target and renames it
//! over the old one, so readers of the file never see a half-written index.

use std::path::Path;

use lattice_core::errors::{PersistenceError, VectorError};
use lattice_core::models::VectorHit;
use lattice_core::traits::IVectorIndex;
use rusqlite::{params, Connection, OpenFlags};

use crate::atomic_write::{commit, ensure_parent, io_err, temp_path};
use crate::flat::FlatVectorIndex;

const SCHEMA: &str = "
CREATE TABLE meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
CREATE TABLE vectors (
    position  INTEGER PRIMARY KEY,
    id        TEXT NOT NULL UNIQUE,
    embedding BLOB NOT NULL
);
";

fn sqlite_err(e: rusqlite::Error) -> PersistenceError {
    PersistenceError::Sqlite {
        reason: e.to_string(),
    }
}

fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[derive(Debug, Default)]
pub struct SqliteVectorIndex {
    inner: FlatVectorIndex,
}

impl SqliteVectorIndex {
    pub fn new(parallel_threshold: usize) -> Self {
        Self {
            inner: FlatVectorIndex::new(parallel_threshold),
        }
    }

    fn write_db(
        path: &Path,
        dims: Option<usize>,
        entries: &[(String, Vec<f32>)],
    ) -> Result<(), PersistenceError> {
        let mut conn = Connection::open(path).map_err(sqlite_err)?;
        conn.execute_batch(SCHEMA).map_err(sqlite_err)?;
        let tx = conn.transaction().map_err(sqlite_err)?;
        tx.execute(
            "INSERT INTO meta (key, value) VALUES ('dimensions', ?1)",
            params![dims.unwrap_or(0).to_string()],
        )
        .map_err(sqlite_err)?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO vectors (position, id, embedding) VALUES (?1, ?2, ?3)")
                .map_err(sqlite_err)?;
            for (pos, (id, v)) in entries.iter().enumerate() {
                stmt.execute(params![pos as i64, id, f32_vec_to_bytes(v)])
                    .map_err(sqlite_err)?;
            }
        }
        tx.commit().map_err(sqlite_err)?;
        conn.close().map_err(|(_, e)| sqlite_err(e))
    }

    fn read_db(path: &Path) -> Result<(Option<usize>, Vec<(String, Vec<f32>)>), PersistenceError> {
        let corrupt = |reason: String| PersistenceError::Corrupt {
            path: path.display().to_string(),
            reason,
        };
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(sqlite_err)?;
        let dims: String = conn
            .query_row("SELECT value FROM meta WHERE key = 'dimensions'", [], |row| row.get(0))
            .map_err(|e| corrupt(format!("missing dimensions: {e}")))?;
        let dims: usize = dims
            .parse()
            .map_err(|e| corrupt(format!("bad dimensions {dims:?}: {e}")))?;

        let mut stmt = conn
            .prepare("SELECT id, embedding FROM vectors ORDER BY position")
            .map_err(|e| corrupt(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((id, blob))
            })
            .map_err(sqlite_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, blob) = row.map_err(sqlite_err)?;
            if blob.len() != dims * 4 {
                return Err(corrupt(format!(
                    "vector {id} has {} bytes, expected {}",
                    blob.len(),
                    dims * 4
                )));
            }
            entries.push((id, bytes_to_f32_vec(&blob)));
        }
        Ok(((dims > 0).then_some(dims), entries))
    }
}

impl IVectorIndex for SqliteVectorIndex {
    fn add(&self, id: &str, embedding: &[f32]) -> Result<(), VectorError> {
        self.inner.add(id, embedding)
    }

    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorHit>, VectorError> {
        self.inner.query(embedding, k)
    }

    fn remove(&self, id: &str) -> bool {
        self.inner.remove(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.inner.dimensions()
    }

    fn persist(&self, path: &Path) -> Result<(), PersistenceError> {
        ensure_parent(path)?;
        let tmp = temp_path(path);
        if tmp.exists() {
            std::fs::remove_file(&tmp).map_err(|e| io_err(&tmp, e))?;
        }
        let (dims, entries) = self.inner.export();
        let result = Self::write_db(&tmp, dims, &entries).and_then(|()| commit(&tmp, path));
        if result.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        result
    }

    fn load(&self, path: &Path) -> Result<(), PersistenceError> {
        if !path.exists() {
            return Err(PersistenceError::Io {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        let (dims, entries) = Self::read_db(path)?;
        self.inner.replace(dims, entries).map_err(|e| PersistenceError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
