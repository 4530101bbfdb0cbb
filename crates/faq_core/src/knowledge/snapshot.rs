use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::Chunk;
use crate::error::{codes, AppError};

use super::KnowledgeBase;

/// One chunk record as written by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    pub id: u64,
    pub text: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    pub embedding: Vec<f32>,
    // Verified on load when present.
    #[serde(default)]
    pub text_sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotFile {
    #[serde(default)]
    pub dims: Option<usize>,
    pub chunks: Vec<SnapshotRecord>,
}

/// Load a knowledge base snapshot, picking the format from the file extension:
/// `.json` for JSON, `.sqlite` / `.sqlite3` / `.db` for SQLite.
pub fn load_snapshot(path: &Path) -> Result<KnowledgeBase, AppError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => load_json_snapshot(path),
        "sqlite" | "sqlite3" | "db" => load_sqlite_snapshot(path),
        _ => Err(AppError::new(
            codes::KB_LOAD_FAILED,
            "Unsupported knowledge base snapshot format",
        )
        .with_details(format!("path={}", path.display()))),
    }
}

pub fn load_json_snapshot(path: &Path) -> Result<KnowledgeBase, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new(codes::KB_LOAD_FAILED, "Failed to read knowledge base snapshot")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    parse_json_snapshot(&bytes).map_err(|e| {
        if e.details.is_none() {
            e.with_details(format!("path={}", path.display()))
        } else {
            e
        }
    })
}

pub fn parse_json_snapshot(bytes: &[u8]) -> Result<KnowledgeBase, AppError> {
    let file: SnapshotFile = serde_json::from_slice(bytes).map_err(|e| {
        AppError::new(codes::KB_LOAD_FAILED, "Failed to decode knowledge base snapshot")
            .with_details(e.to_string())
    })?;
    KnowledgeBase::new(into_chunks(file.chunks, file.dims)?)
}

/// Read the `chunks` table of a SQLite snapshot. Embeddings are little-endian `f32` blobs.
pub fn load_sqlite_snapshot(path: &Path) -> Result<KnowledgeBase, AppError> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
        AppError::new(codes::KB_LOAD_FAILED, "Failed to open SQLite snapshot")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;

    let mut stmt = conn
        .prepare("SELECT id, text, source, page, embedding FROM chunks ORDER BY id")
        .map_err(|e| {
            AppError::new(codes::KB_LOAD_FAILED, "Failed to query snapshot chunks")
                .with_details(e.to_string())
        })?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, Vec<u8>>(4)?,
            ))
        })
        .map_err(|e| {
            AppError::new(codes::KB_LOAD_FAILED, "Failed to read snapshot chunks")
                .with_details(e.to_string())
        })?;

    let mut records = Vec::new();
    for r in rows {
        let (id, text, source, page, blob) = r.map_err(|e| {
            AppError::new(codes::KB_LOAD_FAILED, "Failed to read snapshot chunk row")
                .with_details(e.to_string())
        })?;
        let id = u64::try_from(id).map_err(|_| {
            AppError::new(codes::KB_INVALID, "Chunk id must be non-negative")
                .with_details(format!("id={id}"))
        })?;
        let page = page
            .map(u32::try_from)
            .transpose()
            .map_err(|_| {
                AppError::new(codes::KB_INVALID, "Chunk page is out of range")
                    .with_details(format!("chunk_id={id}"))
            })?;
        records.push(SnapshotRecord {
            id,
            text,
            source,
            page,
            embedding: decode_embedding(id, &blob)?,
            text_sha256: None,
        });
    }

    KnowledgeBase::new(into_chunks(records, None)?)
}

fn decode_embedding(chunk_id: u64, blob: &[u8]) -> Result<Vec<f32>, AppError> {
    if blob.len() % 4 != 0 {
        return Err(AppError::new(
            codes::KB_INVALID,
            "Embedding blob length is not a multiple of 4",
        )
        .with_details(format!("chunk_id={}; bytes={}", chunk_id, blob.len())));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Encode an embedding the way [`load_sqlite_snapshot`] expects it.
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn into_chunks(
    records: Vec<SnapshotRecord>,
    declared_dims: Option<usize>,
) -> Result<Vec<Chunk>, AppError> {
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        if let Some(dims) = declared_dims {
            if rec.embedding.len() != dims {
                return Err(AppError::new(
                    codes::KB_INVALID,
                    "Chunk embedding does not match declared dims",
                )
                .with_details(format!(
                    "chunk_id={}; expected={}; got={}",
                    rec.id,
                    dims,
                    rec.embedding.len()
                )));
            }
        }
        if let Some(expected) = rec.text_sha256.as_deref() {
            let actual = text_sha256(&rec.text);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(AppError::new(
                    codes::KB_INVALID,
                    "Chunk text does not match its recorded sha256",
                )
                .with_details(format!(
                    "chunk_id={}; expected={}; got={}",
                    rec.id, expected, actual
                )));
            }
        }
        out.push(Chunk {
            id: rec.id,
            text: rec.text,
            source: rec.source,
            page: rec.page,
            embedding: rec.embedding,
        });
    }
    Ok(out)
}

pub fn text_sha256(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
