//! Seed sets and the store reset utility
//!
//! A seed file is a JSON array of documents, or an object with a
//! `documents` array. Resetting deletes every stored document and loads the
//! seed set through `put_doc`. Seeded instances without metadata are
//! stamped with seed origin on the way in.

use crate::error::SeedError;
use crate::store::DocumentStore;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use slotgraph_document::{Document, Meta, Origin};
use std::path::Path;

/// Counts reported by [`reset_store`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetStats {
    /// Documents removed
    pub deleted: usize,
    /// Seed documents written
    pub loaded: usize,
}

/// Read a seed file from disk
///
/// # Errors
/// - `SeedError::Io` if the file cannot be read
/// - `SeedError::Json` if it is not JSON
/// - `SeedError::InvalidEntry` if an entry is not a document
pub async fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<Document>, SeedError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::io_error(path, e))?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| SeedError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let docs = parse_seed(value)?;
    tracing::debug!(path = %path.display(), count = docs.len(), "loaded seed file");
    Ok(docs)
}

/// Interpret a JSON value as a seed set
///
/// # Errors
/// Returns `SeedError::InvalidEntry` for the first entry that is not a document
pub fn parse_seed(value: Value) -> Result<Vec<Document>, SeedError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("documents") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(SeedError::InvalidEntry {
                    index: 0,
                    message: "expected an array or an object with a `documents` array".to_string(),
                })
            }
        },
        _ => {
            return Err(SeedError::InvalidEntry {
                index: 0,
                message: "seed must be an array of documents".to_string(),
            })
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Document::from_value(entry).map_err(|e| SeedError::InvalidEntry {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Replace the whole store content with `seed`
///
/// # Errors
/// Returns the first store error; documents handled before it stay changed
pub async fn reset_store<S>(store: &S, seed: &[Document]) -> Result<ResetStats, SeedError>
where
    S: DocumentStore + ?Sized,
{
    let mut stats = ResetStats::default();
    for header in store.list_doc_headers().await? {
        store.delete_doc(&header.id).await?;
        stats.deleted += 1;
    }
    let at = Utc::now();
    for doc in seed {
        if doc.id.is_instance() && doc.meta.is_none() {
            let mut stamped = doc.clone();
            stamped.meta = Some(Meta::new(Origin::Seed, at));
            store.put_doc(&stamped).await?;
        } else {
            store.put_doc(doc).await?;
        }
        stats.loaded += 1;
    }
    tracing::info!(deleted = stats.deleted, loaded = stats.loaded, "store reset");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn parses_array_and_wrapped_forms() {
        let array = parse_seed(json!([{ "id": "type:a" }, { "id": "inst:b" }])).unwrap();
        let wrapped = parse_seed(json!({ "documents": [{ "id": "type:a" }] })).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn rejects_non_document_entry() {
        let err = parse_seed(json!([{ "id": "type:a" }, 7])).unwrap_err();
        assert!(matches!(err, SeedError::InvalidEntry { index: 1, .. }));
    }

    #[tokio::test]
    async fn reset_replaces_content() {
        let store = MemoryStore::with_documents([Document::new("inst:old"), Document::new("type:old")]);
        let seed = vec![Document::new("type:new")];
        let stats = reset_store(&store, &seed).await.unwrap();

        assert_eq!(stats, ResetStats { deleted: 2, loaded: 1 });
        assert_eq!(store.len(), 1);
        assert!(store.peek(&"type:new".into()).is_some());
    }

    #[tokio::test]
    async fn seeded_instances_get_seed_origin() {
        let store = MemoryStore::new();
        let mut kept = Document::new("inst:kept");
        kept.meta = Some(Meta::new(Origin::Direct, Utc::now()));
        let seed = vec![Document::new("type:a"), Document::new("inst:fresh"), kept];

        reset_store(&store, &seed).await.unwrap();

        let origin = |id: &str| store.peek(&id.into()).and_then(|d| d.meta).map(|m| m.origin);
        assert_eq!(origin("type:a"), None);
        assert_eq!(origin("inst:fresh"), Some(Origin::Seed));
        assert_eq!(origin("inst:kept"), Some(Origin::Direct));
    }

    #[tokio::test]
    async fn reset_stops_on_missing_id() {
        let store = MemoryStore::new();
        let seed = vec![Document::new("type:a"), Document::default()];
        let err = reset_store(&store, &seed).await.unwrap_err();
        assert!(matches!(err, SeedError::Store(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn loads_seed_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!([{ "id": "type:a", "name": "A" }])).unwrap();
        let docs = load_seed_file(file.path()).await.unwrap();
        assert_eq!(docs[0].name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn missing_seed_file_is_io_error() {
        let err = load_seed_file("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
