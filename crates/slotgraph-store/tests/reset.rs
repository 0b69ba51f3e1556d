//! Reset utility against the cached store

use pretty_assertions::assert_eq;
use slotgraph_document::{DocId, Document};
use slotgraph_store::{load_seed_file, reset_store, CachedStore, DocumentStore, MemoryStore, ResetStats};
use std::io::Write;

#[tokio::test]
async fn reset_through_cache_drops_stale_entries() {
    let inner = MemoryStore::with_documents(vec![Document::new("type:old").with_name("Old")]);
    let store = CachedStore::new(inner.clone(), 16);
    assert!(store.get_doc(&DocId::type_id("old")).await.unwrap().is_some());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "documents": [
            {{ "id": "type:door", "name": "Door" }},
            {{ "id": "inst:d1", "type": "type:door" }}
        ] }}"#
    )
    .unwrap();
    let seed = load_seed_file(file.path()).await.unwrap();

    let stats = reset_store(&store, &seed).await.unwrap();
    assert_eq!(stats, ResetStats { deleted: 1, loaded: 2 });
    assert!(store.get_doc(&DocId::type_id("old")).await.unwrap().is_none());

    let ids: Vec<DocId> = store
        .list_doc_headers()
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(ids, vec![DocId::instance_id("d1"), DocId::type_id("door")]);
    assert_eq!(inner.len(), 2);
}
