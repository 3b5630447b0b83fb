use everyday_core::{Document, DocumentStore, StoreError};
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
    Document::from_value(value).unwrap()
}

#[test]
fn insert_get_update_delete_roundtrip() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .insert("things", &doc(json!({"_id": "a", "content": "first"})))
        .unwrap();

    let loaded = store.get("things", "a").unwrap().unwrap();
    assert_eq!(loaded.get("content"), Some(&json!("first")));

    let updated = store
        .update("things", &doc(json!({"_id": "a", "content": "second"})))
        .unwrap();
    assert!(updated);
    let loaded = store.get("things", "a").unwrap().unwrap();
    assert_eq!(loaded.get("content"), Some(&json!("second")));

    assert!(store.delete("things", "a").unwrap());
    assert!(store.get("things", "a").unwrap().is_none());
}

#[test]
fn update_and_delete_of_missing_id_are_silent() {
    let store = DocumentStore::open_in_memory().unwrap();

    let updated = store
        .update("things", &doc(json!({"_id": "ghost"})))
        .unwrap();
    assert!(!updated);
    assert!(!store.delete("things", "ghost").unwrap());
}

#[test]
fn insert_duplicate_id_is_rejected() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.insert("things", &doc(json!({"_id": "a"}))).unwrap();

    let err = store.insert("things", &doc(json!({"_id": "a"}))).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { ref id, .. } if id == "a"));
}

#[test]
fn collections_are_isolated() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.insert("blocks", &doc(json!({"_id": "same"}))).unwrap();
    store.insert("userstats", &doc(json!({"_id": "same"}))).unwrap();

    assert_eq!(store.count("blocks").unwrap(), 1);
    assert_eq!(store.count("userstats").unwrap(), 1);
    assert!(store.exists("blocks", "same").unwrap());
    assert!(!store.exists("other", "same").unwrap());
}

#[test]
fn find_all_pages_through_large_collections_in_insertion_order() {
    let store = DocumentStore::open_in_memory().unwrap();
    for index in 0..150 {
        store
            .insert("things", &doc(json!({"_id": format!("doc-{index:03}"), "n": index})))
            .unwrap();
    }

    let ids = store
        .find_all("things")
        .map(|item| item.unwrap().id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids.len(), 150);
    assert_eq!(ids.first().map(String::as_str), Some("doc-000"));
    assert_eq!(ids.last().map(String::as_str), Some("doc-149"));
}

#[test]
fn find_all_reports_malformed_body_and_continues() {
    let store = DocumentStore::open_in_memory().unwrap();
    store.insert("things", &doc(json!({"_id": "before"}))).unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('things', 'broken', '{oops');",
            [],
        )
        .unwrap();
    store.insert("things", &doc(json!({"_id": "after"}))).unwrap();

    let items = store.find_all("things").collect::<Vec<_>>();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().id(), "before");
    assert!(matches!(
        items[1],
        Err(StoreError::MalformedDocument { ref id, .. }) if id == "broken"
    ));
    assert_eq!(items[2].as_ref().unwrap().id(), "after");
}

#[test]
fn find_containing_matches_substring_of_field_only() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .insert("things", &doc(json!({"_id": "a", "content": "Buy milk", "section": "x"})))
        .unwrap();
    store
        .insert("things", &doc(json!({"_id": "b", "content": "call mom", "section": "milk"})))
        .unwrap();
    store
        .insert("things", &doc(json!({"_id": "c", "content": "MILKSHAKE"})))
        .unwrap();

    let ids = store
        .find_containing("things", "content", "milk")
        .map(|item| item.unwrap().id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn find_containing_treats_wildcards_literally_and_skips_malformed_rows() {
    let store = DocumentStore::open_in_memory().unwrap();
    store
        .insert("things", &doc(json!({"_id": "a", "content": "50% off"})))
        .unwrap();
    store
        .insert("things", &doc(json!({"_id": "b", "content": "500 off"})))
        .unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('things', 'broken', '50% {');",
            [],
        )
        .unwrap();

    let ids = store
        .find_containing("things", "content", "0%")
        .map(|item| item.unwrap().id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["a".to_string()]);
}

#[test]
fn read_only_store_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("everyday.db");
    {
        let store = DocumentStore::open(&path).unwrap();
        store.insert("things", &doc(json!({"_id": "a"}))).unwrap();
    }

    let store = DocumentStore::open_read_only(&path).unwrap();
    assert!(store.get("things", "a").unwrap().is_some());
    let err = store.insert("things", &doc(json!({"_id": "b"}))).unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly));
}

#[test]
fn two_stores_on_one_file_see_each_others_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("everyday.db");
    let writer = DocumentStore::open(&path).unwrap();
    let reader = DocumentStore::open(&path).unwrap();

    writer.insert("things", &doc(json!({"_id": "shared"}))).unwrap();
    assert!(reader.exists("things", "shared").unwrap());
}
