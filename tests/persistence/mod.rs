use std::sync::Arc;
use std::time::Duration;

use fluxible::AsyncMemoryStorage;
use fluxible::FluxibleStore;
use fluxible::MemoryStorage;
use fluxible::PersistConfig;
use fluxible::Record;
use fluxible::SavedBlob;
use fluxible::SledStorage;
use fluxible::StoreSettings;
use fluxible::STORAGE_KEY;
use serde_json::json;
use serial_test::serial;
use tempfile::tempdir;
use tokio::time::sleep;

use crate::commons::enable_logger;
use crate::commons::record;

fn keep_session(restored: Record) -> Record {
    restored
        .into_iter()
        .filter(|(key, _)| key == "session" || key == "theme")
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_memory_storage_round_trip() {
    enable_logger();
    let storage = Arc::new(MemoryStorage::new());

    let store = FluxibleStore::builder(record(json!({"session": null, "theme": "light", "clicks": 0})))
        .persist(PersistConfig::sync(storage.clone(), keep_session))
        .build()
        .expect("build");

    store.update_store(record(json!({"session": "abc", "clicks": 1})));
    store.update_store(record(json!({"theme": "dark", "clicks": 2})));
    assert_eq!(storage.item(STORAGE_KEY), None);

    sleep(Duration::from_millis(250)).await;
    assert_eq!(
        storage.item(STORAGE_KEY),
        Some(SavedBlob::Text(r#"{"session":"abc","theme":"dark"}"#.to_string()))
    );

    // A fresh store over the same storage picks the values back up
    let restored = FluxibleStore::builder(record(json!({"session": null, "theme": "light", "clicks": 0})))
        .persist(PersistConfig::sync(storage.clone(), keep_session))
        .build()
        .expect("rebuild");
    assert_eq!(
        *restored.store(),
        record(json!({"session": "abc", "theme": "dark", "clicks": 0}))
    );
}

#[tokio::test(start_paused = true)]
async fn test_async_memory_storage_round_trip() {
    let storage = Arc::new(AsyncMemoryStorage::with_item(
        STORAGE_KEY,
        SavedBlob::Raw(record(json!({"session": "old"}))),
    ));

    let store = FluxibleStore::builder(record(json!({"session": null, "clicks": 0})))
        .persist(PersistConfig::with_async(storage.clone(), keep_session).stringify(false))
        .build()
        .expect("build");
    store.ready().await.expect("ready");
    assert_eq!(store.get("session"), Some(json!("old")));

    store.update_store(record(json!({"session": "new"})));
    store.flush().await.expect("flush");

    assert_eq!(
        storage.item(STORAGE_KEY),
        Some(SavedBlob::Raw(record(json!({"session": "new"}))))
    );
}

#[tokio::test]
async fn test_sled_storage_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fluxible_db");

    {
        let storage = Arc::new(SledStorage::open(&path).expect("open sled"));
        let store = FluxibleStore::builder(record(json!({"session": null, "theme": "light"})))
            .persist(PersistConfig::sync(storage.clone(), keep_session))
            .build()
            .expect("build");

        store.update_store(record(json!({"session": "abc"})));
        store.flush().await.expect("flush");
        storage.flush().expect("flush sled");
    }

    let storage = Arc::new(SledStorage::open(&path).expect("reopen sled"));
    let store = FluxibleStore::builder(record(json!({"session": null, "theme": "light"})))
        .persist(PersistConfig::sync(storage, keep_session))
        .build()
        .expect("rebuild");

    assert_eq!(store.get("session"), Some(json!("abc")));
    assert_eq!(store.get("theme"), Some(json!("light")));
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_debounce_window_from_environment() {
    let settings = temp_env::with_var("FLUXIBLE__PERSIST__DEBOUNCE_MS", Some("1000"), || {
        StoreSettings::load(None).expect("load settings")
    });
    assert_eq!(settings.persist.debounce_ms, 1000);

    let storage = Arc::new(MemoryStorage::new());
    let store = FluxibleStore::builder(record(json!({"session": null})))
        .persist(PersistConfig::sync(storage.clone(), keep_session))
        .settings(settings)
        .build()
        .expect("build");

    store.update_store(record(json!({"session": "abc"})));
    sleep(Duration::from_millis(500)).await;
    assert_eq!(storage.item(STORAGE_KEY), None);

    sleep(Duration::from_millis(600)).await;
    assert!(storage.item(STORAGE_KEY).is_some());
}
