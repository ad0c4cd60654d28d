use std::sync::Arc;

use fluxible::FluxibleStore;
use fluxible::ObserverHandle;
use fluxible::Record;
use parking_lot::Mutex;
use serde_json::json;
use serde_json::Value;

use crate::commons::enable_logger;
use crate::commons::record;

#[test]
fn test_observer_scenario() {
    enable_logger();
    let store = FluxibleStore::builder(record(json!({"value": "testValue", "count": 1})))
        .build()
        .expect("build");
    let calls: Arc<Mutex<Vec<Record>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = calls.clone();
    store.add_observer(move |store| sink.lock().push(store.clone()), ["count"]);

    store.update_store(record(json!({"count": 2})));
    assert_eq!(*calls.lock(), vec![record(json!({"value": "testValue", "count": 2}))]);

    store.update_store(record(json!({"value": "x"})));
    assert_eq!(calls.lock().len(), 1);
    assert_eq!(store.get("value"), Some(json!("x")));
}

/// Observers that unsubscribe on their first notification ("once" observers)
#[test]
fn test_one_shot_observers() {
    let store = FluxibleStore::builder(record(json!({"value": 0}))).build().expect("build");
    let calls = Arc::new(Mutex::new(Vec::new()));

    for n in 0..3 {
        let slot: Arc<Mutex<Option<ObserverHandle>>> = Arc::new(Mutex::new(None));
        let own = slot.clone();
        let sink = calls.clone();
        let handle = store.add_observer(
            move |_| {
                sink.lock().push(n);
                if let Some(handle) = own.lock().take() {
                    handle.unsubscribe();
                }
            },
            ["value"],
        );
        *slot.lock() = Some(handle);
    }

    store.update_store(record(json!({"value": 1})));
    store.update_store(record(json!({"value": 2})));

    assert_eq!(*calls.lock(), vec![0, 1, 2]);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn test_events_carry_payload_and_snapshot() {
    let store = FluxibleStore::builder(record(json!({"cart": []}))).build().expect("build");
    let received = Arc::new(Mutex::new(Vec::new()));

    let inner = store.clone();
    store.add_event("add-to-cart", move |payload: Option<&Value>, store: &Record, _: &str| {
        let mut cart = store.get("cart").and_then(Value::as_array).cloned().unwrap_or_default();
        if let Some(item) = payload {
            cart.push(item.clone());
        }
        inner.update_store(record(json!({ "cart": cart })));
    });
    let sink = received.clone();
    let audit = store.add_events(["add-to-cart", "checkout"], move |_: Option<&Value>, _: &Record, event: &str| {
        sink.lock().push(event.to_string());
    });

    assert_eq!(store.emit_event("add-to-cart", Some(json!("apple"))), Some(2));
    assert_eq!(store.emit_event("add-to-cart", Some(json!("pear"))), Some(2));
    assert_eq!(store.emit_event("checkout", None), Some(1));
    assert_eq!(store.emit_event("refund", None), None);

    assert_eq!(store.get("cart"), Some(json!(["apple", "pear"])));
    assert_eq!(*received.lock(), vec!["add-to-cart", "add-to-cart", "checkout"]);

    assert_eq!(audit.unsubscribe(), 2);
    assert_eq!(store.emit_event("checkout", None), Some(0));
}
