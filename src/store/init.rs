//! One-time restore of persisted values.

use tracing::debug;

use crate::decode_blob;
use crate::Record;
use crate::RestoreFn;
use crate::Result;
use crate::SavedBlob;

/// Decode what the backend returned. A missing or blank text blob means
/// nothing was saved yet.
pub(crate) fn decode_saved(saved: Option<SavedBlob>) -> Result<Option<Record>> {
    match saved {
        None => Ok(None),
        Some(SavedBlob::Text(text)) if text.trim().is_empty() => {
            debug!("Blank saved record ignored");
            Ok(None)
        }
        Some(blob) => decode_blob(blob).map(Some),
    }
}

/// Build the input handed to the restore function: the current store, with
/// the saved record (if any) merged over it.
pub(crate) fn restore_input(
    store: &Record,
    saved: Option<&Record>,
) -> Record {
    let mut input = store.clone();
    if let Some(saved) = saved {
        input.extend(saved.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    input
}

/// Overwrite `store` with the restored subset and return its key names, which
/// become the persisted key set.
pub(crate) fn apply_restored(
    store: &mut Record,
    restored: Record,
) -> Vec<String> {
    let persisted_keys: Vec<String> = restored.keys().cloned().collect();
    debug!(?persisted_keys, "Persisted keys restored");

    store.extend(restored);
    persisted_keys
}

/// [`apply_restored`] for a restore computed from `snapshot` while updates
/// kept landing. A restored key the saved record did not supply keeps any
/// value written to the store after the snapshot was taken; it still joins
/// the persisted key set.
pub(crate) fn apply_restored_since(
    store: &mut Record,
    restored: Record,
    snapshot: &Record,
    saved: Option<&Record>,
) -> Vec<String> {
    let persisted_keys: Vec<String> = restored.keys().cloned().collect();
    debug!(?persisted_keys, "Persisted keys restored");

    for (key, value) in restored {
        let from_saved = saved.is_some_and(|saved| saved.contains_key(&key));
        if !from_saved && store.get(&key) != snapshot.get(&key) {
            debug!(key = %key, "Keeping value updated during restore");
            continue;
        }
        store.insert(key, value);
    }
    persisted_keys
}

/// Synchronous restore in one go.
pub(crate) fn restore_into(
    store: &mut Record,
    saved: Option<SavedBlob>,
    restore: &RestoreFn,
) -> Result<Vec<String>> {
    let saved = decode_saved(saved)?;
    let input = restore_input(store, saved.as_ref());
    Ok(apply_restored(store, restore(input)))
}
