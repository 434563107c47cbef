//! `window.localStorage` binding for the habit store

use habitual::storage::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// [`KeyValueStore`] over the origin's local storage
///
/// Every clone refers to the same browser storage.
#[derive(Clone)]
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// Open the origin's local storage
    pub fn open() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;

        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

/// Quota and security errors arrive as opaque JS values
fn js_error(err: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitual::storage::KeyValueStoreExt;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_round_trip_through_local_storage() {
        let store = LocalStore::open().unwrap();
        store.set_json("habitual_test_key", &vec![1, 2, 3]).unwrap();

        let back: Option<Vec<u32>> = store.get_json("habitual_test_key").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        store.remove("habitual_test_key").unwrap();
        assert_eq!(store.get("habitual_test_key").unwrap(), None);
    }
}
