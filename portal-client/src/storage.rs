//! Key/value persistence behind the session store and the theme switch. In the browser this is
//! `localStorage`; [MemoryStore] stands in when storage is disabled and in tests.

use std::{cell::RefCell, collections::HashMap};

use common::error::RpResult;

/// String key/value storage with the semantics of the Web Storage API
pub trait KeyValueStore {
    /// Read the value stored under `key`
    /// # Errors
    /// This function will return an error if the storage cannot be read
    fn get(&self, key: &str) -> RpResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value
    /// # Errors
    /// This function will return an error if the storage rejects the write
    fn set(&self, key: &str, value: &str) -> RpResult<()>;
    /// Remove the value under `key`. Removing a missing key is not an error.
    /// # Errors
    /// This function will return an error if the storage cannot be modified
    fn remove(&self, key: &str) -> RpResult<()>;
}

/// Non persistent [KeyValueStore]
#[derive(Default, Debug)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    #[cfg(test)]
    rejected: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Make every following write to `key` fail, as a full storage quota would
    #[cfg(test)]
    pub fn reject_writes_to(&self, key: &str) {
        self.rejected.borrow_mut().push(key.to_owned());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> RpResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RpResult<()> {
        #[cfg(test)]
        if self.rejected.borrow().iter().any(|rejected| rejected == key) {
            return Err(common::error::RpError::Storage(format!(
                "Quota exceeded writing `{key}`"
            )));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> RpResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `localStorage`. Values are stored raw so that pages sharing the origin read the same
/// strings.
#[cfg(target_arch = "wasm32")]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Returns a [LocalStore] if the browser exposes `localStorage` to this page
    pub fn available() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(_)) => Some(Self),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn storage_error(error: wasm_bindgen::JsValue) -> common::error::RpError {
    common::error::RpError::Storage(format!("{error:?}"))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> RpResult<Option<String>> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw().get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> RpResult<()> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw().set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> RpResult<()> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw().remove_item(key).map_err(storage_error)
    }
}

#[cfg(test)]
mod test {
    use super::{KeyValueStore, MemoryStore};

    #[test]
    fn memory_store_round_trip() -> common::error::RpResult<()> {
        let store = MemoryStore::new();
        store.set("authToken", "abc")?;
        assert_eq!(store.get("authToken")?.as_deref(), Some("abc"));
        store.remove("authToken")?;
        store.remove("authToken")?;
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn rejected_key_should_fail_writes_only() -> common::error::RpResult<()> {
        let store = MemoryStore::new();
        store.reject_writes_to("authToken");
        assert!(store.set("authToken", "abc").is_err());
        store.set("currentUser", "{}")?;
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
