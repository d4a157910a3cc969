// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blob store interface — string keys to opaque byte values.

use std::collections::HashMap;
use std::sync::Mutex;

use scanmaster_core::error::{Result, ScanmasterError};

/// A flat key-value store. Values are opaque bytes; callers decide the
/// encoding. Missing keys read as `None`.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite `key`.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Insert or overwrite several keys. Stores that can do so write all of
    /// them or none.
    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<()> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Delete every key.
    fn clear(&self) -> Result<()>;
}

/// Process-local store, used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| ScanmasterError::Database("memory store lock poisoned".into()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries()?.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<()> {
        let mut map = self.entries()?;
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.to_vec());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("k").expect("get"), None);

        store.put("k", b"one").expect("put");
        store.put("k", b"two").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some(&b"two"[..]));

        store.remove("k").expect("remove");
        store.remove("k").expect("remove missing");
        assert!(store.is_empty());
    }

    #[test]
    fn put_many_writes_every_entry() {
        let store = MemoryBlobStore::new();
        store
            .put_many(&[("a", &b"1"[..]), ("b", &b"2"[..])])
            .expect("put_many");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").expect("get").as_deref(), Some(&b"2"[..]));
    }

    #[test]
    fn clear_drops_everything() {
        let store = MemoryBlobStore::new();
        store.put("a", b"1").expect("put");
        store.put("b", b"2").expect("put");
        store.clear().expect("clear");
        assert_eq!(store.len(), 0);
    }
}
