use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::session::{DocumentRecord, SessionStore};

/// Process-local store. Entries older than the TTL are dropped on access.
pub struct InMemorySessionStore {
    ttl: Duration,
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: RwLock::new(HashMap::new()),
        }
    }

    fn is_live(&self, record: &DocumentRecord) -> bool {
        let age = Utc::now().signed_duration_since(record.stored_at);
        age.to_std().map(|age| age <= self.ttl).unwrap_or(true)
    }

    // Every write leaves the map consistent, so a poisoned guard is reused.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DocumentRecord>> {
        self.records.read().unwrap_or_else(|poisoned| {
            warn!("session store lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DocumentRecord>> {
        self.records.write().unwrap_or_else(|poisoned| {
            warn!("session store lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn evict_expired(&self) {
        self.write().retain(|_, record| self.is_live(record));
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, record: DocumentRecord) {
        self.evict_expired();
        self.write().insert(record.id.clone(), record);
    }

    fn get(&self, id: &str) -> Option<DocumentRecord> {
        self.evict_expired();
        self.read().get(id).cloned()
    }

    fn find_by_checksum(&self, checksum: &str) -> Option<DocumentRecord> {
        self.evict_expired();
        self.read()
            .values()
            .find(|record| record.checksum == checksum)
            .cloned()
    }

    fn remove(&self, id: &str) -> bool {
        self.write().remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.evict_expired();
        self.read().len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::parser::types::NormalizedText;
    use crate::session::checksum_bytes;

    fn record(name: &str, body: &str) -> DocumentRecord {
        DocumentRecord::new(name, body.as_bytes(), NormalizedText::new(body))
    }

    #[test]
    fn stores_and_finds_by_id_and_checksum() {
        let store = InMemorySessionStore::default();
        let rec = record("a.txt", "hello");
        let id = rec.id.clone();
        store.put(rec);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).expect("by id").filename, "a.txt");
        let by_sum = store
            .find_by_checksum(&checksum_bytes(b"hello"))
            .expect("by checksum");
        assert_eq!(by_sum.id, id);
        assert!(store.remove(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn poisoned_lock_still_stores_records() {
        let store = std::sync::Arc::new(InMemorySessionStore::default());
        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.records.write().expect("lock");
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(store.records.is_poisoned());

        let rec = record("after.txt", "still stored");
        let id = rec.id.clone();
        store.put(rec);
        assert_eq!(store.get(&id).expect("stored").filename, "after.txt");
    }

    #[test]
    fn expired_records_are_evicted() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let mut old = record("old.txt", "stale");
        old.stored_at = Utc::now() - ChronoDuration::seconds(120);
        let old_id = old.id.clone();
        store.put(old);
        store.put(record("new.txt", "fresh"));

        assert!(store.get(&old_id).is_none());
        assert_eq!(store.len(), 1);
    }
}
