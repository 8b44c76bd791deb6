//! Storage for extracted document text between requests.

pub mod memory;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::parser::types::NormalizedText;

pub use memory::InMemorySessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: String,
    pub filename: String,
    pub checksum: String,
    pub text: NormalizedText,
    pub stored_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(filename: impl Into<String>, raw_bytes: &[u8], text: NormalizedText) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            checksum: checksum_bytes(raw_bytes),
            text,
            stored_at: Utc::now(),
        }
    }
}

/// Key/value store for [`DocumentRecord`]s keyed by document id.
pub trait SessionStore: Send + Sync {
    fn put(&self, record: DocumentRecord);
    fn get(&self, id: &str) -> Option<DocumentRecord>;
    fn find_by_checksum(&self, checksum: &str) -> Option<DocumentRecord>;
    fn remove(&self, id: &str) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn checksum_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
