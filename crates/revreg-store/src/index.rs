use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_core::types::KeyHash;
use std::collections::HashMap;

/// In-memory mapping `hash(PublicKey) -> RevocationRecord` (component E).
/// Unique-insert-only: once a key is revoked, a second record for the same
/// key is rejected as a duplicate rather than overwriting the first. There
/// is no delete operation — revocation is permanent for the process
/// lifetime of the index.
#[derive(Default)]
pub struct RevocationIndex {
    entries: HashMap<KeyHash, RevocationRecord>,
}

impl RevocationIndex {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key_hash: &KeyHash) -> bool {
        self.entries.contains_key(key_hash)
    }

    pub fn get(&self, key_hash: &KeyHash) -> Option<&RevocationRecord> {
        self.entries.get(key_hash)
    }

    /// Insert `record` if and only if its key hasn't been revoked already.
    pub fn insert(&mut self, record: RevocationRecord) -> Result<(), RevRegError> {
        let key_hash = record.key_hash();
        if self.entries.contains_key(&key_hash) {
            return Err(RevRegError::Duplicate(key_hash.to_hex()));
        }
        self.entries.insert(key_hash, record);
        Ok(())
    }

    /// Insert without re-checking for a duplicate, used only when replaying
    /// an already-validated durable log at start-up (the log itself cannot
    /// contain a duplicate, since every append passed through `insert`).
    pub fn insert_from_replay(&mut self, record: RevocationRecord) {
        let key_hash = record.key_hash();
        self.entries.insert(key_hash, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyHash, &RevocationRecord)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revreg_core::constants::POW_COUNT;
    use revreg_core::types::{PublicKey, Signature};

    fn sample(seed: u8) -> RevocationRecord {
        let mut nonces = [0u64; POW_COUNT];
        for (i, n) in nonces.iter_mut().enumerate() {
            *n = i as u64;
        }
        RevocationRecord {
            timestamp: 1_000_000,
            ttl: 3_600,
            nonces,
            signature: Signature::from_bytes([seed; 64]),
            public_key: PublicKey::from_bytes([seed; 33]),
        }
    }

    #[test]
    fn insert_then_lookup() {
        let mut index = RevocationIndex::new();
        let record = sample(1);
        let key_hash = record.key_hash();
        index.insert(record.clone()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&key_hash), Some(&record));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut index = RevocationIndex::new();
        index.insert(sample(2)).unwrap();
        let err = index.insert(sample(2)).unwrap_err();
        assert!(matches!(err, RevRegError::Duplicate(_)));
        assert_eq!(index.len(), 1);
    }
}
