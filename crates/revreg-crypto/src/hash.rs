use revreg_core::types::KeyHash;

/// Compute BLAKE3 hash of arbitrary bytes to a 32-byte array.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// `hash(PublicKey)` used to key the `RevocationIndex` (component E).
pub fn key_hash(public_key: &revreg_core::types::PublicKey) -> KeyHash {
    KeyHash::from_bytes(blake3_hash(public_key.as_bytes()))
}
