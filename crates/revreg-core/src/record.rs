use crate::constants::{POW_COUNT, PURPOSE_SIZE, PURPOSE_TAG_REVOCATION, RECORD_SIZE};
use crate::error::RevRegError;
use crate::types::{KeyHash, PublicKey, Signature};

/// A single flood-propagated revocation: a public key the holder has signed
/// away, bound to a proof-of-work that determines how long the record stays
/// valid before it must be re-issued.
///
/// Wire layout is fixed-size and carries no length prefix or framing: see
/// `to_bytes`/`from_bytes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevocationRecord {
    /// Microseconds since the UNIX epoch. Covered by the signature.
    pub timestamp: i64,
    /// Seconds this record remains valid for, counted from `timestamp`.
    /// Derived from the PoW score; not itself covered by the signature
    /// (it cannot be — it depends on nonces mined after signing).
    pub ttl: i64,
    /// Strictly ascending, 8-byte network-order nonces (component C).
    pub nonces: [u64; POW_COUNT],
    /// ECDSA signature over the purpose tuple (`signed_region`).
    pub signature: Signature,
    /// The public key being revoked.
    pub public_key: PublicKey,
}

impl RevocationRecord {
    /// Bytes covered by the signature: `purpose_tag || purpose_size ||
    /// timestamp || public_key`. Nonces and ttl are deliberately excluded —
    /// they only exist once PoW mining (which happens after signing) is done.
    pub fn signed_region(timestamp: i64, public_key: &PublicKey) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 4 + 8 + 33);
        buf.extend_from_slice(&PURPOSE_TAG_REVOCATION.to_be_bytes());
        buf.extend_from_slice(&PURPOSE_SIZE.to_be_bytes());
        buf.extend_from_slice(&timestamp.to_be_bytes());
        buf.extend_from_slice(public_key.as_bytes());
        buf
    }

    pub fn key_hash(&self) -> KeyHash {
        KeyHash::from_bytes(*blake3::hash(self.public_key.as_bytes()).as_bytes())
    }

    pub fn expires_at(&self) -> i64 {
        self.timestamp + self.ttl
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at()
    }

    /// Encode into the fixed `RECORD_SIZE`-byte wire image, network byte
    /// order throughout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        let mut off = 0usize;

        out[off..off + 8].copy_from_slice(&self.timestamp.to_be_bytes());
        off += 8;
        out[off..off + 8].copy_from_slice(&self.ttl.to_be_bytes());
        off += 8;
        for nonce in &self.nonces {
            out[off..off + 8].copy_from_slice(&nonce.to_be_bytes());
            off += 8;
        }
        out[off..off + 64].copy_from_slice(self.signature.as_bytes());
        off += 64;
        out[off..off + 33].copy_from_slice(self.public_key.as_bytes());
        off += 33;

        debug_assert_eq!(off, RECORD_SIZE);
        out
    }

    /// Decode from an exact `RECORD_SIZE`-byte slice. Rejects any other
    /// length as malformed — there is no framing to recover from a short or
    /// long read.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, RevRegError> {
        if buf.len() != RECORD_SIZE {
            return Err(RevRegError::MalformedMessage(format!(
                "expected {RECORD_SIZE} bytes, got {}",
                buf.len()
            )));
        }

        let mut off = 0usize;
        let timestamp = i64::from_be_bytes(buf[off..off + 8].try_into().unwrap());
        off += 8;
        let ttl = i64::from_be_bytes(buf[off..off + 8].try_into().unwrap());
        off += 8;

        let mut nonces = [0u64; POW_COUNT];
        for nonce in nonces.iter_mut() {
            *nonce = u64::from_be_bytes(buf[off..off + 8].try_into().unwrap());
            off += 8;
        }

        let mut sig = [0u8; 64];
        sig.copy_from_slice(&buf[off..off + 64]);
        off += 64;

        let mut pk = [0u8; 33];
        pk.copy_from_slice(&buf[off..off + 33]);
        off += 33;

        debug_assert_eq!(off, RECORD_SIZE);

        Ok(Self {
            timestamp,
            ttl,
            nonces,
            signature: Signature::from_bytes(sig),
            public_key: PublicKey::from_bytes(pk),
        })
    }
}
