//! ─── Revocation Registry Protocol Constants ─────────────────────────────────

// ── Proof-of-Work ─────────────────────────────────────────────────────────────

/// Number of nonces mined per record. The score is the mean leading-zero-bit
/// count across all of them, which is what makes the scheme resistant to
/// lucky single-hash outliers.
pub const POW_COUNT: usize = 32;

/// Output size (bytes) of the memory-hard PoW hash.
pub const POW_HASH_LEN: usize = 64;

/// Fixed domain-separation string mixed into every PoW hash invocation.
pub const POW_DOMAIN_TAG: &[u8] = b"revreg-pow-v1";

/// Default process-wide PoW difficulty threshold (component C). Operators
/// override via `REVOCATION.WORKBITS`.
pub const DEFAULT_WORKBITS: f64 = 18.0;

// ── Purpose tuple ─────────────────────────────────────────────────────────────

/// Tags the signed region as a revocation record, so a signature produced for
/// one purpose can never be replayed as a different message type.
pub const PURPOSE_TAG_REVOCATION: u32 = 0x5245_564F; // "REVO"

/// Byte length of the signed purpose tuple's fixed-size portion
/// (purpose_tag + purpose_size + timestamp), not counting the public key.
pub const PURPOSE_SIZE: u32 = 4 + 4 + 8;

// ── Wire format ────────────────────────────────────────────────────────────────

/// Size in bytes of one encoded `RevocationRecord`:
/// timestamp(8) + ttl(8) + nonces(32*8) + signature(64) + public_key(33).
pub const RECORD_SIZE: usize = 8 + 8 + (POW_COUNT * 8) + 64 + 33;

// ── Epochs / expiry ───────────────────────────────────────────────────────────

/// Default duration of one epoch, in seconds. Operators override via
/// `REVOCATION.EPOCH_DURATION`.
pub const DEFAULT_EPOCH_DURATION_SECS: i64 = 3_600;

/// Fraction of one epoch added as slack to the computed expiry, to absorb
/// clock skew between peers.
pub const EXPIRY_SLACK_FRACTION: f64 = 0.1;

// ── Set reconciliation ────────────────────────────────────────────────────────

/// Fixed ASCII string hashed (BLAKE3, 512-bit / 64-byte output via XOF) to
/// derive the set-reconciliation application identifier (component G).
pub const SET_RECONCILIATION_APP_ID_STRING: &str = "revocation-set-union-application-id";

/// Fixed stagger delay (milliseconds) before a scheduled reconciliation
/// session moves from `SCHEDULED` to `EXCHANGING`.
pub const RECONCILIATION_STAGGER_MILLIS: u64 = 1_000;

// ── Block-layer plugin ────────────────────────────────────────────────────────

/// Number of independent hash functions used by a `BlockGroup` Bloom filter.
pub const BLOCK_GROUP_HASH_COUNT: u32 = 16;

/// Expected number of items per `BlockGroup`, used to size the Bloom filter.
pub const BLOCK_GROUP_EXPECTED_ITEMS: usize = 10_000;

/// Target false-positive rate for a `BlockGroup` Bloom filter.
pub const BLOCK_GROUP_FALSE_POSITIVE_RATE: f64 = 0.01;

// ── Client RPC ────────────────────────────────────────────────────────────────

/// Byte length of the fixed `{size, type}` frame header (component I).
pub const RPC_FRAME_HEADER_LEN: usize = 4;

pub const RPC_MSG_QUERY: u16 = 1;
pub const RPC_MSG_QUERY_RESPONSE: u16 = 2;
pub const RPC_MSG_REVOKE: u16 = 3;
pub const RPC_MSG_REVOKE_RESPONSE: u16 = 4;

// ── Cooperative scheduling ────────────────────────────────────────────────────

/// Number of PoW rounds between cooperative yields.
pub const POW_YIELD_EVERY_ROUNDS: u64 = 128;
