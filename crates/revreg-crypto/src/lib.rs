pub mod ecdsa;
pub mod hash;
pub mod keypair;
pub mod powhash;

pub use ecdsa::{sign, verify_signature, SignatureError};
pub use hash::{blake3_hash, key_hash};
pub use keypair::KeyPair;
pub use powhash::{leading_zero_bits, pow_hash};
