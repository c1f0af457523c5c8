use revreg_core::constants::{POW_DOMAIN_TAG, POW_HASH_LEN};
use revreg_core::types::PublicKey;
use scrypt::{scrypt, Params};

/// scrypt parameters for the PoW hash: `log_n = 10, r = 8, p = 1`. Chosen to
/// be memory-hard (a few MB working set) while keeping a single hash cheap
/// enough to be tried many times per second on commodity hardware.
fn pow_scrypt_params() -> Params {
    Params::new(10, 8, 1, POW_HASH_LEN).expect("fixed scrypt params are always valid")
}

/// Memory-hard hash of one PoW trial: `nonce || timestamp || public_key`,
/// salted with the fixed domain-separation tag.
pub fn pow_hash(nonce: u64, timestamp: i64, public_key: &PublicKey) -> [u8; POW_HASH_LEN] {
    let mut input = Vec::with_capacity(8 + 8 + 33);
    input.extend_from_slice(&nonce.to_be_bytes());
    input.extend_from_slice(&timestamp.to_be_bytes());
    input.extend_from_slice(public_key.as_bytes());

    let mut out = [0u8; POW_HASH_LEN];
    scrypt(&input, POW_DOMAIN_TAG, &pow_scrypt_params(), &mut out)
        .expect("fixed-size output buffer matches params");
    out
}

/// Number of leading zero bits in `hash`, scanning most-significant byte
/// first. This is the per-nonce bit-score the PoW engine averages.
pub fn leading_zero_bits(hash: &[u8]) -> u32 {
    let mut count = 0u32;
    for byte in hash {
        if *byte == 0 {
            count += 8;
            continue;
        }
        count += byte.leading_zeros();
        break;
    }
    count
}
