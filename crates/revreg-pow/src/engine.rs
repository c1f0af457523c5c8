use revreg_core::constants::{EXPIRY_SLACK_FRACTION, POW_COUNT};
use revreg_core::record::RevocationRecord;
use revreg_core::types::PublicKey;
use revreg_crypto::powhash::{leading_zero_bits, pow_hash};
use revreg_crypto::KeyPair;

/// One PoW engine folds the old `pow_init`/`pow_start` split into a single
/// builder/handle: construct it, call `round()` repeatedly (the caller
/// decides the schedule — a cooperative loop yields every
/// `POW_YIELD_EVERY_ROUNDS`), check `is_ready()`, then `finish()`.
pub struct PowEngine {
    public_key: PublicKey,
    timestamp: i64,
    next_nonce: u64,
    /// Best trials seen so far, kept sorted ascending by nonce value once
    /// `is_ready()`. Capped at `POW_COUNT`, evicting the lowest-scoring
    /// entry when a better trial arrives.
    best: Vec<(u64, u32)>,
    rounds: u64,
}

impl PowEngine {
    pub fn new(public_key: PublicKey, timestamp: i64) -> Self {
        Self {
            public_key,
            timestamp,
            next_nonce: 0,
            best: Vec::with_capacity(POW_COUNT),
            rounds: 0,
        }
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn is_ready(&self) -> bool {
        self.best.len() == POW_COUNT
    }

    /// Mean bit-score over the best `POW_COUNT` trials found so far (zero
    /// until the pool is full).
    pub fn current_score(&self) -> f64 {
        if self.best.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.best.iter().map(|(_, s)| *s as u64).sum();
        sum as f64 / self.best.len() as f64
    }

    /// Try one nonce. Replaces the current worst-scoring trial if this one
    /// scores strictly higher, so the pool converges toward the best
    /// `POW_COUNT` trials this engine has tried.
    pub fn round(&mut self) {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        self.rounds += 1;

        let hash = pow_hash(nonce, self.timestamp, &self.public_key);
        let score = leading_zero_bits(&hash);

        if self.best.len() < POW_COUNT {
            self.best.push((nonce, score));
            return;
        }

        let worst_idx = self
            .best
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, s))| *s)
            .map(|(i, _)| i)
            .expect("best is non-empty once full");

        if score > self.best[worst_idx].1 {
            self.best[worst_idx] = (nonce, score);
        }
    }

    /// Consume the engine, sign the record, and produce the final
    /// `RevocationRecord` with nonces sorted into strictly ascending order.
    ///
    /// Panics if `is_ready()` is false — callers must drive `round()` until
    /// the pool fills before calling this.
    pub fn finish(self, signer: &KeyPair, difficulty: f64, epoch_duration_secs: i64) -> RevocationRecord {
        assert!(self.is_ready(), "finish() called before PowEngine filled its nonce pool");

        let mut nonces_with_scores = self.best;
        nonces_with_scores.sort_by_key(|(nonce, _)| *nonce);

        let mut nonces = [0u64; POW_COUNT];
        for (i, (nonce, _)) in nonces_with_scores.iter().enumerate() {
            nonces[i] = *nonce;
        }

        let mean_score: f64 = nonces_with_scores.iter().map(|(_, s)| *s as u64).sum::<u64>() as f64
            / POW_COUNT as f64;
        let valid_epochs = mean_score - difficulty;
        let ttl = crate::check::compute_ttl(valid_epochs, epoch_duration_secs);

        let signed_region = RevocationRecord::signed_region(self.timestamp, &self.public_key);
        let signature = signer.sign(&signed_region);

        RevocationRecord {
            timestamp: self.timestamp,
            ttl,
            nonces,
            signature,
            public_key: self.public_key,
        }
    }
}

/// TTL contribution from the expiry slack fraction, exposed for tests that
/// want to confirm `finish()`'s arithmetic without depending on `check`.
pub fn slack_fraction() -> f64 {
    EXPIRY_SLACK_FRACTION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_fills_pool_to_capacity() {
        let pk = PublicKey::from_bytes([1u8; 33]);
        let mut engine = PowEngine::new(pk, 1_000);
        for _ in 0..POW_COUNT {
            engine.round();
        }
        assert!(engine.is_ready());
        assert_eq!(engine.rounds(), POW_COUNT as u64);
    }

    #[test]
    fn more_rounds_never_decrease_score() {
        let pk = PublicKey::from_bytes([2u8; 33]);
        let mut engine = PowEngine::new(pk, 2_000);
        for _ in 0..POW_COUNT {
            engine.round();
        }
        let score_at_full = engine.current_score();
        for _ in 0..64 {
            engine.round();
        }
        assert!(engine.current_score() >= score_at_full);
    }

    #[test]
    fn finish_produces_ascending_nonces() {
        let pk = PublicKey::from_bytes([3u8; 33]);
        let mut engine = PowEngine::new(pk, 3_000);
        for _ in 0..(POW_COUNT * 4) {
            engine.round();
        }
        let signer = KeyPair::generate();
        let record = engine.finish(&signer, 0.0, 3_600);
        for pair in record.nonces.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
