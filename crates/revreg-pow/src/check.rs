use revreg_core::constants::EXPIRY_SLACK_FRACTION;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_crypto::powhash::{leading_zero_bits, pow_hash};
use revreg_crypto::verify_signature;

/// Derive the TTL (microseconds, matching `timestamp`'s unit) a record earns
/// from its PoW score: the positive part of `valid_epochs * epoch_duration`,
/// plus a fixed slack fraction of one epoch to absorb clock skew between
/// peers.
pub fn compute_ttl(valid_epochs: f64, epoch_duration_secs: i64) -> i64 {
    let epoch_duration_micros = epoch_duration_secs as f64 * 1_000_000.0;
    let base = valid_epochs.max(0.0) * epoch_duration_micros;
    let slack = epoch_duration_micros * EXPIRY_SLACK_FRACTION;
    (base + slack).floor() as i64
}

/// Authoritative PoW/record validator (component C). Runs the ordered,
/// short-circuiting chain: signature, ascending nonces, per-nonce scores,
/// mean-score-vs-difficulty, then the timing window.
///
/// `now` is microseconds since the UNIX epoch, matching `timestamp`'s unit.
pub fn pow_check(
    record: &RevocationRecord,
    difficulty: f64,
    epoch_duration_secs: i64,
    now: i64,
) -> Result<(), RevRegError> {
    // 1. Signature, over the purpose tuple only.
    let signed_region = RevocationRecord::signed_region(record.timestamp, &record.public_key);
    verify_signature(&record.public_key, &signed_region, &record.signature)
        .map_err(|_| RevRegError::InvalidSignature)?;

    // 2. Nonces must be strictly ascending — this is the wire-level
    //    canonical ordering and also prevents duplicate-nonce padding.
    for pair in record.nonces.windows(2) {
        if pair[0] >= pair[1] {
            return Err(RevRegError::InvalidPoW(
                "nonces are not strictly ascending".into(),
            ));
        }
    }

    // 3. Per-nonce bit-scores, averaged.
    let mut total = 0u64;
    for nonce in record.nonces {
        let hash = pow_hash(nonce, record.timestamp, &record.public_key);
        total += leading_zero_bits(&hash) as u64;
    }
    let mean_score = total as f64 / record.nonces.len() as f64;

    // 4. Difficulty threshold.
    let valid_epochs = mean_score - difficulty;
    if valid_epochs < 0.0 {
        return Err(RevRegError::InvalidPoW(format!(
            "score {mean_score:.2} does not clear difficulty {difficulty:.2}"
        )));
    }

    // 5. The wire-carried ttl must match what the score actually earns —
    //    otherwise a holder could mint a record with an inflated lifetime.
    let expected_ttl = compute_ttl(valid_epochs, epoch_duration_secs);
    if record.ttl != expected_ttl {
        return Err(RevRegError::InvalidPoW(format!(
            "ttl {} does not match the {expected_ttl} earned by this score",
            record.ttl
        )));
    }

    // 6. Timing window.
    if record.timestamp > now {
        return Err(RevRegError::NotYetValid {
            timestamp: record.timestamp,
            now,
        });
    }
    if record.is_expired(now) {
        return Err(RevRegError::Expired {
            expired_at: record.expires_at(),
            now,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PowEngine;
    use revreg_core::constants::POW_COUNT;
    use revreg_crypto::KeyPair;

    fn mined_record(timestamp: i64, difficulty: f64, epoch_duration: i64) -> RevocationRecord {
        let signer = KeyPair::generate();
        let mut engine = PowEngine::new(signer.public_key.clone(), timestamp);
        for _ in 0..(POW_COUNT * 8) {
            engine.round();
        }
        engine.finish(&signer, difficulty, epoch_duration)
    }

    #[test]
    fn accepts_freshly_mined_record() {
        let now = 10_000_000;
        let record = mined_record(now, 0.0, 3_600);
        assert!(pow_check(&record, 0.0, 3_600, now).is_ok());
    }

    #[test]
    fn rejects_tampered_nonce_order() {
        let now = 10_000_000;
        let mut record = mined_record(now, 0.0, 3_600);
        record.nonces.swap(0, 1);
        let err = pow_check(&record, 0.0, 3_600, now).unwrap_err();
        assert!(matches!(err, RevRegError::InvalidPoW(_)));
    }

    #[test]
    fn rejects_expired_record() {
        let now = 10_000_000;
        let record = mined_record(now, 0.0, 3_600);
        let far_future = record.expires_at() + 1;
        let err = pow_check(&record, 0.0, 3_600, far_future).unwrap_err();
        assert!(matches!(err, RevRegError::Expired { .. }));
    }

    #[test]
    fn rejects_not_yet_valid_record() {
        let now = 10_000_000;
        let record = mined_record(now, 0.0, 3_600);
        let err = pow_check(&record, 0.0, 3_600, now - 1).unwrap_err();
        assert!(matches!(err, RevRegError::NotYetValid { .. }));
    }

    #[test]
    fn rejects_score_below_difficulty() {
        let now = 10_000_000;
        let record = mined_record(now, 0.0, 3_600);
        // An unreasonably high difficulty no mined record can clear.
        let err = pow_check(&record, 1_000.0, 3_600, now).unwrap_err();
        assert!(matches!(err, RevRegError::InvalidPoW(_)));
    }
}
