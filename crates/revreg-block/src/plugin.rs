use crate::group::BlockGroup;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_core::types::KeyHash;
use revreg_pow::pow_check;

/// Outcome of evaluating one candidate record against a query.
#[derive(Debug)]
pub enum EvalResult {
    /// The record is valid and new for this query's `BlockGroup`.
    Accept,
    /// The record is valid but this query has already seen it.
    Duplicate,
    /// The record's key does not match the key the query asked for.
    KeyMismatch,
    /// The record itself failed PoW/signature/timing validation.
    Invalid(RevRegError),
}

/// The hook surface the DHT/block layer dispatches through: given a record,
/// what key is it stored under, is a given reply acceptable for a given
/// query, and what duplicate-suppression group should back a fresh query.
pub trait BlockPlugin {
    fn get_key(&self, record: &RevocationRecord) -> KeyHash;
    fn evaluate(&self, query_key: &KeyHash, record: &RevocationRecord, group: &mut BlockGroup) -> EvalResult;
    fn create_group(&self) -> BlockGroup;
}

/// The one production `BlockPlugin`: records are keyed by `hash(PublicKey)`,
/// accepted only if they pass the full PoW/signature/timing check and their
/// key matches the query, and deduplicated per query via a `BlockGroup`.
pub struct RevocationBlockPlugin {
    pub difficulty: f64,
    pub epoch_duration_secs: i64,
}

impl BlockPlugin for RevocationBlockPlugin {
    fn get_key(&self, record: &RevocationRecord) -> KeyHash {
        record.key_hash()
    }

    fn evaluate(
        &self,
        query_key: &KeyHash,
        record: &RevocationRecord,
        group: &mut BlockGroup,
    ) -> EvalResult {
        let key = self.get_key(record);
        if &key != query_key {
            return EvalResult::KeyMismatch;
        }

        let now = crate::now_micros();
        if let Err(e) = pow_check(record, self.difficulty, self.epoch_duration_secs, now) {
            return EvalResult::Invalid(e);
        }

        if group.mark(&key) {
            EvalResult::Accept
        } else {
            EvalResult::Duplicate
        }
    }

    fn create_group(&self) -> BlockGroup {
        BlockGroup::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revreg_core::constants::POW_COUNT;
    use revreg_crypto::KeyPair;
    use revreg_pow::PowEngine;

    fn mined_record(timestamp: i64) -> RevocationRecord {
        let signer = KeyPair::generate();
        let mut engine = PowEngine::new(signer.public_key.clone(), timestamp);
        for _ in 0..(POW_COUNT * 8) {
            engine.round();
        }
        engine.finish(&signer, 0.0, 3_600)
    }

    #[test]
    fn accepts_then_deduplicates() {
        let plugin = RevocationBlockPlugin {
            difficulty: 0.0,
            epoch_duration_secs: 3_600,
        };
        let record = mined_record(crate::now_micros());
        let key = plugin.get_key(&record);
        let mut group = plugin.create_group();

        assert!(matches!(
            plugin.evaluate(&key, &record, &mut group),
            EvalResult::Accept
        ));
        assert!(matches!(
            plugin.evaluate(&key, &record, &mut group),
            EvalResult::Duplicate
        ));
    }

    #[test]
    fn rejects_key_mismatch() {
        let plugin = RevocationBlockPlugin {
            difficulty: 0.0,
            epoch_duration_secs: 3_600,
        };
        let record = mined_record(crate::now_micros());
        let mut group = plugin.create_group();
        let wrong_key = KeyHash::from_bytes([0xffu8; 32]);

        assert!(matches!(
            plugin.evaluate(&wrong_key, &record, &mut group),
            EvalResult::KeyMismatch
        ));
    }
}
