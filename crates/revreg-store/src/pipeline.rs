use crate::index::RevocationIndex;
use crate::log::RevocationLog;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_pow::pow_check;

/// Validate, durably append, then index one record — the sequence the
/// concurrency model requires to run as a single atomic step (no other task
/// may observe the record accepted in the index before it is safely on
/// disk, and no partially-applied record may ever reach the index).
pub fn apply(
    log: &mut RevocationLog,
    index: &mut RevocationIndex,
    record: RevocationRecord,
    difficulty: f64,
    epoch_duration_secs: i64,
    now: i64,
) -> Result<(), RevRegError> {
    if index.contains(&record.key_hash()) {
        return Err(RevRegError::Duplicate(record.key_hash().to_hex()));
    }

    pow_check(&record, difficulty, epoch_duration_secs, now)?;

    log.append(&record)?;
    index.insert(record)?;

    tracing::debug!("applied revocation record, index now holds {} keys", index.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revreg_core::constants::POW_COUNT;
    use revreg_crypto::KeyPair;
    use revreg_pow::PowEngine;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("revreg_store_pipeline_{name}"));
        let _ = std::fs::remove_file(&dir);
        dir
    }

    fn mined_record(timestamp: i64) -> RevocationRecord {
        let signer = KeyPair::generate();
        let mut engine = PowEngine::new(signer.public_key.clone(), timestamp);
        for _ in 0..(POW_COUNT * 8) {
            engine.round();
        }
        engine.finish(&signer, 0.0, 3_600)
    }

    #[test]
    fn apply_accepts_valid_record_once() {
        let path = temp_path("apply_once");
        let mut log = RevocationLog::open(&path).unwrap();
        let mut index = RevocationIndex::new();
        let now = 5_000_000;
        let record = mined_record(now);

        apply(&mut log, &mut index, record.clone(), 0.0, 3_600, now).unwrap();
        assert_eq!(index.len(), 1);

        let err = apply(&mut log, &mut index, record, 0.0, 3_600, now).unwrap_err();
        assert!(matches!(err, RevRegError::Duplicate(_)));
        let _ = std::fs::remove_file(&path);
    }
}
