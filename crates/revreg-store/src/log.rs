use revreg_core::constants::RECORD_SIZE;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Durable, append-only revocation log (component D): a flat sequence of
/// fixed-size `RevocationRecord` byte images with no header, no trailer, no
/// index, and no padding between records.
///
/// Records are trusted as already-validated the moment they're read back —
/// `replay()` does not re-run `pow_check` or signature verification. A
/// partial trailing chunk (fewer than `RECORD_SIZE` bytes left at EOF) is
/// fatal corruption, not something to silently truncate past.
pub struct RevocationLog {
    writer: BufWriter<File>,
}

impl RevocationLog {
    /// Open (creating if absent) the log file at `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RevRegError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RevRegError::PersistenceFailure(format!("open log: {e}")))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one record and fsync before returning, so an acknowledged
    /// write is actually durable, not merely out of the user-space buffer.
    pub fn append(&mut self, record: &RevocationRecord) -> Result<(), RevRegError> {
        let bytes = record.to_bytes();
        self.writer
            .write_all(&bytes)
            .map_err(|e| RevRegError::PersistenceFailure(format!("append: {e}")))?;
        self.writer
            .flush()
            .map_err(|e| RevRegError::PersistenceFailure(format!("flush: {e}")))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| RevRegError::PersistenceFailure(format!("sync: {e}")))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RevRegError> {
        self.writer
            .flush()
            .map_err(|e| RevRegError::PersistenceFailure(format!("flush: {e}")))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| RevRegError::PersistenceFailure(format!("sync: {e}")))
    }

    /// Read every record back from `path` in append order, without
    /// re-validating them. Returns an error if the file's length is not an
    /// exact multiple of `RECORD_SIZE` — a short trailing chunk means the
    /// process was killed mid-write and the log is corrupt.
    pub fn replay<P: AsRef<Path>>(path: P) -> Result<Vec<RevocationRecord>, RevRegError> {
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RevRegError::PersistenceFailure(format!(
                    "open log for replay: {e}"
                )))
            }
        };

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| RevRegError::PersistenceFailure(format!("read log: {e}")))?;

        if buf.len() % RECORD_SIZE != 0 {
            return Err(RevRegError::PersistenceFailure(format!(
                "log is corrupt: {} bytes is not a multiple of the {RECORD_SIZE}-byte record size",
                buf.len()
            )));
        }

        let mut records = Vec::with_capacity(buf.len() / RECORD_SIZE);
        for chunk in buf.chunks_exact(RECORD_SIZE) {
            records.push(RevocationRecord::from_bytes(chunk)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revreg_core::constants::POW_COUNT;
    use revreg_core::types::{PublicKey, Signature};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("revreg_store_test_{name}"));
        let _ = std::fs::remove_file(&dir);
        dir
    }

    fn sample(seed: u8) -> RevocationRecord {
        let mut nonces = [0u64; POW_COUNT];
        for (i, n) in nonces.iter_mut().enumerate() {
            *n = i as u64;
        }
        RevocationRecord {
            timestamp: 1_000_000 + seed as i64,
            ttl: 3_600,
            nonces,
            signature: Signature::from_bytes([seed; 64]),
            public_key: PublicKey::from_bytes([seed; 33]),
        }
    }

    #[test]
    fn append_then_replay_round_trips() {
        let path = temp_path("append_replay");
        {
            let mut log = RevocationLog::open(&path).unwrap();
            log.append(&sample(1)).unwrap();
            log.append(&sample(2)).unwrap();
        }
        let records = RevocationLog::replay(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], sample(1));
        assert_eq!(records[1], sample(2));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn replay_of_missing_file_is_empty() {
        let path = temp_path("missing");
        let records = RevocationLog::replay(&path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn partial_trailing_chunk_is_fatal() {
        let path = temp_path("partial");
        {
            let mut log = RevocationLog::open(&path).unwrap();
            log.append(&sample(3)).unwrap();
        }
        // Truncate off the last byte to simulate a torn write.
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.pop();
        std::fs::write(&path, bytes).unwrap();

        let err = RevocationLog::replay(&path).unwrap_err();
        assert!(matches!(err, RevRegError::PersistenceFailure(_)));
        let _ = std::fs::remove_file(&path);
    }
}
