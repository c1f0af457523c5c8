use revreg_core::constants::{DEFAULT_EPOCH_DURATION_SECS, DEFAULT_WORKBITS};
use revreg_core::error::RevRegError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The three `REVOCATION.*` configuration keys spec.md §6.4 names, plus the
/// transport addresses CLI flags fill in. `workbits` MUST stay below the PoW
/// hash width in bits — a config-time invariant, not a per-record one.
#[derive(Debug, Clone)]
pub struct RevRegConfig {
    pub workbits: f64,
    pub epoch_duration_secs: i64,
    pub database_path: PathBuf,
}

impl RevRegConfig {
    /// Read `REVOCATION.WORKBITS` / `REVOCATION.EPOCH_DURATION` /
    /// `REVOCATION.DATABASE` out of a plain `KEY=VALUE` text file, one entry
    /// per line, `#`-prefixed lines ignored. Missing keys fall back to
    /// defaults; `database_path` has no default and must come from either
    /// the file or a CLI override.
    pub fn from_file(path: &Path) -> Result<Self, RevRegError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RevRegError::ConfigurationError(format!("reading config {}: {e}", path.display())))?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, RevRegError> {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                RevRegError::ConfigurationError(format!("malformed config line: {line}"))
            })?;
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        let workbits = match entries.get("REVOCATION.WORKBITS") {
            Some(v) => v
                .parse()
                .map_err(|_| RevRegError::ConfigurationError(format!("REVOCATION.WORKBITS not a number: {v}")))?,
            None => DEFAULT_WORKBITS,
        };
        let epoch_duration_secs = match entries.get("REVOCATION.EPOCH_DURATION") {
            Some(v) => v.parse().map_err(|_| {
                RevRegError::ConfigurationError(format!("REVOCATION.EPOCH_DURATION not an integer: {v}"))
            })?,
            None => DEFAULT_EPOCH_DURATION_SECS,
        };
        let database_path = entries
            .get("REVOCATION.DATABASE")
            .map(PathBuf::from)
            .ok_or_else(|| RevRegError::ConfigurationError("REVOCATION.DATABASE is required".into()))?;

        Self::validate(workbits, epoch_duration_secs)?;
        Ok(Self {
            workbits,
            epoch_duration_secs,
            database_path,
        })
    }

    fn validate(workbits: f64, epoch_duration_secs: i64) -> Result<(), RevRegError> {
        const POW_HASH_WIDTH_BITS: f64 = (revreg_core::constants::POW_HASH_LEN * 8) as f64;
        if !(0.0..POW_HASH_WIDTH_BITS).contains(&workbits) {
            return Err(RevRegError::ConfigurationError(format!(
                "REVOCATION.WORKBITS {workbits} must be in [0, {POW_HASH_WIDTH_BITS})"
            )));
        }
        if epoch_duration_secs <= 0 {
            return Err(RevRegError::ConfigurationError(
                "REVOCATION.EPOCH_DURATION must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let cfg = RevRegConfig::from_str(
            "REVOCATION.WORKBITS=18\nREVOCATION.EPOCH_DURATION=3600\nREVOCATION.DATABASE=/tmp/revreg.log\n",
        )
        .unwrap();
        assert_eq!(cfg.workbits, 18.0);
        assert_eq!(cfg.epoch_duration_secs, 3_600);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/revreg.log"));
    }

    #[test]
    fn missing_database_is_a_configuration_error() {
        let err = RevRegConfig::from_str("REVOCATION.WORKBITS=18\n").unwrap_err();
        assert!(matches!(err, RevRegError::ConfigurationError(_)));
    }

    #[test]
    fn workbits_out_of_range_is_rejected() {
        let err = RevRegConfig::from_str("REVOCATION.WORKBITS=9999\nREVOCATION.DATABASE=/tmp/x\n").unwrap_err();
        assert!(matches!(err, RevRegError::ConfigurationError(_)));
    }

    #[test]
    fn defaults_apply_when_keys_absent() {
        let cfg = RevRegConfig::from_str("REVOCATION.DATABASE=/tmp/x\n").unwrap();
        assert_eq!(cfg.workbits, DEFAULT_WORKBITS);
        assert_eq!(cfg.epoch_duration_secs, DEFAULT_EPOCH_DURATION_SECS);
    }
}
