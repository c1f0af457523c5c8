use revreg_core::constants::RECORD_SIZE;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_core::types::PublicKey;

/// `is_valid` reply carried by both `QUERY_RESPONSE` and `REVOKE_RESPONSE`:
/// `1` the key is still valid, `0` it is revoked, `-1` an internal error
/// occurred while processing the request. Wire image is 4 bytes, network
/// byte order, two's-complement — matching the raw `u32` the protocol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValid {
    Valid,
    Revoked,
    InternalError,
}

impl IsValid {
    pub fn to_bytes(self) -> [u8; 4] {
        let code: i32 = match self {
            IsValid::Valid => 1,
            IsValid::Revoked => 0,
            IsValid::InternalError => -1,
        };
        code.to_be_bytes()
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, RevRegError> {
        if buf.len() != 4 {
            return Err(RevRegError::MalformedMessage(format!(
                "is_valid payload must be 4 bytes, got {}",
                buf.len()
            )));
        }
        let code = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        match code {
            1 => Ok(IsValid::Valid),
            0 => Ok(IsValid::Revoked),
            -1 => Ok(IsValid::InternalError),
            other => Err(RevRegError::MalformedMessage(format!("unknown is_valid code {other}"))),
        }
    }
}

/// `QUERY` payload: the raw 33-byte compressed public key, nothing else.
pub fn decode_query(payload: &[u8]) -> Result<PublicKey, RevRegError> {
    let bytes: [u8; 33] = payload
        .try_into()
        .map_err(|_| RevRegError::MalformedMessage(format!("QUERY expects 33 bytes, got {}", payload.len())))?;
    Ok(PublicKey::from_bytes(bytes))
}

pub fn encode_query(public_key: &PublicKey) -> Vec<u8> {
    public_key.as_bytes().to_vec()
}

/// `REVOKE` payload: the raw `RECORD_SIZE`-byte `RevocationRecord` image.
pub fn decode_revoke(payload: &[u8]) -> Result<RevocationRecord, RevRegError> {
    if payload.len() != RECORD_SIZE {
        return Err(RevRegError::MalformedMessage(format!(
            "REVOKE expects {RECORD_SIZE} bytes, got {}",
            payload.len()
        )));
    }
    RevocationRecord::from_bytes(payload)
}

pub fn encode_revoke(record: &RevocationRecord) -> Vec<u8> {
    record.to_bytes().to_vec()
}
