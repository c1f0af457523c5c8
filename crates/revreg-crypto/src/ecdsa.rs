use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as K256Signature, SigningKey, VerifyingKey};
use revreg_core::types::{PublicKey, Signature};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key length: expected {expected}, got {got}")]
    InvalidPublicKeyLength { expected: usize, got: usize },
}

/// Sign `message` with a raw 32-byte secp256k1 secret scalar.
pub fn sign(secret_bytes: &[u8; 32], message: &[u8]) -> Result<Signature, SignatureError> {
    let signing_key = SigningKey::from_bytes(secret_bytes.into())
        .map_err(|_| SignatureError::InvalidPublicKeyLength {
            expected: 32,
            got: secret_bytes.len(),
        })?;
    let sig: K256Signature = signing_key.sign(message);
    let bytes: [u8; 64] = sig
        .to_bytes()
        .as_slice()
        .try_into()
        .expect("k256 signatures are always 64 bytes");
    Ok(Signature::from_bytes(bytes))
}

/// Verify `signature` over `message` against `public_key`.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key.as_bytes())
        .map_err(|_| SignatureError::InvalidPublicKeyLength {
            expected: 33,
            got: public_key.as_bytes().len(),
        })?;
    let sig = K256Signature::from_slice(signature.as_bytes())
        .map_err(|_| SignatureError::InvalidSignature)?;
    verifying_key
        .verify(message, &sig)
        .map_err(|_| SignatureError::InvalidSignature)
}
