use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use revreg_core::types::PublicKey;
use zeroize::Zeroizing;

/// An ECDSA/secp256k1 keypair. The signing key is held in a `Zeroizing`
/// wrapper so its bytes are wiped on drop.
pub struct KeyPair {
    pub public_key: PublicKey,
    signing_key: Zeroizing<[u8; 32]>,
}

impl KeyPair {
    /// Generate a fresh secp256k1 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        let compressed: [u8; 33] = verifying_key
            .to_encoded_point(true)
            .as_bytes()
            .try_into()
            .expect("compressed SEC1 point is always 33 bytes");

        Self {
            public_key: PublicKey::from_bytes(compressed),
            signing_key: Zeroizing::new(signing_key.to_bytes().into()),
        }
    }

    /// Restore a `KeyPair` from a raw 32-byte secret scalar.
    pub fn from_raw(secret_bytes: [u8; 32]) -> Result<Self, crate::ecdsa::SignatureError> {
        let signing_key = SigningKey::from_bytes((&secret_bytes).into())
            .map_err(|_| crate::ecdsa::SignatureError::InvalidPublicKeyLength {
                expected: 32,
                got: secret_bytes.len(),
            })?;
        let verifying_key = signing_key.verifying_key();
        let compressed: [u8; 33] = verifying_key
            .to_encoded_point(true)
            .as_bytes()
            .try_into()
            .expect("compressed SEC1 point is always 33 bytes");

        Ok(Self {
            public_key: PublicKey::from_bytes(compressed),
            signing_key: Zeroizing::new(secret_bytes),
        })
    }

    /// Sign a revocation record's purpose tuple.
    pub fn sign(&self, message: &[u8]) -> revreg_core::types::Signature {
        crate::ecdsa::sign(&self.signing_key, message)
            .expect("sign with a valid secret key is infallible")
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}
