use revreg_core::constants::SET_RECONCILIATION_APP_ID_STRING;
use revreg_core::types::KeyHash;
use std::collections::HashSet;

/// 512-bit application identifier both sides of a reconciliation exchange
/// must agree on. Interoperating with any particular external
/// set-reconciliation implementation is not required — only this
/// identifier, the element type (`KeyHash`), and its encoding are fixed.
pub fn application_id() -> [u8; 64] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(SET_RECONCILIATION_APP_ID_STRING.as_bytes());
    let mut out = [0u8; 64];
    hasher.finalize_xof().fill(&mut out);
    out
}

/// Abstraction over the set-reconciliation protocol itself (component G):
/// given the elements the local side already holds, and a batch offered by
/// the remote side, produce the elements to send back and the elements the
/// remote side is missing.
pub trait SetReconciler {
    fn application_id(&self) -> [u8; 64];

    /// Elements the local side knows about, to offer a peer opening a
    /// session with us.
    fn local_elements(&self) -> Vec<KeyHash>;

    /// Fold a batch of elements the remote side offered into the local
    /// working set, returning the elements the remote side is missing
    /// (i.e. ones we have that it didn't offer).
    fn reconcile(&self, offered: &[KeyHash]) -> Vec<KeyHash>;
}

/// The production `SetReconciler`: plain in-memory set union over
/// `KeyHash`. There is no external set-reconciliation library dependency —
/// the protocol only fixes the application id/encoding, not an
/// implementation, so a local set-union adapter is sufficient.
pub struct LocalSetReconciler {
    elements: HashSet<KeyHash>,
}

impl LocalSetReconciler {
    pub fn new() -> Self {
        Self {
            elements: HashSet::new(),
        }
    }

    pub fn from_elements(elements: impl IntoIterator<Item = KeyHash>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, key_hash: KeyHash) {
        self.elements.insert(key_hash);
    }
}

impl Default for LocalSetReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl SetReconciler for LocalSetReconciler {
    fn application_id(&self) -> [u8; 64] {
        application_id()
    }

    fn local_elements(&self) -> Vec<KeyHash> {
        self.elements.iter().copied().collect()
    }

    fn reconcile(&self, offered: &[KeyHash]) -> Vec<KeyHash> {
        let offered: HashSet<KeyHash> = offered.iter().copied().collect();
        self.elements
            .iter()
            .filter(|k| !offered.contains(k))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_id_is_stable() {
        assert_eq!(application_id(), application_id());
        // 512 bits.
        assert_eq!(application_id().len(), 64);
    }

    #[test]
    fn reconcile_returns_only_missing_elements() {
        let mut reconciler = LocalSetReconciler::new();
        let a = KeyHash::from_bytes([1u8; 32]);
        let b = KeyHash::from_bytes([2u8; 32]);
        reconciler.insert(a);
        reconciler.insert(b);

        let missing = reconciler.reconcile(&[a]);
        assert_eq!(missing, vec![b]);
    }

    #[test]
    fn reconcile_with_everything_offered_is_empty() {
        let mut reconciler = LocalSetReconciler::new();
        let a = KeyHash::from_bytes([1u8; 32]);
        reconciler.insert(a);
        assert!(reconciler.reconcile(&[a]).is_empty());
    }
}
