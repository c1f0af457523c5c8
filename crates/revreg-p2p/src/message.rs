use revreg_core::types::KeyHash;
use serde::{Deserialize, Serialize};

/// Request/response envelope exchanged between peers. A peer-to-peer
/// connection carries both flood pushes (component H) and set-reconciliation
/// traffic (component G) over the same request/response channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum P2pRequest {
    /// Push one newly-accepted `RevocationRecord`'s wire bytes to a peer.
    /// Peers never reject a flood push on protocol grounds; the application
    /// layer re-runs full validation on arrival, exactly as if the record
    /// had come from a client.
    Flood { record_bytes: Vec<u8> },

    /// Open (or re-synchronize) a set-reconciliation exchange, naming the
    /// fixed 512-bit application identifier both sides must agree on.
    ReconcileOpen { app_id: [u8; 64] },

    /// One batch of `KeyHash` elements offered during reconciliation.
    ReconcileElements { elements: Vec<KeyHash> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum P2pResponse {
    Ack,
    ReconcileElements { elements: Vec<KeyHash> },
    ReconcileDone,
}

impl P2pRequest {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("P2pRequest serialization is infallible")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl P2pResponse {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("P2pResponse serialization is infallible")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
