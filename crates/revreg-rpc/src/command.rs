use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_core::types::PublicKey;
use tokio::sync::oneshot;

/// A single client-originated request handed off from a connection task to
/// whichever component owns the revocation index and store (component J's
/// `Service`). Keeping this boundary a channel, rather than a shared
/// `Arc<Mutex<_>>`, is what lets the backend stay single-owner while still
/// serving many concurrent connections.
pub enum RpcCommand {
    /// `true` iff the index already holds a revocation for this key.
    Query {
        public_key: PublicKey,
        respond_to: oneshot::Sender<bool>,
    },
    Revoke {
        record: RevocationRecord,
        respond_to: oneshot::Sender<Result<(), RevRegError>>,
    },
}
