//! revreg-p2p
//!
//! Peer networking for the revocation registry: liveness/discovery over
//! `identify`/`ping`, application traffic (flood pushes and set
//! reconciliation) over a custom `request_response` protocol, and the
//! peer session state machine (component G) and flood dispatcher
//! (component H) built on top.

pub mod config;
pub mod flood;
pub mod message;
pub mod network;
pub mod reconcile;
pub mod session;

pub use config::P2pConfig;
pub use flood::{flood, RecordOrigin};
pub use message::{P2pRequest, P2pResponse};
pub use network::{P2pNetwork, P2pNetworkEvent};
pub use reconcile::{application_id, LocalSetReconciler, SetReconciler};
pub use session::{PeerEntry, SessionRole, SessionState};
