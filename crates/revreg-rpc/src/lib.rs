//! revreg-rpc
//!
//! Client-facing RPC for the revocation registry (component I): a raw
//! `{size: u16, type: u16}`-framed TCP protocol carrying `QUERY`/`REVOKE`
//! requests, rather than JSON-RPC. Connection tasks only frame bytes; every
//! request is handed off as an `RpcCommand` to whichever task owns the
//! revocation index and store.

pub mod command;
pub mod frame;
pub mod handler;
pub mod types;

pub use command::RpcCommand;
pub use handler::serve;
pub use types::{decode_query, decode_revoke, encode_query, encode_revoke, IsValid};
