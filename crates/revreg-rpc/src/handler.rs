use crate::command::RpcCommand;
use crate::frame::{read_frame, write_frame};
use crate::types::{decode_query, decode_revoke, IsValid};
use revreg_core::constants::{RPC_MSG_QUERY, RPC_MSG_QUERY_RESPONSE, RPC_MSG_REVOKE, RPC_MSG_REVOKE_RESPONSE};
use revreg_core::error::RevRegError;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

/// Accept connections on `addr` forever, spawning one task per connection.
/// Each connection task only frames bytes and forwards `RpcCommand`s over
/// `commands`; it never touches the index or store directly.
pub async fn serve(addr: &str, commands: mpsc::Sender<RpcCommand>) -> Result<(), RevRegError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| RevRegError::ConfigurationError(format!("rpc bind {addr}: {e}")))?;

    loop {
        let (stream, peer_addr) = listener
            .accept()
            .await
            .map_err(|e| RevRegError::Other(format!("rpc accept: {e}")))?;
        tracing::debug!(%peer_addr, "rpc client connected");

        let commands = commands.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, commands).await {
                tracing::debug!(%peer_addr, %err, "rpc connection closed");
            }
        });
    }
}

/// Serve one client connection until it disconnects. A malformed frame
/// breaks the protocol for that one message only — it does not close the
/// channel. Requests are handled strictly one at a time: the next frame is
/// only read once the current request's response has been written, so a
/// single client connection can never have more than one request pending.
async fn handle_connection(mut stream: TcpStream, commands: mpsc::Sender<RpcCommand>) -> Result<(), RevRegError> {
    loop {
        let (msg_type, payload) = read_frame(&mut stream).await?;

        let (response_type, is_valid) = match msg_type {
            RPC_MSG_QUERY => (RPC_MSG_QUERY_RESPONSE, handle_query(&payload, &commands).await),
            RPC_MSG_REVOKE => (RPC_MSG_REVOKE_RESPONSE, handle_revoke(&payload, &commands).await),
            other => {
                tracing::debug!(msg_type = other, "dropping unknown rpc message type");
                continue;
            }
        };

        write_frame(&mut stream, response_type, &is_valid.to_bytes()).await?;
    }
}

async fn handle_query(payload: &[u8], commands: &mpsc::Sender<RpcCommand>) -> IsValid {
    let public_key = match decode_query(payload) {
        Ok(pk) => pk,
        Err(_) => return IsValid::InternalError,
    };

    let (tx, rx) = oneshot::channel();
    if commands
        .send(RpcCommand::Query {
            public_key,
            respond_to: tx,
        })
        .await
        .is_err()
    {
        return IsValid::InternalError;
    }

    match rx.await {
        Ok(true) => IsValid::Revoked,
        Ok(false) => IsValid::Valid,
        Err(_) => IsValid::InternalError,
    }
}

async fn handle_revoke(payload: &[u8], commands: &mpsc::Sender<RpcCommand>) -> IsValid {
    let record = match decode_revoke(payload) {
        Ok(record) => record,
        Err(_) => return IsValid::InternalError,
    };

    let (tx, rx) = oneshot::channel();
    if commands.send(RpcCommand::Revoke { record, respond_to: tx }).await.is_err() {
        return IsValid::InternalError;
    }

    match rx.await {
        // Revocation committed, or the key was already revoked — either way
        // the key is no longer valid.
        Ok(Ok(())) | Ok(Err(RevRegError::Duplicate(_))) => IsValid::Revoked,
        Ok(Err(RevRegError::PersistenceFailure(_))) => IsValid::InternalError,
        Ok(Err(_)) => IsValid::Valid,
        Err(_) => IsValid::InternalError,
    }
}
