use revreg_core::constants::RPC_FRAME_HEADER_LEN;
use revreg_core::error::RevRegError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one `{size: u16, type: u16}`-framed message: a 4-byte header
/// (network byte order) followed by exactly `size` payload bytes.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(u16, Vec<u8>), RevRegError> {
    let mut header = [0u8; RPC_FRAME_HEADER_LEN];
    reader
        .read_exact(&mut header)
        .await
        .map_err(|e| RevRegError::MalformedMessage(format!("frame header: {e}")))?;

    let size = u16::from_be_bytes([header[0], header[1]]);
    let msg_type = u16::from_be_bytes([header[2], header[3]]);

    let mut payload = vec![0u8; size as usize];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| RevRegError::MalformedMessage(format!("frame payload: {e}")))?;

    Ok((msg_type, payload))
}

/// Write one `{size, type}`-framed message.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg_type: u16,
    payload: &[u8],
) -> Result<(), RevRegError> {
    let size: u16 = payload
        .len()
        .try_into()
        .map_err(|_| RevRegError::MalformedMessage("payload exceeds u16 frame size".into()))?;

    let mut header = [0u8; RPC_FRAME_HEADER_LEN];
    header[0..2].copy_from_slice(&size.to_be_bytes());
    header[2..4].copy_from_slice(&msg_type.to_be_bytes());

    writer
        .write_all(&header)
        .await
        .map_err(|e| RevRegError::PersistenceFailure(format!("write frame header: {e}")))?;
    writer
        .write_all(payload)
        .await
        .map_err(|e| RevRegError::PersistenceFailure(format!("write frame payload: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| RevRegError::PersistenceFailure(format!("flush frame: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, 42, b"hello").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let (msg_type, payload) = read_frame(&mut cursor).await.unwrap();
        assert_eq!(msg_type, 42);
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn short_read_is_malformed() {
        let buf = vec![0u8, 5, 0, 1, b'h', b'i']; // claims 5 bytes, only has 2
        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, RevRegError::MalformedMessage(_)));
    }
}
