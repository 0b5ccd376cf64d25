//! Newline-delimited JSON-RPC transport
//!
//! Lines are framed as raw bytes and decoded afterwards, so a line that is
//! not UTF-8 or not JSON gets a parse error reply instead of ending the
//! session.

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::mcp::server::TopzMcpServer;
use futures::StreamExt;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};

/// Serve requests from `reader` until it is closed, writing one response
/// line per request to `writer`
pub async fn serve<R, W>(server: &TopzMcpServer, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let codec = AnyDelimiterCodec::new(b"\n".to_vec(), b"\n".to_vec());
    let mut lines = FramedRead::new(reader, codec);

    while let Some(chunk) = lines.next().await {
        let chunk = chunk.map_err(|e| match e {
            AnyDelimiterCodecError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })?;

        let line = match std::str::from_utf8(&chunk) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!("Discarding line that is not valid UTF-8: {}", e);
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                send_response(&mut writer, &response).await?;
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        tracing::debug!("Received: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                send_response(&mut writer, &response).await?;
                continue;
            }
        };

        if let Some(response) = server.handle_request(request).await {
            send_response(&mut writer, &response).await?;
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}

async fn send_response<W>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_string(response)?;
    tracing::debug!("Sending: {}", json);
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await
}
