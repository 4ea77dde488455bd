//! Response relay and error pages.
//!
//! # Responsibilities
//! - Stream the origin response to the client as it arrives
//! - Capture the streamed bytes for the cache while they stay under the
//!   per-object bound
//! - Emit minimal HTTP/1.0 error responses
//!
//! # Design Decisions
//! - The relay is chunk-oriented: a chunk ends at a newline or at the
//!   line bound, whichever comes first, so binary bodies pass through
//! - The capture holds the response bit-for-bit (status line, headers,
//!   body); a cache hit replays it without synthesizing anything
//! - An origin response that outgrows the bound keeps streaming and is
//!   simply not cached

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Relay the origin response to the client, capturing it for the cache.
///
/// Returns the captured bytes if the whole response fit under
/// `max_object`, `None` if it outgrew the bound. An error on either
/// socket aborts the relay.
pub async fn stream_and_capture<R, W>(
    origin: &mut R,
    client: &mut W,
    max_object: usize,
    max_chunk: usize,
) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut capture: Option<Vec<u8>> = Some(Vec::new());
    let mut chunk = Vec::with_capacity(max_chunk);

    loop {
        chunk.clear();
        let n = {
            let mut limited = (&mut *origin).take(max_chunk as u64);
            limited.read_until(b'\n', &mut chunk).await?
        };
        if n == 0 {
            break;
        }

        client.write_all(&chunk).await?;

        if let Some(buf) = capture.as_mut() {
            if buf.len() + chunk.len() <= max_object {
                buf.extend_from_slice(&chunk);
            } else {
                capture = None;
            }
        }
    }

    client.flush().await?;
    Ok(capture)
}

/// Write an HTTP/1.0 error response with a minimal HTML body naming the
/// status and its cause.
pub async fn write_client_error<W>(
    writer: &mut W,
    status: u16,
    reason: &str,
    cause: &str,
    detail: &str,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!("HTTP/1.0 {} {}\r\nContent-type: text/html\r\n\r\n", status, reason);
    let body = format!(
        "<html><title>Proxy Error</title><body bgcolor=\"ffffff\">\r\n\
         {}: {}\r\n\
         <p>{}: {}\r\n\
         <hr><em>The forward proxy</em>\r\n",
        status, reason, detail, cause
    );

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}
