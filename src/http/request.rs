//! Request reading and rewriting.
//!
//! # Responsibilities
//! - Read client lines with a hard byte bound
//! - Split the request line into method and target
//! - Assemble the origin-bound request: substitute the User-Agent, force
//!   connection close, keep everything else the client sent
//!
//! # Design Decisions
//! - Lines stay raw bytes end to end: the target is the cache key
//!   bit-for-bit and preserved headers reach the origin byte-identical,
//!   so nothing is ever round-tripped through UTF-8
//! - Over-long client lines are an error, not a silent truncation
//! - Header matching is a case-insensitive prefix match
//! - The client's own Host header wins over a synthesized one

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::uri::RequestTarget;

/// Error type for request handling.
#[derive(Debug)]
pub enum RequestError {
    /// Failed to read from the client.
    Io(std::io::Error),
    /// A request or header line exceeded the configured bound.
    LineTooLong,
    /// The request line did not contain a method and a target.
    MalformedRequestLine(String),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Io(e) => write!(f, "Read failed: {}", e),
            RequestError::LineTooLong => write!(f, "Line exceeds the configured bound"),
            RequestError::MalformedRequestLine(line) => {
                write!(f, "Malformed request line: {:?}", line)
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// Read one raw line, terminator included, refusing lines longer than
/// `max` bytes. Returns `None` at EOF; a final unterminated line is
/// returned as-is.
pub async fn read_line_bounded<R>(
    reader: &mut R,
    max: usize,
) -> Result<Option<Vec<u8>>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = {
        let mut limited = (&mut *reader).take(max as u64 + 1);
        limited
            .read_until(b'\n', &mut buf)
            .await
            .map_err(RequestError::Io)?
    };

    if n == 0 {
        return Ok(None);
    }
    if buf.len() > max {
        return Err(RequestError::LineTooLong);
    }
    Ok(Some(buf))
}

/// Split a request line into its method and target tokens, untouched
/// byte-wise.
///
/// The protocol version token is accepted but ignored: the upstream
/// request is always rewritten to HTTP/1.0.
pub fn parse_request_line(line: &[u8]) -> Result<(Vec<u8>, Vec<u8>), RequestError> {
    let mut tokens = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty());
    match (tokens.next(), tokens.next()) {
        (Some(method), Some(target)) => Ok((method.to_vec(), target.to_vec())),
        _ => Err(RequestError::MalformedRequestLine(
            String::from_utf8_lossy(line).trim_end().to_string(),
        )),
    }
}

/// Consume the client's header block and assemble the origin-bound
/// request.
///
/// Client headers are passed through byte-identical and in order, except
/// that `User-Agent`, `Connection` and `Proxy-Connection` are replaced
/// by the proxy's own values. A client `Host` header is reused;
/// otherwise one is synthesized from the parsed target.
pub async fn build_upstream_request<R>(
    reader: &mut R,
    target: &RequestTarget,
    user_agent: &str,
    max_line: usize,
) -> Result<Vec<u8>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut request = Vec::with_capacity(max_line);
    request.extend_from_slice(b"GET ");
    request.extend_from_slice(&target.path);
    request.extend_from_slice(b" HTTP/1.0\r\n");

    let mut host_header: Option<Vec<u8>> = None;

    loop {
        let line = match read_line_bounded(reader, max_line).await? {
            Some(line) => line,
            None => break,
        };
        if line == b"\r\n" || line == b"\n" {
            break;
        }

        if has_prefix_ignore_case(&line, b"Host:") {
            host_header = Some(line);
            continue;
        }
        if has_prefix_ignore_case(&line, b"User-Agent:")
            || has_prefix_ignore_case(&line, b"Connection:")
            || has_prefix_ignore_case(&line, b"Proxy-Connection:")
        {
            continue;
        }

        request.extend_from_slice(&line);
    }

    match host_header {
        Some(header) => request.extend_from_slice(&header),
        None => {
            request.extend_from_slice(b"Host: ");
            request.extend_from_slice(&target.host);
            request.extend_from_slice(b"\r\n");
        }
    }
    request.extend_from_slice(b"User-Agent: ");
    request.extend_from_slice(user_agent.as_bytes());
    request.extend_from_slice(b"\r\n");
    request.extend_from_slice(b"Connection: close\r\n");
    request.extend_from_slice(b"Proxy-Connection: close\r\n\r\n");

    Ok(request)
}

/// Consume and discard the rest of the client's header block.
///
/// Used before an early response so the connection closes with nothing
/// left unread on the socket.
pub async fn drain_headers<R>(reader: &mut R, max_line: usize)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match read_line_bounded(reader, max_line).await {
            Ok(Some(line)) if line != b"\r\n" && line != b"\n" => continue,
            _ => break,
        }
    }
}

fn has_prefix_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}
