//! Request-target decomposition.
//!
//! # Responsibilities
//! - Split an absolute or host-relative target into host, port and path
//! - Never fail: pathological targets surface later as a connect error
//!
//! # Design Decisions
//! - The target is raw bytes and stays raw: host and path are byte
//!   slices of it, so nothing the client sent is rewritten
//! - The port is the leading digit run after the first `:`; anything
//!   else parses as port 0 and dies at connect time
//! - Missing path is `/`, missing port is 80

use std::borrow::Cow;

/// The origin coordinates extracted from a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub host: Vec<u8>,
    pub port: u16,
    pub path: Vec<u8>,
}

impl RequestTarget {
    /// Host as text, for resolution and logging. A host with bytes
    /// outside UTF-8 cannot name a resolvable server and fails at
    /// connect time.
    pub fn host_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.host)
    }
}

/// Decompose a request target such as `http://host:port/path`,
/// `host:port/path` or a bare `host`.
pub fn parse_target(target: &[u8]) -> RequestTarget {
    let rest = match target.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case(b"http://") => &target[7..],
        _ => target,
    };

    if let Some(colon) = rest.iter().position(|&b| b == b':') {
        let digits: &[u8] = {
            let after = &rest[colon + 1..];
            let end = after
                .iter()
                .position(|b| !b.is_ascii_digit())
                .unwrap_or(after.len());
            &after[..end]
        };

        RequestTarget {
            host: rest[..colon].to_vec(),
            port: parse_port(digits),
            path: path_from(rest),
        }
    } else {
        let host = match rest.iter().position(|&b| b == b'/') {
            Some(slash) => &rest[..slash],
            None => rest,
        };

        RequestTarget {
            host: host.to_vec(),
            port: 80,
            path: path_from(rest),
        }
    }
}

fn parse_port(digits: &[u8]) -> u16 {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn path_from(rest: &[u8]) -> Vec<u8> {
    match rest.iter().position(|&b| b == b'/') {
        Some(slash) => rest[slash..].to_vec(),
        None => b"/".to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_with_port_and_path() {
        let t = parse_target(b"http://example.com:8080/index.html");
        assert_eq!(t.host, b"example.com".to_vec());
        assert_eq!(t.port, 8080);
        assert_eq!(t.path, b"/index.html".to_vec());
    }

    #[test]
    fn test_relative_with_path_defaults_port() {
        let t = parse_target(b"example.com/index.html");
        assert_eq!(t.host, b"example.com".to_vec());
        assert_eq!(t.port, 80);
        assert_eq!(t.path, b"/index.html".to_vec());
    }

    #[test]
    fn test_bare_host() {
        let t = parse_target(b"http://example.com");
        assert_eq!(t.host, b"example.com".to_vec());
        assert_eq!(t.port, 80);
        assert_eq!(t.path, b"/".to_vec());
    }

    #[test]
    fn test_host_with_port_no_path() {
        let t = parse_target(b"example.com:8080");
        assert_eq!(t.host, b"example.com".to_vec());
        assert_eq!(t.port, 8080);
        assert_eq!(t.path, b"/".to_vec());
    }

    #[test]
    fn test_scheme_prefix_is_case_insensitive() {
        let t = parse_target(b"HTTP://Example.com/a");
        assert_eq!(t.host, b"Example.com".to_vec());
        assert_eq!(t.path, b"/a".to_vec());
    }

    #[test]
    fn test_non_numeric_port_becomes_zero() {
        let t = parse_target(b"example.com:abc/a");
        assert_eq!(t.host, b"example.com".to_vec());
        assert_eq!(t.port, 0);
        assert_eq!(t.path, b"/a".to_vec());
    }

    #[test]
    fn test_port_digit_run_stops_at_slash() {
        let t = parse_target(b"example.com:8080/a/b");
        assert_eq!(t.port, 8080);
        assert_eq!(t.path, b"/a/b".to_vec());
    }

    #[test]
    fn test_path_bytes_survive_untouched() {
        let t = parse_target(b"http://example.com/\xA9/page");
        assert_eq!(t.path, b"/\xA9/page".to_vec());
    }

    #[test]
    fn test_empty_target_is_total() {
        let t = parse_target(b"");
        assert_eq!(t.host, b"".to_vec());
        assert_eq!(t.port, 80);
        assert_eq!(t.path, b"/".to_vec());
    }
}
