//! Request header helpers

use std::net::SocketAddr;

use reqwest::header::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Best guess at the calling client's address
///
/// `X-Forwarded-For` wins when present and is returned verbatim (proxy chains
/// included). Otherwise the host part of `remote_addr`, or `remote_addr`
/// itself when it has no port.
pub fn client_ip_address(headers: &HeaderMap, remote_addr: &str) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .filter(|origin| !origin.is_empty());
    if let Some(origin) = forwarded {
        return origin.to_string();
    }

    split_host(remote_addr)
        .unwrap_or(remote_addr)
        .to_string()
}

/// Numeric header value, 0 when missing or not an unsigned integer
pub fn extract_u64_header(headers: &HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn split_host(addr: &str) -> Option<&str> {
    if addr.parse::<SocketAddr>().is_ok() {
        let (host, _) = addr.rsplit_once(':')?;
        return Some(host.trim_start_matches('[').trim_end_matches(']'));
    }

    // host names: "name:port" with exactly one colon
    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_precedence() {
        let map = headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(
            client_ip_address(&map, "10.0.0.1:5555"),
            "203.0.113.9, 10.0.0.1"
        );
    }

    #[test]
    fn test_remote_addr_host_part() {
        let map = HeaderMap::new();
        assert_eq!(client_ip_address(&map, "192.168.1.20:8080"), "192.168.1.20");
        assert_eq!(client_ip_address(&map, "[::1]:443"), "::1");
        assert_eq!(client_ip_address(&map, "gateway.local:80"), "gateway.local");
    }

    #[test]
    fn test_remote_addr_without_port_is_returned_as_is() {
        let map = HeaderMap::new();
        assert_eq!(client_ip_address(&map, "192.168.1.20"), "192.168.1.20");
        assert_eq!(client_ip_address(&map, "::1"), "::1");
    }

    #[test]
    fn test_empty_forwarded_header_is_ignored() {
        let map = headers(&[("x-forwarded-for", "")]);
        assert_eq!(client_ip_address(&map, "10.1.1.1:9"), "10.1.1.1");
    }

    #[test]
    fn test_extract_u64_header() {
        let map = headers(&[("x-sequence", "42"), ("x-bad", "forty-two"), ("x-neg", "-1")]);
        assert_eq!(extract_u64_header(&map, "X-Sequence"), 42);
        assert_eq!(extract_u64_header(&map, "X-Bad"), 0);
        assert_eq!(extract_u64_header(&map, "X-Neg"), 0);
        assert_eq!(extract_u64_header(&map, "X-Missing"), 0);
    }
}
