//! Caller IP resolution
//!
//! The peer address of the connection is the default source. Behind a
//! reverse proxy the forwarding headers can be trusted instead. Loopback
//! callers are replaced by a fixed public IP so local requests still
//! geolocate to somewhere real.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// How caller addresses are derived for a request
#[derive(Debug, Clone, Copy)]
pub struct ClientIpPolicy {
    /// Public IP used in place of loopback callers
    pub loopback_fallback: IpAddr,
    /// Prefer `X-Forwarded-For` / `X-Real-IP` over the peer address
    pub trust_proxy_headers: bool,
}

impl ClientIpPolicy {
    /// The address reported to the visitor and sent to geolocation
    #[must_use]
    pub fn resolve(&self, peer: SocketAddr, headers: &HeaderMap) -> IpAddr {
        let forwarded = if self.trust_proxy_headers {
            forwarded_ip(headers)
        } else {
            None
        };

        let ip = forwarded.unwrap_or_else(|| peer.ip()).to_canonical();
        if ip.is_loopback() {
            tracing::debug!(%ip, substitute = %self.loopback_fallback, "Loopback caller");
            self.loopback_fallback
        } else {
            ip
        }
    }
}

/// First parseable address from the forwarding headers
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_forwarded_for = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_ip);

    from_forwarded_for.or_else(|| {
        headers
            .get(X_REAL_IP)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_ip)
    })
}

// Proxies sometimes append the port; accept both forms.
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn policy(trust_proxy_headers: bool) -> ClientIpPolicy {
        ClientIpPolicy {
            loopback_fallback: "8.8.8.8".parse().unwrap(),
            trust_proxy_headers,
        }
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[rstest]
    #[case("127.0.0.1:5000", "8.8.8.8")]
    #[case("127.10.20.30:5000", "8.8.8.8")]
    #[case("[::1]:5000", "8.8.8.8")]
    #[case("[::ffff:127.0.0.1]:5000", "8.8.8.8")]
    #[case("203.0.113.7:443", "203.0.113.7")]
    #[case("[::ffff:203.0.113.7]:443", "203.0.113.7")]
    #[case("[2001:db8::1]:443", "2001:db8::1")]
    fn test_resolve_from_peer(#[case] peer: &str, #[case] expected: &str) {
        let resolved = policy(false).resolve(peer.parse().unwrap(), &HeaderMap::new());
        assert_eq!(resolved, expected.parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_headers_ignored_when_untrusted() {
        let resolved = policy(false).resolve(
            "203.0.113.7:443".parse().unwrap(),
            &headers(&[("x-forwarded-for", "198.51.100.1")]),
        );
        assert_eq!(resolved, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[rstest]
    #[case(&[("x-forwarded-for", "198.51.100.1, 10.0.0.1")], "198.51.100.1")]
    #[case(&[("x-forwarded-for", "garbage, 198.51.100.2")], "198.51.100.2")]
    #[case(&[("x-forwarded-for", "198.51.100.3:8080")], "198.51.100.3")]
    #[case(&[("x-real-ip", "198.51.100.4")], "198.51.100.4")]
    #[case(&[("x-forwarded-for", "unknown")], "203.0.113.7")]
    #[case(&[("x-forwarded-for", "127.0.0.1")], "8.8.8.8")]
    fn test_resolve_trusting_proxy(
        #[case] pairs: &[(&'static str, &'static str)],
        #[case] expected: &str,
    ) {
        let resolved = policy(true).resolve("203.0.113.7:443".parse().unwrap(), &headers(pairs));
        assert_eq!(resolved, expected.parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let resolved = policy(true).resolve(
            "127.0.0.1:443".parse().unwrap(),
            &headers(&[("x-real-ip", "198.51.100.9"), ("x-forwarded-for", "198.51.100.1")]),
        );
        assert_eq!(resolved, "198.51.100.1".parse::<IpAddr>().unwrap());
    }
}
