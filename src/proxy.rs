//! # ProxyRing — rotating proxy pool
//!
//! ## Responsibility
//! Parse raw proxy endpoints into ready-to-use HTTP clients and hand them
//! out in strict round-robin order, lock-free, to any number of checkers.
//!
//! ## Guarantees
//! - Each [`Proxy`] owns one pre-built client with the run's timeouts baked in
//! - [`ProxyRing::next`] distributes assignments evenly: k concurrent calls
//!   receive k distinct ring tickets (atomic fetch-add, wrapping modulo len)
//! - Credentials never appear in [`Proxy::endpoint`] or log output
//!
//! ## NOT Responsible For
//! - Health-checking or ejecting dead proxies (a bad proxy simply burns
//!   retry attempts for the codes it serves)
//! - Reading the proxy list from disk (see: input.rs)

use crate::config::CheckerConfig;
use crate::CheckerError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// One upstream proxy and the HTTP client that tunnels through it.
///
/// Built once at startup via [`Proxy::parse`]; cloning is cheap (the inner
/// client is reference-counted).
#[derive(Debug, Clone)]
pub struct Proxy {
    /// Redacted endpoint URL, credentials stripped. Safe to log.
    endpoint: String,
    /// Client with this proxy, the request timeout, and the connect timeout
    /// already applied.
    client: reqwest::Client,
}

impl Proxy {
    /// Parse a raw proxy line and build its dedicated HTTP client.
    ///
    /// Lines without a scheme get `http://` prepended, so the common
    /// `host:port` and `user:pass@host:port` list formats both work.
    /// Credentials embedded in the URL become proxy basic-auth.
    ///
    /// # Arguments
    ///
    /// * `raw` — One proxy endpoint, e.g. `1.2.3.4:8080` or
    ///   `user:secret@1.2.3.4:8080`
    /// * `config` — Run configuration supplying the client timeouts
    ///
    /// # Returns
    ///
    /// - `Ok(Proxy)` on success
    /// - `Err(CheckerError::InvalidProxy)` if the endpoint does not parse
    /// - `Err(CheckerError::ClientBuild)` if the client cannot be constructed
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn parse(raw: &str, config: &CheckerConfig) -> Result<Self, CheckerError> {
        let raw = raw.trim();
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let mut url = Url::parse(&with_scheme).map_err(|e| CheckerError::InvalidProxy {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })?;

        let username = url.username().to_string();
        let password = url.password().map(str::to_string);

        // Strip credentials so the stored endpoint is safe to log.
        url.set_username("").map_err(|()| CheckerError::InvalidProxy {
            endpoint: raw.to_string(),
            reason: "cannot strip username from endpoint".to_string(),
        })?;
        url.set_password(None).map_err(|()| CheckerError::InvalidProxy {
            endpoint: raw.to_string(),
            reason: "cannot strip password from endpoint".to_string(),
        })?;

        let mut proxy = reqwest::Proxy::all(url.as_str()).map_err(|e| {
            CheckerError::InvalidProxy {
                endpoint: url.as_str().to_string(),
                reason: e.to_string(),
            }
        })?;
        if !username.is_empty() {
            proxy = proxy.basic_auth(&username, password.as_deref().unwrap_or(""));
        }

        let client = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| CheckerError::ClientBuild(e.to_string()))?;

        Ok(Self {
            endpoint: url.as_str().to_string(),
            client,
        })
    }

    /// The proxy endpoint with credentials stripped. Safe to log.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The HTTP client that routes through this proxy.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)
    }
}

/// Fixed pool of proxies handed out round-robin.
///
/// The cursor is a single atomic counter, so [`ProxyRing::next`] needs no
/// lock and never blocks a checker.
#[derive(Debug)]
pub struct ProxyRing {
    /// Parsed proxies in list order.
    proxies: Vec<Proxy>,
    /// Monotonic ticket counter; index = ticket % len.
    position: AtomicUsize,
}

impl ProxyRing {
    /// Build a ring from already-parsed proxies.
    ///
    /// # Returns
    ///
    /// - `Ok(ProxyRing)` when at least one proxy is supplied
    /// - `Err(CheckerError::NoProxies)` for an empty list
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn new(proxies: Vec<Proxy>) -> Result<Self, CheckerError> {
        if proxies.is_empty() {
            return Err(CheckerError::NoProxies);
        }
        Ok(Self {
            proxies,
            position: AtomicUsize::new(0),
        })
    }

    /// Parse raw endpoint lines and build the ring in one step.
    ///
    /// Fails on the first unparsable line so a typo in the proxy list is
    /// reported before any requests go out.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn from_lines(lines: &[String], config: &CheckerConfig) -> Result<Self, CheckerError> {
        let mut proxies = Vec::with_capacity(lines.len());
        for line in lines {
            proxies.push(Proxy::parse(line, config)?);
        }
        Self::new(proxies)
    }

    /// Take the next proxy in rotation.
    ///
    /// Wraps around indefinitely; the constructor guarantees the ring is
    /// non-empty, so this always succeeds.
    pub fn next(&self) -> &Proxy {
        let ticket = self.position.fetch_add(1, Ordering::Relaxed);
        &self.proxies[ticket % self.proxies.len()]
    }

    /// Number of proxies in the ring.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Always `false`: the constructor rejects empty rings.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
mod tests {
    use super::*;

    fn test_proxy(raw: &str) -> Proxy {
        Proxy::parse(raw, &CheckerConfig::default()).expect("test: parse proxy")
    }

    #[test]
    fn test_parse_bare_host_port_gets_http_scheme() {
        let proxy = test_proxy("127.0.0.1:8080");
        assert!(proxy.endpoint().starts_with("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_parse_keeps_explicit_scheme() {
        let proxy = test_proxy("http://10.0.0.1:3128");
        assert!(proxy.endpoint().starts_with("http://10.0.0.1:3128"));
    }

    #[test]
    fn test_parse_strips_credentials_from_endpoint() {
        let proxy = test_proxy("agent:hunter2@127.0.0.1:8080");
        assert!(!proxy.endpoint().contains("agent"));
        assert!(!proxy.endpoint().contains("hunter2"));
        assert!(proxy.endpoint().contains("127.0.0.1:8080"));
    }

    #[test]
    fn test_display_matches_redacted_endpoint() {
        let proxy = test_proxy("user:pw@127.0.0.1:9999");
        assert_eq!(proxy.to_string(), proxy.endpoint());
        assert!(!proxy.to_string().contains("pw"));
    }

    #[test]
    fn test_parse_rejects_unparsable_endpoint() {
        let result = Proxy::parse("not a proxy line", &CheckerConfig::default());
        assert!(matches!(result, Err(CheckerError::InvalidProxy { .. })));
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        let result = Proxy::parse("127.0.0.1:notaport", &CheckerConfig::default());
        assert!(matches!(result, Err(CheckerError::InvalidProxy { .. })));
    }

    #[test]
    fn test_parse_error_names_endpoint() {
        let err = Proxy::parse("127.0.0.1:notaport", &CheckerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("127.0.0.1:notaport"));
    }

    #[test]
    fn test_ring_rejects_empty_list() {
        let result = ProxyRing::new(Vec::new());
        assert!(matches!(result, Err(CheckerError::NoProxies)));
    }

    #[test]
    fn test_ring_rotates_in_list_order() {
        let ring = ProxyRing::new(vec![
            test_proxy("127.0.0.1:1001"),
            test_proxy("127.0.0.1:1002"),
            test_proxy("127.0.0.1:1003"),
        ])
        .expect("test: build ring");

        let endpoints: Vec<String> = (0..6).map(|_| ring.next().endpoint().to_string()).collect();
        assert!(endpoints[0].contains(":1001"));
        assert!(endpoints[1].contains(":1002"));
        assert!(endpoints[2].contains(":1003"));
        // Wraps back to the start.
        assert_eq!(endpoints[3], endpoints[0]);
        assert_eq!(endpoints[4], endpoints[1]);
        assert_eq!(endpoints[5], endpoints[2]);
    }

    #[test]
    fn test_ring_from_lines() {
        let lines = vec!["127.0.0.1:2001".to_string(), "127.0.0.1:2002".to_string()];
        let ring =
            ProxyRing::from_lines(&lines, &CheckerConfig::default()).expect("test: build ring");
        assert_eq!(ring.len(), 2);
        assert!(!ring.is_empty());
    }

    #[test]
    fn test_ring_from_lines_fails_on_bad_line() {
        let lines = vec!["127.0.0.1:3001".to_string(), "definitely not:a proxy".to_string()];
        let result = ProxyRing::from_lines(&lines, &CheckerConfig::default());
        assert!(matches!(result, Err(CheckerError::InvalidProxy { .. })));
    }

    #[test]
    fn test_ring_distributes_evenly_across_threads() {
        let ring = std::sync::Arc::new(
            ProxyRing::new(vec![
                test_proxy("127.0.0.1:4001"),
                test_proxy("127.0.0.1:4002"),
                test_proxy("127.0.0.1:4003"),
                test_proxy("127.0.0.1:4004"),
            ])
            .expect("test: build ring"),
        );

        let mut joins = Vec::new();
        for _ in 0..4 {
            let ring = std::sync::Arc::clone(&ring);
            joins.push(std::thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..100 {
                    seen.push(ring.next().endpoint().to_string());
                }
                seen
            }));
        }

        let mut counts = std::collections::HashMap::new();
        for join in joins {
            for endpoint in join.join().expect("test: thread join") {
                *counts.entry(endpoint).or_insert(0usize) += 1;
            }
        }

        // 400 tickets over 4 proxies: exactly 100 each.
        assert_eq!(counts.len(), 4);
        for (_, count) in counts {
            assert_eq!(count, 100);
        }
    }
}
