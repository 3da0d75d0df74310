//! Relay configuration
//!
//! The configuration is decoded once at startup and never reloaded. Field
//! names follow the YAML file layout:
//!
//! ```yaml
//! listen: 0.0.0.0:5060
//! routes:
//!   - domain: a.com
//!     rewriteTo: b.com
//!     backend:
//!       - 10.0.0.9:5060
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:5060";
/// Default work queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Default time an enqueue may wait for space
pub const DEFAULT_ENQUEUE_TIMEOUT_MS: u64 = 100;
/// Default datagram receive buffer size
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 32 * 1024;

/// How a route picks one of its backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendSelection {
    /// Always the backend under the cursor; the cursor never moves
    #[default]
    Static,
    /// Advance the cursor for every new call
    RoundRobin,
}

/// A static domain route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Domain matched against the caller's From host
    pub domain: String,

    /// Domain substituted for `domain` in forwarded From/To headers
    #[serde(default, alias = "rewriteTo", skip_serializing_if = "Option::is_none")]
    pub rewrite_to: Option<String>,

    /// Backend `host:port` addresses
    #[serde(default)]
    pub backend: Vec<String>,

    #[serde(default)]
    pub selection: BackendSelection,
}

impl RouteConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        RouteConfig {
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, addr: impl Into<String>) -> Self {
        self.backend.push(addr.into());
        self
    }

    pub fn with_rewrite_to(mut self, domain: impl Into<String>) -> Self {
        self.rewrite_to = Some(domain.into());
        self
    }

    pub fn with_selection(mut self, selection: BackendSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Resolves every backend address
    pub fn backend_addrs(&self) -> Result<Vec<SocketAddr>> {
        self.backend.iter().map(|addr| resolve_addr(addr)).collect()
    }

    /// The rewrite target, ignoring an empty string
    pub fn rewrite_target(&self) -> Option<&str> {
        self.rewrite_to.as_deref().filter(|d| !d.is_empty())
    }
}

/// Top-level relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// UDP address to listen on
    pub listen: String,

    /// Address written into Via and Contact; the bound address when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertised_addr: Option<String>,

    /// Static domain routes, matched in order
    pub routes: Vec<RouteConfig>,

    /// Capacity of the work queue between ingress and forwarding
    pub queue_capacity: usize,

    /// How long ingress waits for queue space before dropping a message
    pub enqueue_timeout_ms: u64,

    /// Maximum number of tracked calls; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,

    /// Size of the datagram receive buffer
    pub receive_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            listen: DEFAULT_LISTEN.to_string(),
            advertised_addr: None,
            routes: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout_ms: DEFAULT_ENQUEUE_TIMEOUT_MS,
            max_processes: None,
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
        }
    }
}

impl RelayConfig {
    pub fn new(listen: impl Into<String>) -> Self {
        RelayConfig {
            listen: listen.into(),
            ..Default::default()
        }
    }

    pub fn with_route(mut self, route: RouteConfig) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_advertised_addr(mut self, addr: impl Into<String>) -> Self {
        self.advertised_addr = Some(addr.into());
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_processes(mut self, max: usize) -> Self {
        self.max_processes = Some(max);
        self
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    /// Resolves the listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        resolve_addr(&self.listen)
    }

    /// Resolves the advertised address, if one is configured
    pub fn advertised_addr(&self) -> Result<Option<SocketAddr>> {
        self.advertised_addr.as_deref().map(resolve_addr).transpose()
    }

    /// Checks the configuration before the relay starts.
    ///
    /// Every route needs a domain and at least one resolvable backend.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if let Some(addr) = self.advertised_addr()? {
            if addr.ip().is_unspecified() || addr.port() == 0 {
                return Err(RelayError::Config(format!("advertised_addr {} is not reachable", addr)));
            }
        }

        if self.queue_capacity == 0 {
            return Err(RelayError::Config("queue_capacity must be greater than 0".to_string()));
        }
        if self.receive_buffer_size == 0 {
            return Err(RelayError::Config("receive_buffer_size must be greater than 0".to_string()));
        }
        if self.max_processes == Some(0) {
            return Err(RelayError::Config("max_processes must be greater than 0".to_string()));
        }

        for route in &self.routes {
            if route.domain.trim().is_empty() {
                return Err(RelayError::Config("route domain must not be empty".to_string()));
            }
            if route.backend.is_empty() {
                return Err(RelayError::Config(format!("route {} has no backend", route.domain)));
            }
            route.backend_addrs()?;
        }

        Ok(())
    }
}

/// Resolves a `host:port` string to its first socket address
pub fn resolve_addr(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| RelayError::Config(format!("Invalid address {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| RelayError::Config(format!("Address {} did not resolve", addr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: RelayConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.listen, "0.0.0.0:5060");
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.enqueue_timeout(), Duration::from_millis(100));
        assert_eq!(config.receive_buffer_size, 32 * 1024);
        assert!(config.max_processes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_routes() {
        let yaml = r#"
listen: 127.0.0.1:5070
routes:
  - domain: a.com
    rewriteTo: b.com
    backend:
      - 10.0.0.9:5060
      - 10.0.0.10:5060
    selection: round_robin
  - domain: c.com
    rewrite_to: d.com
    backend:
      - 10.0.0.11:5060
"#;
        let config: RelayConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listen_addr().unwrap(), "127.0.0.1:5070".parse().unwrap());
        assert_eq!(config.routes.len(), 2);

        let first = &config.routes[0];
        assert_eq!(first.rewrite_target(), Some("b.com"));
        assert_eq!(first.selection, BackendSelection::RoundRobin);
        assert_eq!(first.backend_addrs().unwrap().len(), 2);

        let second = &config.routes[1];
        assert_eq!(second.rewrite_target(), Some("d.com"));
        assert_eq!(second.selection, BackendSelection::Static);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_advertised_addr() {
        let config: RelayConfig = serde_yaml::from_str("advertised_addr: 203.0.113.7:5060\n").unwrap();
        assert_eq!(config.listen, "0.0.0.0:5060");
        assert_eq!(config.advertised_addr().unwrap(), Some("203.0.113.7:5060".parse().unwrap()));
        assert!(config.validate().is_ok());

        assert_eq!(RelayConfig::default().advertised_addr().unwrap(), None);
        assert!(RelayConfig::default().with_advertised_addr("0.0.0.0:5060").validate().is_err());
        assert!(RelayConfig::default().with_advertised_addr("203.0.113.7:0").validate().is_err());
        assert!(RelayConfig::default().with_advertised_addr("not an address").validate().is_err());
    }

    #[test]
    fn test_empty_rewrite_is_ignored() {
        let route = RouteConfig::new("a.com").with_rewrite_to("");
        assert_eq!(route.rewrite_target(), None);
    }

    #[test]
    fn test_validate_rejects_bad_routes() {
        let no_backend = RelayConfig::default().with_route(RouteConfig::new("a.com"));
        assert!(matches!(no_backend.validate(), Err(RelayError::Config(_))));

        let bad_backend = RelayConfig::default().with_route(RouteConfig::new("a.com").with_backend("not an address"));
        assert!(matches!(bad_backend.validate(), Err(RelayError::Config(_))));

        let no_domain = RelayConfig::default().with_route(RouteConfig::new(" ").with_backend("10.0.0.9:5060"));
        assert!(matches!(no_domain.validate(), Err(RelayError::Config(_))));

        let bad_listen = RelayConfig::new("nowhere");
        assert!(matches!(bad_listen.validate(), Err(RelayError::Config(_))));

        let zero_queue = RelayConfig::default().with_queue_capacity(0);
        assert!(zero_queue.validate().is_err());
    }
}
