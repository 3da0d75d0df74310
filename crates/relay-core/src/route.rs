//! Static domain routes

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::{BackendSelection, RouteConfig};
use crate::error::{RelayError, Result};
use crate::rewrite::DomainRewrite;

/// A domain mapped to one or more backends
#[derive(Debug)]
pub struct Route {
    domain: String,
    rewrite_to: Option<String>,
    backends: Vec<SocketAddr>,
    selection: BackendSelection,
    cursor: AtomicUsize,
}

impl Route {
    pub fn new(domain: impl Into<String>, backends: Vec<SocketAddr>) -> Self {
        Route {
            domain: domain.into(),
            rewrite_to: None,
            backends,
            selection: BackendSelection::Static,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn with_rewrite_to(mut self, domain: impl Into<String>) -> Self {
        self.rewrite_to = Some(domain.into()).filter(|d: &String| !d.is_empty());
        self
    }

    pub fn with_selection(mut self, selection: BackendSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Builds a route, resolving its backend addresses
    pub fn from_config(config: &RouteConfig) -> Result<Self> {
        let backends = config.backend_addrs()?;
        if backends.is_empty() {
            return Err(RelayError::Config(format!("route {} has no backend", config.domain)));
        }
        let mut route = Route::new(config.domain.clone(), backends).with_selection(config.selection);
        if let Some(target) = config.rewrite_target() {
            route = route.with_rewrite_to(target);
        }
        Ok(route)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn rewrite_to(&self) -> Option<&str> {
        self.rewrite_to.as_deref()
    }

    pub fn backends(&self) -> &[SocketAddr] {
        &self.backends
    }

    pub fn selection(&self) -> BackendSelection {
        self.selection
    }

    /// Picks the backend at `cursor mod len`.
    ///
    /// With round-robin selection the cursor advances on every call.
    pub fn select_backend(&self) -> Option<SocketAddr> {
        if self.backends.is_empty() {
            return None;
        }
        let cursor = match self.selection {
            BackendSelection::Static => self.cursor.load(Ordering::Relaxed),
            BackendSelection::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed),
        };
        Some(self.backends[cursor % self.backends.len()])
    }

    /// Domain substitution configured for this route
    pub fn domain_rewrite(&self) -> Option<DomainRewrite> {
        self.rewrite_to
            .as_ref()
            .map(|target| DomainRewrite::new(self.domain.clone(), target.clone()))
    }

    /// Whether the route serves `domain`
    pub fn matches(&self, domain: &str) -> bool {
        self.domain.eq_ignore_ascii_case(domain)
    }
}

/// Ordered list of routes, loaded once at startup
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        RouteTable {
            routes: routes.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_config(configs: &[RouteConfig]) -> Result<Self> {
        let routes = configs.iter().map(Route::from_config).collect::<Result<Vec<_>>>()?;
        Ok(RouteTable::new(routes))
    }

    /// First route serving `domain`
    pub fn find(&self, domain: &str) -> Option<Arc<Route>> {
        self.routes.iter().find(|route| route.matches(domain)).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_static_selection_never_advances() {
        let route = Route::new("a.com", vec![addr("10.0.0.9:5060"), addr("10.0.0.10:5060")]);
        for _ in 0..3 {
            assert_eq!(route.select_backend(), Some(addr("10.0.0.9:5060")));
        }
    }

    #[test]
    fn test_round_robin_selection() {
        let route = Route::new("a.com", vec![addr("10.0.0.9:5060"), addr("10.0.0.10:5060")])
            .with_selection(BackendSelection::RoundRobin);
        let picks: Vec<_> = (0..4).filter_map(|_| route.select_backend()).collect();
        assert_eq!(
            picks,
            vec![
                addr("10.0.0.9:5060"),
                addr("10.0.0.10:5060"),
                addr("10.0.0.9:5060"),
                addr("10.0.0.10:5060"),
            ]
        );
    }

    #[test]
    fn test_empty_backend() {
        assert_eq!(Route::new("a.com", Vec::new()).select_backend(), None);
    }

    #[test]
    fn test_table_lookup() {
        let table = RouteTable::from_config(&[
            RouteConfig::new("a.com").with_backend("10.0.0.9:5060").with_rewrite_to("b.com"),
            RouteConfig::new("c.com").with_backend("10.0.0.11:5060"),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);

        let route = table.find("A.com").unwrap();
        assert_eq!(route.domain(), "a.com");
        assert_eq!(route.domain_rewrite(), Some(DomainRewrite::new("a.com", "b.com")));

        assert!(table.find("c.com").unwrap().domain_rewrite().is_none());
        assert!(table.find("d.com").is_none());
    }
}
