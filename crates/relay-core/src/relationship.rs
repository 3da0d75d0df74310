//! User location bindings learned from REGISTER traffic

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sipbridge_sip_core::Address;
use tracing::info;

use crate::connection::Connection;
use crate::error::{RelayError, Result};
use crate::rewrite::DomainRewrite;

/// Where a registered user is currently reachable
#[derive(Debug, Clone)]
pub struct Relationship {
    pub user: String,
    /// Domain the user is known under, after any route rewrite
    pub domain: String,
    /// Domain the user registered with
    pub original_domain: String,
    /// Connection the last registration arrived on
    pub connection: Connection,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(
        user: impl Into<String>,
        domain: impl Into<String>,
        original_domain: impl Into<String>,
        connection: Connection,
    ) -> Self {
        Relationship {
            user: user.into(),
            domain: domain.into(),
            original_domain: original_domain.into(),
            connection,
            updated_at: Utc::now(),
        }
    }

    /// Registry key, `user@domain` with the domain lowercased
    pub fn key(&self) -> String {
        binding_key(&self.user, &self.domain)
    }

    /// Domain substitution implied by a rewritten registration
    pub fn domain_rewrite(&self) -> Option<DomainRewrite> {
        if !self.original_domain.eq_ignore_ascii_case(&self.domain) {
            Some(DomainRewrite::new(self.original_domain.clone(), self.domain.clone()))
        } else {
            None
        }
    }
}

// Domains compare case-insensitively, users do not
fn binding_key(user: &str, domain: &str) -> String {
    format!("{}@{}", user, domain.to_ascii_lowercase())
}

/// Shared map of `user@domain` to [`Relationship`]
///
/// Bindings are never expired; every registration replaces the previous one.
#[derive(Debug, Default)]
pub struct RelationshipRegistry {
    relationships: RwLock<HashMap<String, Arc<Relationship>>>,
}

impl RelationshipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `relationship`, replacing any binding for the same user
    pub fn bind(&self, relationship: Relationship) -> Arc<Relationship> {
        let key = relationship.key();
        let relationship = Arc::new(relationship);
        info!(user = %key, peer = %relationship.connection.addr(), "Bound user relationship");
        self.relationships.write().insert(key, relationship.clone());
        relationship
    }

    pub fn get(&self, key: &str) -> Option<Arc<Relationship>> {
        let key = match key.rsplit_once('@') {
            Some((user, domain)) => binding_key(user, domain),
            None => key.to_string(),
        };
        self.relationships.read().get(&key).cloned()
    }

    /// Finds the binding for the user a request is addressed to.
    ///
    /// `user@host` of the To address is tried first, then the To user at the
    /// Contact host.
    pub fn lookup(&self, to: &Address, contact: Option<&Address>) -> Result<Arc<Relationship>> {
        let user = to.uri.user.as_deref().unwrap_or_default();
        let relationships = self.relationships.read();

        let mut key = binding_key(user, &to.uri.host);
        if let Some(found) = relationships.get(&key) {
            return Ok(found.clone());
        }

        if let Some(contact) = contact {
            key = binding_key(user, &contact.uri.host);
            if let Some(found) = relationships.get(&key) {
                return Ok(found.clone());
            }
        }

        Err(RelayError::RelationshipNotFound(key))
    }

    pub fn len(&self) -> usize {
        self.relationships.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    fn connection(addr: &str) -> Connection {
        Connection::new(addr.parse().unwrap(), RecordingTransport::shared("127.0.0.1:5060"))
    }

    #[test]
    fn test_bind_overwrites() {
        let registry = RelationshipRegistry::new();
        registry.bind(Relationship::new("bob", "a.com", "a.com", connection("10.0.0.5:5060")));
        registry.bind(Relationship::new("bob", "a.com", "a.com", connection("10.0.0.6:5060")));

        assert_eq!(registry.len(), 1);
        let found = registry.get("bob@a.com").unwrap();
        assert_eq!(found.connection.addr(), "10.0.0.6:5060".parse().unwrap());
    }

    #[test]
    fn test_lookup_by_to_then_contact() {
        let registry = RelationshipRegistry::new();
        registry.bind(Relationship::new("bob", "10.0.0.5", "10.0.0.5", connection("10.0.0.5:5060")));

        let to: Address = "<sip:bob@a.com>".parse().unwrap();
        assert!(matches!(
            registry.lookup(&to, None),
            Err(RelayError::RelationshipNotFound(key)) if key == "bob@a.com"
        ));

        let contact: Address = "<sip:alice@10.0.0.5:5062>".parse().unwrap();
        let found = registry.lookup(&to, Some(&contact)).unwrap();
        assert_eq!(found.key(), "bob@10.0.0.5");
    }

    #[test]
    fn test_domain_is_case_insensitive() {
        let registry = RelationshipRegistry::new();
        registry.bind(Relationship::new("bob", "A.com", "A.com", connection("10.0.0.5:5060")));

        let to: Address = "<sip:bob@a.com>".parse().unwrap();
        let found = registry.lookup(&to, None).unwrap();
        assert_eq!(found.key(), "bob@a.com");
        assert_eq!(found.domain, "A.com");
        assert!(registry.get("bob@A.COM").is_some());

        let contact: Address = "<sip:x@A.COM>".parse().unwrap();
        let other: Address = "<sip:bob@c.com>".parse().unwrap();
        assert!(registry.lookup(&other, Some(&contact)).is_ok());

        let wrong_user: Address = "<sip:BOB@a.com>".parse().unwrap();
        assert!(registry.lookup(&wrong_user, None).is_err());

        registry.bind(Relationship::new("bob", "a.com", "a.com", connection("10.0.0.6:5060")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_domain_rewrite() {
        let plain = Relationship::new("bob", "a.com", "a.com", connection("10.0.0.5:5060"));
        assert!(plain.domain_rewrite().is_none());

        let mixed_case = Relationship::new("bob", "a.com", "A.com", connection("10.0.0.5:5060"));
        assert!(mixed_case.domain_rewrite().is_none());

        let rewritten = Relationship::new("bob", "b.com", "a.com", connection("10.0.0.5:5060"));
        assert_eq!(rewritten.domain_rewrite(), Some(DomainRewrite::new("a.com", "b.com")));
    }
}
