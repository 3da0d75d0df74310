//! # sipbridge relay core
//!
//! Call tracking and header rewriting for a SIP signaling relay.
//!
//! The relay listens on one UDP socket. Every inbound message is tied to a
//! call (a [`Process`]) through a static domain [`Route`] or a
//! [`Relationship`] learned from REGISTER traffic. A rewritten copy, with
//! Via, Contact, From and To pointing through the relay, is forwarded to the
//! other party of the call.
//!
//! ## Architecture
//!
//! - `config`: relay and route configuration
//! - `route`: static domain routes and backend selection
//! - `relationship`: user bindings learned from registrations
//! - `process`: per-call state
//! - `rewrite`: header rewriting for forwarded copies
//! - `engine`: resolution and forwarding
//! - `queue`: bounded hand-off between ingress and forwarding
//! - `dispatcher`: the ingress loop and the forwarding loop
//!
//! ## Example
//!
//! ```rust,no_run
//! use sipbridge_relay_core::prelude::*;
//!
//! # async fn run() -> sipbridge_relay_core::Result<()> {
//! let config = RelayConfig::new("0.0.0.0:5060")
//!     .with_route(RouteConfig::new("a.com").with_backend("10.0.0.9:5060"));
//! let relay = Dispatcher::bind(config).await?;
//! let shutdown = relay.cancellation_token();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     shutdown.cancel();
//! });
//! relay.run().await
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod process;
pub mod queue;
pub mod relationship;
pub mod rewrite;
pub mod route;
pub mod stats;

#[cfg(test)]
mod testing;

pub use config::{BackendSelection, RelayConfig, RouteConfig};
pub use connection::Connection;
pub use dispatcher::Dispatcher;
pub use engine::RelayEngine;
pub use error::{RelayError, Result};
pub use process::{Process, ProcessRegistry, Resolution};
pub use queue::{work_queue, WorkItem, WorkQueue};
pub use relationship::{Relationship, RelationshipRegistry};
pub use rewrite::{rewrite_request, rewrite_response, DomainRewrite, RewriteContext};
pub use route::{Route, RouteTable};
pub use stats::{RelayStats, RelayStatsSnapshot};

/// Re-export of common types
pub mod prelude {
    pub use crate::{
        BackendSelection, Dispatcher, RelayConfig, RelayEngine, RelayError, RelayStatsSnapshot, RouteConfig,
    };
}
