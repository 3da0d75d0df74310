//! SIP transport layer for sipbridge
//!
//! This crate provides the [`Transport`] abstraction the relay sends through
//! and the UDP transport it listens on.

pub mod error;
pub mod transport;

pub use error::{Error, Result};
pub use transport::Transport;
pub use transport::udp::UdpTransport;

/// Bind a UDP transport to the specified address
pub async fn bind_udp(addr: std::net::SocketAddr) -> Result<UdpTransport> {
    UdpTransport::bind(addr).await
}

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{bind_udp, Error, Result, Transport, UdpTransport};
}
