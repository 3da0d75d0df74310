use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by SIP transports
#[derive(Error, Debug)]
pub enum Error {
    /// The socket could not be bound
    #[error("Failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, #[source] io::Error),

    /// A datagram could not be sent
    #[error("Failed to send to {0}: {1}")]
    SendFailed(SocketAddr, #[source] io::Error),

    /// Reading from the socket failed
    #[error("Failed to receive: {0}")]
    ReceiveFailed(#[source] io::Error),

    /// The serialized message does not fit in one datagram
    #[error("Packet too large: {0} bytes (max {1})")]
    PacketTooLarge(usize, usize),

    /// The transport was closed
    #[error("Transport closed")]
    TransportClosed,

    /// Other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
