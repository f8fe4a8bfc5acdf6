//! Network fetch facility
//!
//! The worker never speaks to the network directly; the platform's fetch
//! facility comes in behind the [`Network`] trait. A hung fetch hangs the
//! interception that issued it; there is no timeout policy here.

use crate::fetch::{Request, Response};

/// Network error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    ConnectionRefused,
    ConnectionReset,
    NetworkDown,
    NetworkUnreachable,
    HostUnreachable,
    TimedOut,
    DnsLookupFailed,
    Other,
}

/// Request in, response (or failure) out
pub trait Network: Send + Sync {
    /// Perform a network fetch
    fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}
