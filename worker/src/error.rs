//! Worker error types

use alloc::string::String;
use core::fmt;

use crate::cache::CacheError;
use crate::lifecycle::LifecycleError;
use crate::net::NetError;
use crate::notify::NotifyError;

/// Worker error type
#[derive(Debug, Clone)]
pub enum WorkerError {
    /// Cache storage error
    Cache(CacheError),
    /// Network error
    Network(NetError),
    /// Notification error
    Notify(NotifyError),
    /// Lifecycle error
    Lifecycle(LifecycleError),
    /// Install-time manifest population failure
    Install(String),
    /// Generic error with message
    Other(String),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Cache(e) => write!(f, "Cache error: {:?}", e),
            WorkerError::Network(e) => write!(f, "Network error: {:?}", e),
            WorkerError::Notify(e) => write!(f, "Notification error: {:?}", e),
            WorkerError::Lifecycle(e) => write!(f, "Lifecycle error: {:?}", e),
            WorkerError::Install(msg) => write!(f, "Install failed: {}", msg),
            WorkerError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<CacheError> for WorkerError {
    fn from(e: CacheError) -> Self {
        WorkerError::Cache(e)
    }
}

impl From<NetError> for WorkerError {
    fn from(e: NetError) -> Self {
        WorkerError::Network(e)
    }
}

impl From<NotifyError> for WorkerError {
    fn from(e: NotifyError) -> Self {
        WorkerError::Notify(e)
    }
}

impl From<LifecycleError> for WorkerError {
    fn from(e: LifecycleError) -> Self {
        WorkerError::Lifecycle(e)
    }
}

/// Result type for worker operations
pub type Result<T> = core::result::Result<T, WorkerError>;
