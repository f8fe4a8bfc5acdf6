//! Offline Cache Worker
//!
//! This crate implements a browser-side offline caching worker for a small
//! static website. It pre-populates a versioned cache store from a fixed
//! asset manifest when a new version installs, discards stores left behind
//! by previous versions when the new version activates, and intercepts
//! every fetch from controlled pages with a cache-first policy that
//! opportunistically stores successful network responses. Push events are
//! surfaced as notifications.
//!
//! The platform facilities the worker relies on (cache storage, network
//! fetch, open pages, notification display) are injected behind traits, so
//! the whole lifecycle can be driven and observed on the host.
//!
//! # Modules
//!
//! - `fetch`: Request/Response types + fetch event interception surface
//! - `cache`: Cache stores and the cache storage facility
//! - `net`: Network fetch facility
//! - `lifecycle`: Worker state machine (install → activate → redundant)
//! - `events`: Extendable events and the task-registration primitive
//! - `clients`: Controlled pages registry
//! - `notify`: Notification construction and display facility
//! - `worker`: The worker itself, event handlers wiring it all together

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod cache;
pub mod clients;
pub mod error;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod net;
pub mod notify;
pub mod worker;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

pub use cache::{CacheError, CacheStorage, MemoryCacheStorage};
pub use clients::{ClientRegistry, Clients};
pub use error::{Result, WorkerError};
pub use events::{ControlMessage, ExtendableEvent, MessageEvent, NotificationClickEvent, PushEvent};
pub use fetch::{FetchEvent, Request, RequestDestination, Response, ResponseType};
pub use lifecycle::WorkerState;
pub use net::{NetError, Network};
pub use notify::{Notification, NotificationStyle, Notifications};
pub use worker::OfflineWorker;

/// A version-tagged name for one generation of the cache store.
///
/// Exactly one generation is current for a given worker; every store whose
/// name differs is stale and deleted wholesale at activation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(String);

impl Generation {
    /// Create a new generation identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the store name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed, ordered list of asset paths cached unconditionally at
/// install time.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    /// Create a manifest from an ordered list of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate the paths in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check for an empty manifest
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check whether a path is listed
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Immutable worker configuration
///
/// Constructed once at startup; the generation identifier and manifest are
/// deployment inputs, not computed here.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Current cache generation
    pub generation: Generation,
    /// Assets cached at install time
    pub manifest: AssetManifest,
    /// Document served when a navigation fails offline
    pub offline_fallback: String,
    /// Notification presentation
    pub notification: NotificationStyle,
}

impl WorkerConfig {
    /// Create a configuration with the default fallback document and
    /// notification presentation
    pub fn new(generation: Generation, manifest: AssetManifest) -> Self {
        Self {
            generation,
            manifest,
            offline_fallback: String::from("/index.html"),
            notification: NotificationStyle::default(),
        }
    }

    /// Override the offline fallback document
    pub fn with_offline_fallback(mut self, path: impl Into<String>) -> Self {
        self.offline_fallback = path.into();
        self
    }

    /// Override the notification presentation
    pub fn with_notification(mut self, style: NotificationStyle) -> Self {
        self.notification = style;
        self
    }
}
