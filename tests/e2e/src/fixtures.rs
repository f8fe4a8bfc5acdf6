//! Scenario fixtures
//!
//! A simulated static site: scripted network routes, in-memory cache
//! storage, an open-page registry and a recording notification sink,
//! plus helpers that dispatch lifecycle events the way the platform does.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::RwLock;

use offline_worker::cache::MemoryCacheStorage;
use offline_worker::clients::ClientRegistry;
use offline_worker::events::EventType;
use offline_worker::notify::NotifyError;
use offline_worker::{
    AssetManifest, CacheStorage, Clients, ExtendableEvent, FetchEvent, Generation, NetError,
    Network, Notification, NotificationStyle, Notifications, OfflineWorker, Request, Response,
    Result, WorkerConfig,
};

/// Serves scripted responses by URL; unrouted URLs fail as offline.
pub struct ScriptedNetwork {
    routes: RwLock<BTreeMap<String, Response>>,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    /// Create a network with no routes
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(BTreeMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Route a URL to a response
    pub fn serve(&self, url: &str, response: Response) {
        self.routes.write().insert(url.to_string(), response);
    }

    /// Drop every route, simulating a lost connection
    pub fn go_offline(&self) {
        self.routes.write().clear();
    }

    /// Number of fetches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Network for ScriptedNetwork {
    fn fetch(&self, request: &Request) -> core::result::Result<Response, NetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.routes
            .read()
            .get(&request.url)
            .cloned()
            .ok_or(NetError::NetworkDown)
    }
}

/// Records shown and closed notifications.
pub struct RecordingNotifications {
    shown: RwLock<Vec<Notification>>,
    closed: RwLock<Vec<String>>,
}

impl RecordingNotifications {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self {
            shown: RwLock::new(Vec::new()),
            closed: RwLock::new(Vec::new()),
        }
    }

    /// Notifications shown so far
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.read().clone()
    }

    /// Tags closed so far
    pub fn closed(&self) -> Vec<String> {
        self.closed.read().clone()
    }
}

impl Default for RecordingNotifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifications for RecordingNotifications {
    fn show(&self, notification: Notification) -> core::result::Result<(), NotifyError> {
        self.shown.write().push(notification);
        Ok(())
    }

    fn close(&self, tag: &str) -> core::result::Result<(), NotifyError> {
        self.closed.write().push(tag.to_string());
        Ok(())
    }
}

/// A simulated static site and the platform around it
pub struct Site {
    pub caches: Arc<MemoryCacheStorage>,
    pub net: Arc<ScriptedNetwork>,
    pub clients: Arc<ClientRegistry>,
    pub notifications: Arc<RecordingNotifications>,
}

impl Site {
    /// Create a site with empty storage and no routes
    pub fn new() -> Self {
        Self {
            caches: Arc::new(MemoryCacheStorage::new()),
            net: Arc::new(ScriptedNetwork::new()),
            clients: Arc::new(ClientRegistry::new()),
            notifications: Arc::new(RecordingNotifications::new()),
        }
    }

    /// Serve every path with a 200 same-origin page body
    pub fn serve_pages(&self, paths: &[&str]) {
        for path in paths {
            let body = format!("{} page body", path).into_bytes();
            self.net.serve(path, Response::basic(200).with_body(body));
        }
    }

    /// Build a worker version against this site's facilities
    pub fn worker(&self, generation: &str, manifest: &[&str]) -> OfflineWorker {
        let config = WorkerConfig::new(
            Generation::new(generation),
            AssetManifest::new(manifest.iter().copied()),
        )
        .with_notification(NotificationStyle::titled("Site updates"));
        OfflineWorker::new(
            config,
            Arc::clone(&self.caches) as Arc<dyn CacheStorage>,
            Arc::clone(&self.net) as Arc<dyn Network>,
            Arc::clone(&self.clients) as Arc<dyn Clients>,
            Arc::clone(&self.notifications) as Arc<dyn Notifications>,
        )
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch an install event and settle its work
pub fn run_install(worker: &OfflineWorker) -> Result<()> {
    let mut event = ExtendableEvent::new(EventType::Install);
    worker.handle_install(&mut event)?;
    event.settle()
}

/// Dispatch an activate event and settle its work
pub fn run_activate(worker: &OfflineWorker) -> Result<()> {
    let mut event = ExtendableEvent::new(EventType::Activate);
    worker.handle_activate(&mut event)?;
    event.settle()
}

/// Dispatch a fetch event; returns the response (if any) and the outcome
/// of the event's deferred work
pub fn run_fetch(worker: &OfflineWorker, request: Request) -> (Option<Response>, Result<()>) {
    let mut event = FetchEvent::new(request);
    worker.handle_fetch(&mut event);
    let response = event.take_response();
    let settled = event.settle();
    (response, settled)
}
