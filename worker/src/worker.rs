//! The offline cache worker
//!
//! One worker instance represents one deployed version of the site. Its
//! configuration (generation identifier, asset manifest, fallback
//! document, notification presentation) is fixed at construction; every
//! event handler is a function of the event and the injected platform
//! facilities, so the whole lifecycle can be driven with in-memory
//! implementations.
//!
//! Side effects follow the event model in [`crate::events`]: anything
//! that must survive the handler returning is registered on the event.
//! The opportunistic cache write after a network fetch is detached, so
//! its failure never reaches the caller that already holds the response.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::RwLock;

use crate::cache::CacheStorage;
use crate::clients::Clients;
use crate::error::{Result, WorkerError};
use crate::events::{ControlMessage, ExtendableEvent, MessageEvent, NotificationClickEvent, PushEvent};
use crate::fetch::{FetchEvent, Request, Response, ResponseType};
use crate::lifecycle::{Lifecycle, WorkerState};
use crate::net::Network;
use crate::notify::{Notification, NotificationData, Notifications};
use crate::{AssetManifest, Generation, WorkerConfig};

/// The offline cache worker
pub struct OfflineWorker {
    /// Immutable configuration
    config: WorkerConfig,
    /// Lifecycle state, shared with in-flight event tasks
    lifecycle: Arc<RwLock<Lifecycle>>,
    /// Cache storage facility
    caches: Arc<dyn CacheStorage>,
    /// Network fetch facility
    net: Arc<dyn Network>,
    /// Open pages
    clients: Arc<dyn Clients>,
    /// Notification display facility
    notifications: Arc<dyn Notifications>,
}

impl OfflineWorker {
    /// Create a worker for one site version
    pub fn new(
        config: WorkerConfig,
        caches: Arc<dyn CacheStorage>,
        net: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
        notifications: Arc<dyn Notifications>,
    ) -> Self {
        log::debug!("[worker] parsed, generation {}", config.generation);
        Self {
            config,
            lifecycle: Arc::new(RwLock::new(Lifecycle::new())),
            caches,
            net,
            clients,
            notifications,
        }
    }

    /// Current cache generation
    pub fn generation(&self) -> &Generation {
        &self.config.generation
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.lifecycle.read().state()
    }

    /// Check if skip-waiting was requested
    pub fn skip_waiting_requested(&self) -> bool {
        self.lifecycle.read().skip_waiting_requested()
    }

    /// Whether activation may be dispatched now
    pub fn ready_to_activate(&self) -> bool {
        self.lifecycle.read().ready_to_activate(self.clients.count())
    }

    /// Install: populate the generation's store from the manifest
    ///
    /// The population is all-or-nothing: every manifest path is fetched
    /// before anything is written, so a single failure leaves the store
    /// without manifest entries and fails the event. On success the
    /// worker signals skip-waiting so the new version can take over
    /// without waiting for open pages to close.
    pub fn handle_install(&self, event: &mut ExtendableEvent) -> Result<()> {
        self.lifecycle.write().transition(WorkerState::Installing)?;

        let caches = Arc::clone(&self.caches);
        let net = Arc::clone(&self.net);
        let lifecycle = Arc::clone(&self.lifecycle);
        let generation = self.config.generation.clone();
        let manifest = self.config.manifest.clone();

        event.wait_until(Box::new(move || {
            log::info!("[worker] installing generation {}", generation);
            match populate(caches.as_ref(), net.as_ref(), &generation, &manifest) {
                Ok(stored) => {
                    let mut state = lifecycle.write();
                    state.transition(WorkerState::Installed)?;
                    state.request_skip_waiting();
                    drop(state);
                    log::info!(
                        "[worker] generation {} installed, {} assets cached",
                        generation,
                        stored
                    );
                    Ok(())
                }
                Err(e) => {
                    log::warn!("[worker] install of {} failed: {}", generation, e);
                    let _ = lifecycle.write().transition(WorkerState::Redundant);
                    Err(e)
                }
            }
        }));
        Ok(())
    }

    /// Activate: drop stale generations, then take over the open pages
    ///
    /// Every store not named by the current generation is deleted before
    /// any page is claimed.
    pub fn handle_activate(&self, event: &mut ExtendableEvent) -> Result<()> {
        self.lifecycle.write().transition(WorkerState::Activating)?;

        let caches = Arc::clone(&self.caches);
        let clients = Arc::clone(&self.clients);
        let lifecycle = Arc::clone(&self.lifecycle);
        let generation = self.config.generation.clone();

        event.wait_until(Box::new(move || {
            let mut dropped = 0usize;
            for name in caches.keys() {
                if name != generation.as_str() {
                    log::info!("[worker] deleting stale cache store {}", name);
                    caches.delete(&name)?;
                    dropped += 1;
                }
            }
            lifecycle.write().transition(WorkerState::Activated)?;
            let claimed = clients.claim();
            log::info!(
                "[worker] generation {} active: {} stale stores deleted, {} pages claimed",
                generation,
                dropped,
                claimed
            );
            Ok(())
        }));
        Ok(())
    }

    /// Fetch interception: cache first, network otherwise
    ///
    /// A cached response answers the event without touching the network.
    /// On a miss, a storable network response (200, same-origin, not
    /// redirected) is answered immediately and a duplicate is written to
    /// the store by a detached task; anything else is answered unmodified
    /// and not stored. When the network itself fails, a navigation
    /// request falls back to the cached offline document; any other
    /// request is left unanswered and the failure surfaces to the caller.
    pub fn handle_fetch(&self, event: &mut FetchEvent) {
        if !self.lifecycle.read().is_active() {
            return;
        }

        let request = event.request().clone();
        let store = self.config.generation.as_str();

        if let Some(cached) = self.caches.match_request(store, &request) {
            log::debug!(
                "[worker] fetch #{} {} {} served from cache",
                event.id().raw(),
                request.method.as_str(),
                request.url
            );
            event.respond_with(cached);
            return;
        }

        match self.net.fetch(&request) {
            Ok(response) if is_storable(&response) => {
                let copy = response.clone_response();
                let caches = Arc::clone(&self.caches);
                let generation = self.config.generation.clone();
                let stored_request = request;
                event.spawn_detached(Box::new(move || {
                    caches.put(generation.as_str(), &stored_request, copy)?;
                    log::debug!(
                        "[worker] stored {} in generation {}",
                        stored_request.url,
                        generation
                    );
                    Ok(())
                }));
                event.respond_with(response);
            }
            Ok(response) => {
                // Non-200, opaque or redirected: pass through uncached.
                event.respond_with(response);
            }
            Err(e) => {
                if request.destination.is_navigation() {
                    let fallback = Request::new(self.config.offline_fallback.as_str());
                    if let Some(cached) = self.caches.match_request(store, &fallback) {
                        log::debug!(
                            "[worker] fetch #{} {} offline, serving {}",
                            event.id().raw(),
                            request.url,
                            self.config.offline_fallback
                        );
                        event.respond_with(cached);
                        return;
                    }
                }
                log::debug!(
                    "[worker] fetch #{} {} failed offline: {:?}",
                    event.id().raw(),
                    request.url,
                    e
                );
            }
        }
    }

    /// Message: a page may request an immediate version switch
    pub fn handle_message(&self, event: &mut MessageEvent) {
        match ControlMessage::decode(event.data()) {
            Some(ControlMessage::SkipWaiting) => {
                log::debug!("[worker] skip-waiting requested by {}", event.origin());
                self.lifecycle.write().request_skip_waiting();
            }
            None => {
                log::debug!("[worker] ignoring unrecognized message from {}", event.origin());
            }
        }
    }

    /// Push: display the payload text as a notification
    pub fn handle_push(&self, event: &mut PushEvent) {
        let text = match event.text() {
            Some(text) => text,
            None => {
                if event.data().is_some() {
                    log::warn!("[worker] dropping push with non-text payload");
                }
                return;
            }
        };

        let data = NotificationData {
            date_of_arrival: event.arrived_at(),
            primary_key: 1,
        };
        let notification = Notification::new(&self.config.notification, text, data);
        let sink = Arc::clone(&self.notifications);
        event.wait_until(Box::new(move || {
            sink.show(notification)?;
            Ok(())
        }));
    }

    /// Notification click: dismiss it and open the site root
    pub fn handle_notification_click(&self, event: &mut NotificationClickEvent) {
        log::debug!("[worker] notification {} clicked", event.tag());
        let tag = event.tag().to_string();
        let sink = Arc::clone(&self.notifications);
        let clients = Arc::clone(&self.clients);
        event.wait_until(Box::new(move || {
            sink.close(&tag)?;
            clients.open_window("/")?;
            Ok(())
        }));
    }
}

/// Whether an intercepted network response belongs in the cache
fn is_storable(response: &Response) -> bool {
    response.status == 200
        && response.response_type == ResponseType::Basic
        && !response.redirected
        && !response.body_used
}

/// Fetch every manifest path, then commit the lot
///
/// Nothing is written until every asset arrived, so a failed fetch leaves
/// the store without any manifest entry.
fn populate(
    caches: &dyn CacheStorage,
    net: &dyn Network,
    generation: &Generation,
    manifest: &AssetManifest,
) -> Result<usize> {
    caches.open(generation.as_str())?;

    let mut fetched = Vec::with_capacity(manifest.len());
    for path in manifest.iter() {
        let request = Request::new(path);
        let response = net
            .fetch(&request)
            .map_err(|e| WorkerError::Install(format!("{}: {:?}", path, e)))?;
        if !response.ok() {
            return Err(WorkerError::Install(format!(
                "{} returned {}",
                path, response.status
            )));
        }
        fetched.push((request, response));
    }

    let count = fetched.len();
    for (request, response) in fetched {
        caches.put(generation.as_str(), &request, response)?;
    }
    Ok(count)
}
