//! Worker events
//!
//! Every event the worker answers is "extendable": a handler registers the
//! asynchronous work the event must outlive, and the platform keeps the
//! worker alive until that work settles. Work registered with
//! [`ExtendableEvent::wait_until`] must complete for the event to succeed;
//! work registered with [`ExtendableEvent::spawn_detached`] is
//! fire-and-forget and its failure is swallowed. A handler that starts a
//! side effect without registering it here may be torn down mid-flight.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Install event
    Install,
    /// Activate event
    Activate,
    /// Fetch event
    Fetch,
    /// Message event
    Message,
    /// Push event
    Push,
    /// Notification click event
    NotificationClick,
}

/// A unit of deferred work registered on an event
pub type Task = Box<dyn FnOnce() -> Result<()> + Send>;

/// Extendable event core
///
/// Collects the deferred work handlers register, then drives it in
/// [`ExtendableEvent::settle`]: must-complete tasks run first, in
/// registration order, and the first failure is reported; detached tasks
/// run afterwards and their failures are only logged.
pub struct ExtendableEvent {
    /// Event type
    event_type: EventType,
    /// Work the event must outlive
    must_complete: Vec<Task>,
    /// Fire-and-forget work
    detached: Vec<Task>,
}

impl ExtendableEvent {
    /// Create a new event core
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            must_complete: Vec::new(),
            detached: Vec::new(),
        }
    }

    /// Get event type
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Register work the event must outlive
    pub fn wait_until(&mut self, task: Task) {
        self.must_complete.push(task);
    }

    /// Register fire-and-forget work
    pub fn spawn_detached(&mut self, task: Task) {
        self.detached.push(task);
    }

    /// Count of registered, unsettled tasks
    pub fn pending(&self) -> usize {
        self.must_complete.len() + self.detached.len()
    }

    /// Drive all registered work to completion
    pub fn settle(self) -> Result<()> {
        let event_type = self.event_type;
        let mut first_failure = None;

        for task in self.must_complete {
            if let Err(e) = task() {
                log::warn!("[events] {:?} task failed: {}", event_type, e);
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }

        for task in self.detached {
            if let Err(e) = task() {
                log::warn!("[events] detached {:?} task failed, ignored: {}", event_type, e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl core::fmt::Debug for ExtendableEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtendableEvent")
            .field("event_type", &self.event_type)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Control message sent to the worker by a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMessage {
    /// Activate immediately instead of waiting for open pages to close
    SkipWaiting,
}

impl ControlMessage {
    /// Decode a message payload; anything unrecognized yields `None`
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        postcard::from_bytes(bytes).ok()
    }

    /// Encode for transmission
    pub fn encode(&self) -> Vec<u8> {
        postcard::to_allocvec(self).unwrap_or_default()
    }
}

/// Message event data
#[derive(Debug)]
pub struct MessageEvent {
    /// Pending work registration
    ext: ExtendableEvent,
    /// Message payload (serialized)
    data: Vec<u8>,
    /// Origin of the sender
    origin: String,
}

impl MessageEvent {
    /// Create new message event
    pub fn new(data: Vec<u8>, origin: impl Into<String>) -> Self {
        Self {
            ext: ExtendableEvent::new(EventType::Message),
            data,
            origin: origin.into(),
        }
    }

    /// Get payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get origin
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Register work the event must outlive
    pub fn wait_until(&mut self, task: Task) {
        self.ext.wait_until(task);
    }

    /// Drive registered work to completion
    pub fn settle(self) -> Result<()> {
        self.ext.settle()
    }
}

/// Push event data
#[derive(Debug)]
pub struct PushEvent {
    /// Pending work registration
    ext: ExtendableEvent,
    /// Push payload
    data: Option<Vec<u8>>,
    /// Arrival timestamp (ms since epoch), stamped by the platform
    arrived_at: u64,
}

impl PushEvent {
    /// Create new push event
    pub fn new(data: Option<Vec<u8>>, arrived_at: u64) -> Self {
        Self {
            ext: ExtendableEvent::new(EventType::Push),
            data,
            arrived_at,
        }
    }

    /// Get payload
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Get payload as text
    pub fn text(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| core::str::from_utf8(d).ok().map(|s| s.to_string()))
    }

    /// Arrival timestamp (ms since epoch)
    pub fn arrived_at(&self) -> u64 {
        self.arrived_at
    }

    /// Register work the event must outlive
    pub fn wait_until(&mut self, task: Task) {
        self.ext.wait_until(task);
    }

    /// Count of registered, unsettled tasks
    pub fn pending(&self) -> usize {
        self.ext.pending()
    }

    /// Drive registered work to completion
    pub fn settle(self) -> Result<()> {
        self.ext.settle()
    }
}

/// Notification click event
#[derive(Debug)]
pub struct NotificationClickEvent {
    /// Pending work registration
    ext: ExtendableEvent,
    /// Tag of the clicked notification
    tag: String,
}

impl NotificationClickEvent {
    /// Create new notification click event
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            ext: ExtendableEvent::new(EventType::NotificationClick),
            tag: tag.into(),
        }
    }

    /// Get the notification tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Register work the event must outlive
    pub fn wait_until(&mut self, task: Task) {
        self.ext.wait_until(task);
    }

    /// Count of registered, unsettled tasks
    pub fn pending(&self) -> usize {
        self.ext.pending()
    }

    /// Drive registered work to completion
    pub fn settle(self) -> Result<()> {
        self.ext.settle()
    }
}
