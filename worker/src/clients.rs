//! Controlled pages
//!
//! The pages a worker can control: counted while deciding whether
//! activation must wait, claimed wholesale once activation finishes, and
//! opened on notification clicks.

use alloc::format;
use alloc::string::String;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashMap;
use spin::RwLock;

use crate::error::Result;

/// An open page
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client ID
    pub id: String,
    /// URL the page shows
    pub url: String,
    /// Whether the page is focused
    pub focused: bool,
    /// Whether this worker controls the page
    pub controlled: bool,
}

/// The platform's view of open pages
pub trait Clients: Send + Sync {
    /// Number of open pages
    fn count(&self) -> usize;

    /// Take control of every open page; returns how many were claimed
    fn claim(&self) -> usize;

    /// Open (or focus) a window at a URL; returns the client ID
    fn open_window(&self, url: &str) -> Result<String>;
}

/// In-memory page registry
#[derive(Debug, Default)]
pub struct ClientRegistry {
    /// Open pages by ID
    pages: RwLock<HashMap<String, ClientInfo>>,
    /// ID counter
    next_id: AtomicU64,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open page; returns its ID
    pub fn connect(&self, url: impl Into<String>) -> String {
        let id = format!("client-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let info = ClientInfo {
            id: id.clone(),
            url: url.into(),
            focused: false,
            controlled: false,
        };
        self.pages.write().insert(id.clone(), info);
        id
    }

    /// Remove a page; returns whether it was present
    pub fn disconnect(&self, id: &str) -> bool {
        self.pages.write().remove(id).is_some()
    }

    /// Get a page by ID
    pub fn get(&self, id: &str) -> Option<ClientInfo> {
        self.pages.read().get(id).cloned()
    }

    /// Number of controlled pages
    pub fn controlled_count(&self) -> usize {
        self.pages.read().values().filter(|c| c.controlled).count()
    }
}

impl Clients for ClientRegistry {
    fn count(&self) -> usize {
        self.pages.read().len()
    }

    fn claim(&self) -> usize {
        let mut pages = self.pages.write();
        for client in pages.values_mut() {
            client.controlled = true;
        }
        pages.len()
    }

    fn open_window(&self, url: &str) -> Result<String> {
        let id = self.connect(url);
        if let Some(client) = self.pages.write().get_mut(&id) {
            client.focused = true;
        }
        log::debug!("[clients] opened window {} at {}", id, url);
        Ok(id)
    }
}
