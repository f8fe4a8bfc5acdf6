//! Notifications
//!
//! Builds the notification shown for a push payload and defines the
//! platform display facility. Nothing here touches the cache stores.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Notification error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// User denied notification permission
    PermissionDenied,
    /// Display facility unavailable
    Unavailable,
    /// No notification with the given tag
    UnknownTag,
    Other,
}

/// Auxiliary data attached to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// When the push arrived (ms since epoch)
    pub date_of_arrival: u64,
    /// Fixed key identifying the notification source
    pub primary_key: u32,
}

/// Fixed presentation shared by every notification the worker shows
#[derive(Debug, Clone)]
pub struct NotificationStyle {
    /// Title line
    pub title: String,
    /// Icon asset path
    pub icon: String,
    /// Badge asset path
    pub badge: String,
    /// Vibration pattern (ms on/off/on)
    pub vibrate: Vec<u32>,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        Self {
            title: String::new(),
            icon: String::from("/icons/icon-192x192.png"),
            badge: String::from("/icons/icon-72x72.png"),
            vibrate: vec![100, 50, 100],
        }
    }
}

impl NotificationStyle {
    /// Create a style with the default assets and the given title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A notification ready to display
#[derive(Debug, Clone)]
pub struct Notification {
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// Icon asset path
    pub icon: String,
    /// Badge asset path
    pub badge: String,
    /// Vibration pattern
    pub vibrate: Vec<u32>,
    /// Tag for later lookup (close on click)
    pub tag: Option<String>,
    /// Auxiliary data
    pub data: NotificationData,
}

impl Notification {
    /// Build a notification from the worker's style and a push payload
    pub fn new(style: &NotificationStyle, body: impl Into<String>, data: NotificationData) -> Self {
        Self {
            title: style.title.clone(),
            body: body.into(),
            icon: style.icon.clone(),
            badge: style.badge.clone(),
            vibrate: style.vibrate.clone(),
            tag: None,
            data,
        }
    }

    /// Set the tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// The platform notification facility
pub trait Notifications: Send + Sync {
    /// Display a notification
    fn show(&self, notification: Notification) -> Result<(), NotifyError>;

    /// Close a displayed notification by tag
    fn close(&self, tag: &str) -> Result<(), NotifyError>;
}
