//! Request and response model
//!
//! Captured HTTP requests and responses as the interception layer sees
//! them, plus the fetch event a controlled page's request arrives on.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::events::{EventType, ExtendableEvent, Task};

/// Fetch event ID counter
static NEXT_FETCH_ID: AtomicU64 = AtomicU64::new(1);

/// Fetch event ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchEventId(u64);

impl FetchEventId {
    fn new() -> Self {
        Self(NEXT_FETCH_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl Default for RequestMethod {
    fn default() -> Self {
        Self::Get
    }
}

impl RequestMethod {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// What the requested resource is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    /// Unknown
    Empty,
    /// Top-level document
    Document,
    /// Image resource
    Image,
    /// Script
    Script,
    /// Stylesheet
    Style,
    /// Font
    Font,
    /// App manifest
    Manifest,
}

impl Default for RequestDestination {
    fn default() -> Self {
        Self::Empty
    }
}

impl RequestDestination {
    /// Whether this request loads a top-level document
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Document)
    }
}

/// An intercepted request
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: RequestMethod,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body (if any)
    pub body: Option<Vec<u8>>,
    /// Request destination
    pub destination: RequestDestination,
    /// Issuing client (if known)
    pub client_id: Option<String>,
}

impl Request {
    /// Create a new GET request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            headers: BTreeMap::new(),
            body: None,
            destination: RequestDestination::Empty,
            client_id: None,
        }
    }

    /// Create a top-level document request
    pub fn navigation(url: impl Into<String>) -> Self {
        let mut request = Self::new(url);
        request.destination = RequestDestination::Document;
        request
    }

    /// Set the destination
    pub fn with_destination(mut self, destination: RequestDestination) -> Self {
        self.destination = destination;
        self
    }
}

/// Response type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Cross-origin CORS response
    Cors,
    /// Unclassified
    Default,
    /// Network-level failure
    Error,
    /// Cross-origin, contents hidden
    Opaque,
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Default
    }
}

/// A captured response
#[derive(Debug, Clone)]
pub struct Response {
    /// Response type
    pub response_type: ResponseType,
    /// URL the response was produced for
    pub url: String,
    /// Whether a redirect was followed to produce it
    pub redirected: bool,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Option<Vec<u8>>,
    /// Whether the body has been consumed
    pub body_used: bool,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16) -> Self {
        Self {
            response_type: ResponseType::Default,
            url: String::new(),
            redirected: false,
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: None,
            body_used: false,
        }
    }

    /// Create a same-origin response
    pub fn basic(status: u16) -> Self {
        let mut response = Self::new(status);
        response.response_type = ResponseType::Basic;
        response
    }

    /// Create a network-failure response
    pub fn error() -> Self {
        Self {
            response_type: ResponseType::Error,
            url: String::new(),
            redirected: false,
            status: 0,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: None,
            body_used: false,
        }
    }

    /// Create an opaque cross-origin response
    pub fn opaque() -> Self {
        let mut response = Self::error();
        response.response_type = ResponseType::Opaque;
        response
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Check if the status is in the success range
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Consume the body
    ///
    /// A body may be read once; a second take yields nothing.
    pub fn take_body(&mut self) -> Option<Vec<u8>> {
        if self.body_used {
            return None;
        }
        self.body_used = true;
        self.body.take()
    }

    /// Duplicate the response while the body is still unread
    pub fn clone_response(&self) -> Self {
        self.clone()
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Fetch event
///
/// Carries one intercepted request. The handler answers it at most once
/// via [`FetchEvent::respond_with`]; work outliving the response (the
/// opportunistic cache write) is registered on the embedded extendable
/// event and driven by [`FetchEvent::settle`].
#[derive(Debug)]
pub struct FetchEvent {
    /// Event ID
    id: FetchEventId,
    /// Intercepted request
    request: Request,
    /// Pending work registration
    ext: ExtendableEvent,
    /// Whether respond_with was called
    responded: bool,
    /// The response, until the caller takes it
    response: Option<Response>,
}

impl FetchEvent {
    /// Create a new fetch event
    pub fn new(request: Request) -> Self {
        Self {
            id: FetchEventId::new(),
            request,
            ext: ExtendableEvent::new(EventType::Fetch),
            responded: false,
            response: None,
        }
    }

    /// Get the event ID
    pub fn id(&self) -> FetchEventId {
        self.id
    }

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Check if respond_with was called
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Answer the event; the first response wins
    pub fn respond_with(&mut self, response: Response) {
        if !self.responded {
            self.responded = true;
            self.response = Some(response);
        }
    }

    /// Take the response out
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Register work the event must outlive
    pub fn wait_until(&mut self, task: Task) {
        self.ext.wait_until(task);
    }

    /// Register fire-and-forget work
    pub fn spawn_detached(&mut self, task: Task) {
        self.ext.spawn_detached(task);
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
