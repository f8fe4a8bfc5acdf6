//! Cache stores
//!
//! One store per generation, holding full captured responses keyed by
//! request identity (`METHOD:url`). The storage facility itself is
//! injected behind [`CacheStorage`]; [`MemoryCacheStorage`] is the
//! in-memory implementation the worker ships with. The store serializes
//! access per key; callers rely on that instead of locking around it.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use spin::RwLock;

use crate::fetch::{Request, Response};

/// Cache error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Named store has not been opened
    StoreNotFound,
    /// Response body was already consumed and cannot be stored
    BodyConsumed,
    /// Backing storage failure
    Storage(String),
}

/// A cached request-response pair
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The request
    request: Request,
    /// The captured response
    response: Response,
    /// Size in bytes
    size: usize,
}

impl CacheEntry {
    fn new(request: Request, response: Response) -> Self {
        let size = response.body.as_ref().map(|b| b.len()).unwrap_or(0);
        Self {
            request,
            response,
            size,
        }
    }
}

/// One named cache store
#[derive(Debug, Default)]
pub struct Cache {
    /// Entries by request key
    entries: BTreeMap<String, CacheEntry>,
    /// Total body bytes held
    total_size: usize,
}

impl Cache {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a request
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        self.entries
            .get(&Self::make_key(request))
            .map(|e| e.response.clone())
    }

    /// Store a request-response pair, replacing any previous entry
    pub fn put(&mut self, request: Request, response: Response) -> Result<(), CacheError> {
        if response.body_used {
            return Err(CacheError::BodyConsumed);
        }
        let key = Self::make_key(&request);
        let entry = CacheEntry::new(request, response);
        let size = entry.size;

        if let Some(old) = self.entries.remove(&key) {
            self.total_size -= old.size;
        }
        self.entries.insert(key, entry);
        self.total_size += size;
        Ok(())
    }

    /// Remove a cached request
    pub fn delete(&mut self, request: &Request) -> bool {
        match self.entries.remove(&Self::make_key(request)) {
            Some(entry) => {
                self.total_size -= entry.size;
                true
            }
            None => false,
        }
    }

    /// All request keys, in key order
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// The requests stored, in key order
    pub fn requests(&self) -> Vec<Request> {
        self.entries.values().map(|e| e.request.clone()).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty store
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total body bytes held
    pub fn size(&self) -> usize {
        self.total_size
    }

    /// Request identity: method plus URL
    fn make_key(request: &Request) -> String {
        format!("{}:{}", request.method.as_str(), request.url)
    }
}

/// The platform cache storage facility
///
/// Open-by-name, match-by-request, put, delete, list-names; nothing else.
/// Implementations serialize concurrent access internally.
pub trait CacheStorage: Send + Sync {
    /// Open a store, creating it if absent
    fn open(&self, name: &str) -> Result<(), CacheError>;

    /// Check if a store exists
    fn has(&self, name: &str) -> bool;

    /// Delete a store wholesale; returns whether it existed
    fn delete(&self, name: &str) -> Result<bool, CacheError>;

    /// All store names
    fn keys(&self) -> Vec<String>;

    /// Look up a request in a named store
    fn match_request(&self, name: &str, request: &Request) -> Option<Response>;

    /// Store a request-response pair in a named store
    fn put(&self, name: &str, request: &Request, response: Response) -> Result<(), CacheError>;

    /// All request keys held by a named store
    fn request_keys(&self, name: &str) -> Vec<String>;
}

/// In-memory cache storage
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    /// Stores by name
    stores: RwLock<BTreeMap<String, Cache>>,
}

impl MemoryCacheStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Total body bytes held across all stores
    pub fn usage(&self) -> usize {
        self.stores.read().values().map(Cache::size).sum()
    }

    /// Number of entries in a named store
    pub fn len(&self, name: &str) -> usize {
        self.stores.read().get(name).map(Cache::len).unwrap_or(0)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open(&self, name: &str) -> Result<(), CacheError> {
        self.stores
            .write()
            .entry(name.to_string())
            .or_insert_with(Cache::new);
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.stores.read().contains_key(name)
    }

    fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.stores.write().remove(name).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    fn match_request(&self, name: &str, request: &Request) -> Option<Response> {
        self.stores
            .read()
            .get(name)
            .and_then(|cache| cache.match_request(request))
    }

    fn put(&self, name: &str, request: &Request, response: Response) -> Result<(), CacheError> {
        let mut stores = self.stores.write();
        let cache = stores.get_mut(name).ok_or(CacheError::StoreNotFound)?;
        cache.put(request.clone(), response)
    }

    fn request_keys(&self, name: &str) -> Vec<String> {
        self.stores
            .read()
            .get(name)
            .map(Cache::keys)
            .unwrap_or_default()
    }
}
