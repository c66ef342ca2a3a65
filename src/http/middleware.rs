//! Request/response interceptors and the registry that orders them.
//!
//! A [`Middleware`] has two optional hooks. Both default to a no-op that
//! returns `Ok(None)`, meaning "pass through unchanged". Returning
//! `Ok(Some(value))` replaces the request (or response) for every later
//! middleware and for the caller. Returning `Err` aborts the call.
//!
//! The [`MiddlewareRegistry`] keeps middleware in insertion order. Both the
//! request and the response phase walk the registry in that same order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::request::{ApiRequest, ApiResponse};

/// A unit of cross-cutting logic attached to every call.
///
/// Hooks may suspend (for example to refresh a token) and the pipeline waits
/// for each one before moving on, but they should stay cheap.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Called before the transport, in registration order.
    async fn on_request(&self, _request: &ApiRequest) -> anyhow::Result<Option<ApiRequest>> {
        Ok(None)
    }

    /// Called after the transport, in registration order, with the final request.
    async fn on_response(
        &self,
        _request: &ApiRequest,
        _response: &ApiResponse,
    ) -> anyhow::Result<Option<ApiResponse>> {
        Ok(None)
    }
}

/// Opaque identifier returned by [`MiddlewareRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiddlewareHandle(u64);

/// Ordered collection of middleware owned by a client instance.
///
/// Registration and removal are safe to call while requests are in flight.
/// A call works on the [`snapshot`](Self::snapshot) taken when it started.
#[derive(Default)]
pub struct MiddlewareRegistry {
    entries: RwLock<Vec<(MiddlewareHandle, Arc<dyn Middleware>)>>,
    next_id: AtomicU64,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware` and returns a handle for later removal.
    ///
    /// Registering the same `Arc` twice creates two independent entries.
    pub fn register(&self, middleware: Arc<dyn Middleware>) -> MiddlewareHandle {
        let handle = MiddlewareHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((handle, middleware));
        handle
    }

    /// Removes the entry behind `handle`. Unknown or already removed handles
    /// are ignored; the return value tells whether anything was removed.
    pub fn remove(&self, handle: MiddlewareHandle) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter().position(|(h, _)| *h == handle) {
            Some(index) => {
                entries.remove(index);
                true
            },
            None => false,
        }
    }

    /// The registered middleware in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Middleware>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, middleware)| Arc::clone(middleware))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry").field("len", &self.len()).finish()
    }
}
