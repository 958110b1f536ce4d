//! In-memory collaborators for unit and behaviour tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{Coordinate, Directions, KeyValueStore, RouteInfo, RoutingError, RoutingService};

/// Failure injected by [`MemoryKeyValueStore::failing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key-value store unavailable")]
pub struct StoreUnavailable;

/// `KeyValueStore` held in a `HashMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    lists: HashMap<String, Vec<String>>,
    failing: bool,
}

impl MemoryKeyValueStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with [`StoreUnavailable`].
    #[must_use]
    pub fn failing() -> Self {
        Self {
            lists: HashMap::new(),
            failing: true,
        }
    }

    /// Seed `key` with `values`, bypassing validation.
    #[must_use]
    pub fn with_list<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.lists
            .insert(key.to_owned(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Raw contents of `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&[String]> {
        self.lists.get(key).map(Vec::as_slice)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    type Error = StoreUnavailable;

    fn put_string_list(&mut self, key: &str, values: &[String]) -> Result<(), Self::Error> {
        if self.failing {
            return Err(StoreUnavailable);
        }
        self.lists.insert(key.to_owned(), values.to_vec());
        Ok(())
    }

    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, Self::Error> {
        if self.failing {
            return Err(StoreUnavailable);
        }
        Ok(self.lists.get(key).cloned())
    }
}

#[derive(Debug, Clone)]
enum StubResponse {
    Route(RouteInfo),
    Error(RoutingError),
}

/// Scripted `RoutingService`.
///
/// Pairs without a script resolve to a direct route. Every call is counted
/// and recorded, including calls abandoned mid-latency.
///
/// # Examples
/// ```
/// use ecotour_core::test_support::StubRoutingService;
/// use ecotour_core::{RouteInfo, RoutingError, RoutingService, lat_lon};
///
/// let (a, b) = (lat_lon(0.0, 0.0), lat_lon(0.0, 1.0));
/// let stub = StubRoutingService::new().with_error(a, b, RoutingError::NoRoute);
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// assert_eq!(stub.get_route(a, b).await, Err(RoutingError::NoRoute));
/// assert_eq!(stub.get_route(b, a).await, Ok(RouteInfo::direct()));
/// assert_eq!(stub.calls(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct StubRoutingService {
    scripted: Vec<(Coordinate, Coordinate, StubResponse)>,
    fallback: StubResponse,
    directions: Option<Directions>,
    latency: Duration,
    calls: AtomicUsize,
    log: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl Default for StubRoutingService {
    fn default() -> Self {
        Self {
            scripted: Vec::new(),
            fallback: StubResponse::Route(RouteInfo::direct()),
            directions: None,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }
}

impl StubRoutingService {
    /// A stub answering every pair with a direct route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `from → to` with `route`.
    #[must_use]
    pub fn with_route(mut self, from: Coordinate, to: Coordinate, route: RouteInfo) -> Self {
        self.scripted.push((from, to, StubResponse::Route(route)));
        self
    }

    /// Fail `from → to` with `error`.
    #[must_use]
    pub fn with_error(mut self, from: Coordinate, to: Coordinate, error: RoutingError) -> Self {
        self.scripted.push((from, to, StubResponse::Error(error)));
        self
    }

    /// Fail every unscripted pair with `error`.
    #[must_use]
    pub fn failing_by_default(mut self, error: RoutingError) -> Self {
        self.fallback = StubResponse::Error(error);
        self
    }

    /// Answer directions requests with `instructions`.
    #[must_use]
    pub fn with_directions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directions = Some(Directions {
            instructions: instructions.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Delay every route answer by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `get_route` calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Endpoints of every `get_route` call, in arrival order.
    #[must_use]
    pub fn requested_pairs(&self) -> Vec<(Coordinate, Coordinate)> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn response_for(&self, from: Coordinate, to: Coordinate) -> &StubResponse {
        self.scripted
            .iter()
            .find(|(f, t, _)| *f == from && *t == to)
            .map_or(&self.fallback, |(_, _, response)| response)
    }
}

#[async_trait]
impl RoutingService for StubRoutingService {
    async fn get_route(&self, from: Coordinate, to: Coordinate) -> Result<RouteInfo, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((from, to));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.response_for(from, to) {
            StubResponse::Route(route) => Ok(route.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }

    async fn get_directions(
        &self,
        _from: Coordinate,
        _to: Coordinate,
    ) -> Result<Directions, RoutingError> {
        self.directions.clone().ok_or(RoutingError::Unsupported)
    }
}
