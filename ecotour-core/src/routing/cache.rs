use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::Coordinate;

use super::{RouteInfo, RoutingError, RoutingService};

/// Bit-exact key for one direction of travel.
///
/// `(a, b)` and `(b, a)` are distinct entries, so a hit is always for the
/// exact query direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RouteKey([u64; 4]);

impl RouteKey {
    fn new(from: Coordinate, to: Coordinate) -> Self {
        Self([
            from.x.to_bits(),
            from.y.to_bits(),
            to.x.to_bits(),
            to.y.to_bits(),
        ])
    }
}

/// Thread-safe cache of routes keyed by ordered endpoint pair.
///
/// Entries are upserted (last write wins) and never evicted; a tour holds at
/// most one entry per segment.
///
/// # Examples
/// ```
/// use ecotour_core::{RouteCache, RouteInfo, lat_lon};
///
/// let cache = RouteCache::new();
/// let (a, b) = (lat_lon(0.0, 0.0), lat_lon(0.0, 1.0));
/// cache.insert(a, b, RouteInfo::new(vec![lat_lon(0.0, 0.5)]));
///
/// assert!(cache.get(a, b).is_some());
/// assert!(cache.get(b, a).is_none());
/// ```
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: RwLock<HashMap<RouteKey, RouteInfo>>,
}

impl RouteCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached route from `from` to `to`, if any.
    #[must_use]
    pub fn get(&self, from: Coordinate, to: Coordinate) -> Option<RouteInfo> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&RouteKey::new(from, to))
            .cloned()
    }

    /// Store `route` for `from` to `to`, replacing any previous entry.
    pub fn insert(&self, from: Coordinate, to: Coordinate, route: RouteInfo) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(RouteKey::new(from, to), route);
    }

    /// Number of cached segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached segment.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Route one pair through `service`, consulting `cache` when `use_cache` is
/// set.
///
/// A hit skips the remote call; a successful miss is written back. With
/// `use_cache` unset the cache is neither read nor written. Failures are
/// never cached.
///
/// # Errors
///
/// Propagates the [`RoutingError`] returned by `service`.
pub async fn route_pair<R>(
    service: &R,
    cache: &RouteCache,
    from: Coordinate,
    to: Coordinate,
    use_cache: bool,
) -> Result<RouteInfo, RoutingError>
where
    R: RoutingService + ?Sized,
{
    if use_cache {
        if let Some(route) = cache.get(from, to) {
            return Ok(route);
        }
    }
    let route = service.get_route(from, to).await?;
    if use_cache {
        cache.insert(from, to, route.clone());
    }
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lat_lon;
    use crate::test_support::StubRoutingService;
    use rstest::{fixture, rstest};

    const A: Coordinate = lat_lon(49.26, -123.25);
    const B: Coordinate = lat_lon(49.27, -123.24);

    #[fixture]
    fn detour() -> RouteInfo {
        RouteInfo::new(vec![lat_lon(49.265, -123.26)])
    }

    #[rstest]
    fn insert_upserts_last_write(detour: RouteInfo) {
        let cache = RouteCache::new();
        cache.insert(A, B, RouteInfo::direct());
        cache.insert(A, B, detour.clone());
        assert_eq!(cache.get(A, B), Some(detour));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn keys_are_ordered(detour: RouteInfo) {
        let cache = RouteCache::new();
        cache.insert(A, B, detour);
        assert!(cache.get(B, A).is_none());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn cache_hit_skips_remote_call(detour: RouteInfo) {
        let service = StubRoutingService::new().with_route(A, B, detour.clone());
        let cache = RouteCache::new();

        let first = route_pair(&service, &cache, A, B, true).await.expect("route");
        let second = route_pair(&service, &cache, A, B, true).await.expect("route");

        assert_eq!(first, detour);
        assert_eq!(second, detour);
        assert_eq!(service.calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn bypass_neither_reads_nor_writes(detour: RouteInfo) {
        let service = StubRoutingService::new().with_route(A, B, detour.clone());
        let cache = RouteCache::new();
        cache.insert(A, B, RouteInfo::direct());

        let route = route_pair(&service, &cache, A, B, false).await.expect("route");

        assert_eq!(route, detour);
        assert_eq!(service.calls(), 1);
        assert_eq!(cache.get(A, B), Some(RouteInfo::direct()));
    }

    #[rstest]
    #[tokio::test]
    async fn failures_are_not_cached() {
        let service = StubRoutingService::new().with_error(A, B, RoutingError::NoRoute);
        let cache = RouteCache::new();

        let err = route_pair(&service, &cache, A, B, true)
            .await
            .expect_err("scripted failure");

        assert_eq!(err, RoutingError::NoRoute);
        assert!(cache.is_empty());
    }
}
