use std::fmt;

use async_trait::async_trait;

use crate::Coordinate;

use super::RoutingError;

/// Intermediate waypoints of a route between two endpoints.
///
/// The endpoints themselves are never included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteInfo {
    /// Waypoints in travel order.
    pub waypoints: Vec<Coordinate>,
}

impl RouteInfo {
    /// Wrap a waypoint sequence.
    #[must_use]
    pub const fn new(waypoints: Vec<Coordinate>) -> Self {
        Self { waypoints }
    }

    /// A direct route with no intermediate waypoints.
    #[must_use]
    pub const fn direct() -> Self {
        Self {
            waypoints: Vec::new(),
        }
    }
}

/// Turn-by-turn instructions between two endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directions {
    /// One instruction per manoeuvre, in travel order.
    pub instructions: Vec<String>,
}

impl fmt::Display for Directions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(instruction)?;
        }
        Ok(())
    }
}

/// Remote road-network routing.
///
/// Implementations are slow and fallible; callers own caching and never
/// retry.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use ecotour_core::{Coordinate, RouteInfo, RoutingError, RoutingService, lat_lon};
///
/// struct StraightLine;
///
/// #[async_trait]
/// impl RoutingService for StraightLine {
///     async fn get_route(
///         &self,
///         _from: Coordinate,
///         _to: Coordinate,
///     ) -> Result<RouteInfo, RoutingError> {
///         Ok(RouteInfo::direct())
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let route = StraightLine
///     .get_route(lat_lon(0.0, 0.0), lat_lon(0.0, 1.0))
///     .await
///     .unwrap();
/// assert!(route.waypoints.is_empty());
/// # });
/// ```
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Intermediate waypoints of the route from `from` to `to`.
    async fn get_route(&self, from: Coordinate, to: Coordinate)
    -> Result<RouteInfo, RoutingError>;

    /// Walking directions from `from` to `to`.
    ///
    /// The default reports [`RoutingError::Unsupported`].
    async fn get_directions(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Directions, RoutingError> {
        let _ = (from, to);
        Err(RoutingError::Unsupported)
    }
}
