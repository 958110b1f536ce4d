//! Turn the selection into map content.
//!
//! The tour is a closed loop through the selected sites in tour order. A
//! second, shorter route joins the visitor's position to the nearest
//! selected site. [`TourController`] keeps both routes in step with the
//! selection and the visitor's position.

use std::sync::Arc;

use log::debug;
use thiserror::Error;
use tokio::runtime::Handle;

use crate::{
    Coordinate, Directions, KeyValueStore, OutputTarget, PointOfInterest, ProximityError,
    RouteCache, RouteFetcher, RoutingError, RoutingService, SelectionError, SelectionManager,
    SurfaceSender, TaskHandle, find_closest, lat_lon,
};

/// Where the tour is drawn when nothing is selected.
pub const DEFAULT_ORIGIN: Coordinate = lat_lon(49.260_887, -123.249_02);

/// Waypoints of the tour through `selected`.
///
/// An empty selection yields `[origin]`. Otherwise the loop returns to the
/// first site.
///
/// # Examples
/// ```
/// use ecotour_core::{DEFAULT_ORIGIN, PointOfInterest, lat_lon, tour_waypoints};
///
/// assert_eq!(tour_waypoints(&[], DEFAULT_ORIGIN), [DEFAULT_ORIGIN]);
///
/// let a = PointOfInterest::new("a", "A", lat_lon(0.0, 0.0));
/// let b = PointOfInterest::new("b", "B", lat_lon(0.0, 1.0));
/// assert_eq!(
///     tour_waypoints([&a, &b], DEFAULT_ORIGIN),
///     [a.location, b.location, a.location]
/// );
/// ```
#[must_use]
pub fn tour_waypoints<'a, I>(selected: I, origin: Coordinate) -> Vec<Coordinate>
where
    I: IntoIterator<Item = &'a PointOfInterest>,
{
    let mut waypoints: Vec<Coordinate> = selected.into_iter().map(|poi| poi.location).collect();
    match waypoints.first().copied() {
        Some(start) => waypoints.push(start),
        None => waypoints.push(origin),
    }
    waypoints
}

/// Waypoints from `position` to the nearest of `selected`.
///
/// # Errors
///
/// Returns [`ProximityError::NoCandidates`] when `selected` is empty.
pub fn route_to_tour_waypoints<'a, I>(
    position: Coordinate,
    selected: I,
) -> Result<Vec<Coordinate>, ProximityError>
where
    I: IntoIterator<Item = &'a PointOfInterest>,
{
    let closest = find_closest(position, selected)?;
    Ok(vec![position, closest.location])
}

/// A pin on the map for one selected site.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Site name.
    pub title: String,
    /// Site description.
    pub snippet: String,
    /// Pin position.
    pub location: Coordinate,
}

/// Markers for `selected`, in the same order.
#[must_use]
pub fn markers<'a, I>(selected: I) -> Vec<Marker>
where
    I: IntoIterator<Item = &'a PointOfInterest>,
{
    selected
        .into_iter()
        .map(|poi| Marker {
            title: poi.display_name.clone(),
            snippet: poi.description.clone(),
            location: poi.location,
        })
        .collect()
}

/// Errors from [`TourController::directions_to`].
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// No position has been reported yet.
    #[error("User's location unknown: unable to find directions")]
    UnknownLocation,
    /// The index names no selected site.
    #[error("Unknown POI destination: unable to find directions")]
    UnknownDestination {
        /// The requested marker index.
        index: usize,
    },
    /// The selection could not be read.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The routing service failed.
    #[error("unable to find directions: {0}")]
    Routing(#[from] RoutingError),
}

/// Keeps the tour and route-to-tour paths in step with the selection.
///
/// The controller runs on the surface context. It reads the selection,
/// starts route tasks, and leaves drawing to whoever drains the surface
/// queue.
pub struct TourController<S> {
    selection: SelectionManager<S>,
    service: Arc<dyn RoutingService>,
    fetcher: RouteFetcher,
    origin: Coordinate,
    position: Option<Coordinate>,
    selected: Vec<PointOfInterest>,
    tour_task: Option<TaskHandle>,
    route_to_tour_task: Option<TaskHandle>,
}

impl<S> std::fmt::Debug for TourController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourController")
            .field("fetcher", &self.fetcher)
            .field("origin", &self.origin)
            .field("position", &self.position)
            .field("selected", &self.selected.len())
            .finish_non_exhaustive()
    }
}

impl<S> TourController<S>
where
    S: KeyValueStore,
{
    /// Control the tour for `selection`, routing through `service`.
    #[must_use]
    pub fn new(
        selection: SelectionManager<S>,
        service: Arc<dyn RoutingService>,
        surface: SurfaceSender,
        runtime: Handle,
    ) -> Self {
        let fetcher = RouteFetcher::new(Arc::clone(&service), surface, runtime);
        Self {
            selection,
            service,
            fetcher,
            origin: DEFAULT_ORIGIN,
            position: None,
            selected: Vec::new(),
            tour_task: None,
            route_to_tour_task: None,
        }
    }

    /// Draw an empty tour at `origin` instead of [`DEFAULT_ORIGIN`].
    #[must_use]
    pub const fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = origin;
        self
    }

    /// Share `cache` with other fetchers.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<RouteCache>) -> Self {
        self.fetcher = self.fetcher.with_cache(cache);
        self
    }

    /// The managed selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionManager<S> {
        &self.selection
    }

    /// Mutable access to the selection; call [`refresh`](Self::refresh)
    /// afterwards.
    pub const fn selection_mut(&mut self) -> &mut SelectionManager<S> {
        &mut self.selection
    }

    /// The route fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &RouteFetcher {
        &self.fetcher
    }

    /// Last reported position.
    #[must_use]
    pub const fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Handle of the latest tour task.
    #[must_use]
    pub const fn tour_task(&self) -> Option<&TaskHandle> {
        self.tour_task.as_ref()
    }

    /// Handle of the latest route-to-tour task.
    #[must_use]
    pub const fn route_to_tour_task(&self) -> Option<&TaskHandle> {
        self.route_to_tour_task.as_ref()
    }

    /// Re-read the selection and restart both routes.
    ///
    /// Tour segments are cached; the route-to-tour leg is not, since the
    /// position changes between calls. Returns the markers to draw.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] if the selection cannot be read; no task
    /// is started in that case.
    pub fn refresh(&mut self) -> Result<Vec<Marker>, SelectionError> {
        self.selected = self
            .selection
            .selected_pois()?
            .into_iter()
            .cloned()
            .collect();
        debug!("refreshing tour over {} selected sites", self.selected.len());

        let waypoints = tour_waypoints(&self.selected, self.origin);
        self.tour_task = Some(self.fetcher.start(OutputTarget::Tour, waypoints, true));
        self.restart_route_to_tour();
        Ok(markers(&self.selected))
    }

    /// Record the visitor's position and redraw the route to the tour.
    pub fn update_location(&mut self, position: Option<Coordinate>) {
        self.position = position;
        self.restart_route_to_tour();
    }

    /// Directions from the current position to the selected site at `index`.
    ///
    /// # Errors
    ///
    /// See [`DirectionsError`].
    pub async fn directions_to(&self, index: usize) -> Result<Directions, DirectionsError> {
        let from = self.position.ok_or(DirectionsError::UnknownLocation)?;
        let to = self
            .selection
            .selected_pois()?
            .get(index)
            .map(|poi| poi.location)
            .ok_or(DirectionsError::UnknownDestination { index })?;
        Ok(self.service.get_directions(from, to).await?)
    }

    /// Cancel both routes.
    pub fn shutdown(&mut self) {
        self.fetcher.cancel_all();
        self.tour_task = None;
        self.route_to_tour_task = None;
    }

    fn restart_route_to_tour(&mut self) {
        let waypoints = self
            .position
            .and_then(|position| route_to_tour_waypoints(position, &self.selected).ok());
        match waypoints {
            Some(leg) => {
                self.route_to_tour_task =
                    Some(self.fetcher.start(OutputTarget::RouteToTour, leg, false));
            }
            None => {
                self.fetcher.clear(OutputTarget::RouteToTour);
                self.route_to_tour_task = None;
            }
        }
    }
}
