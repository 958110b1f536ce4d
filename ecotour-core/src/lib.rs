//! Core domain for the Ecotour engine.
//!
//! The crate keeps a visitor's selection of tour sites consistent with the
//! sustainability features those sites expose, finds the selected site
//! nearest to a position, and fetches road routes between sites in the
//! background without blocking the display.
//!
//! Collaborators sit behind narrow traits: [`CatalogSource`] supplies the
//! sites, [`KeyValueStore`] persists the selection, and [`RoutingService`]
//! answers route queries. Concrete adapters live in `ecotour-data`.

mod catalog;
mod feature;
pub mod fetch;
mod poi;
mod proximity;
pub mod routing;
pub mod selection;
pub mod tour;

#[doc(hidden)]
pub mod test_support;

pub use catalog::{CatalogError, CatalogSource, PoiCatalog, load_catalog};
pub use feature::{Feature, UnknownFeature};
pub use fetch::{
    OutputTarget, ROUTE_UNAVAILABLE_MESSAGE, RouteFetcher, RouteSurface, SurfaceEvent,
    SurfaceReceiver, SurfaceSender, TaskHandle, TaskId, TaskState, surface_channel,
};
pub use poi::{Coordinate, PoiId, PointOfInterest, lat_lon};
pub use proximity::{ProximityError, distance_score, find_closest};
pub use routing::{Directions, RouteCache, RouteInfo, RoutingError, RoutingService, route_pair};
pub use selection::{
    CorruptionReason, KeyValueStore, SELECTED_FEATURES_KEY, SELECTED_POIS_KEY, SelectionError,
    SelectionManager, covered_features,
};
pub use tour::{
    DEFAULT_ORIGIN, DirectionsError, Marker, TourController, markers, route_to_tour_waypoints,
    tour_waypoints,
};
