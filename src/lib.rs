//! Facade crate for the Ecotour engine.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the JSON catalog loader, the SQLite selection store and the OSRM
//! routing client.

#![forbid(unsafe_code)]

pub use ecotour_core::{
    CatalogError, CatalogSource, Coordinate, DirectionsError, Feature, KeyValueStore,
    OutputTarget, PoiCatalog, PoiId, PointOfInterest, ProximityError, RouteCache, RouteFetcher,
    RouteInfo, RouteSurface, RoutingError, RoutingService, SelectionError, SelectionManager,
    SurfaceEvent, TaskHandle, TaskState, TourController, UnknownFeature, find_closest, lat_lon,
    load_catalog, surface_channel,
};

#[cfg(feature = "data")]
pub use ecotour_data::{
    CatalogDocumentError, HttpRoutingService, HttpRoutingServiceConfig, JsonCatalogSource,
    SqliteKeyValueStore, SqliteKeyValueStoreError,
};
