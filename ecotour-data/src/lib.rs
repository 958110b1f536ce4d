//! Adapters that connect the Ecotour core to the outside world.
//!
//! Responsibilities:
//! - Decode the POI catalog document.
//! - Persist the visitor's selection in SQLite.
//! - Answer route and directions queries over HTTP against OSRM.
//!
//! Boundaries:
//! - Do not encode domain rules (they live in `ecotour-core`).
//! - Keep blocking I/O off async executors; the HTTP client is async.
//!
//! Invariants:
//! - No global mutable state.

mod catalog;
pub mod routing;
mod store;

pub use catalog::{CatalogDocumentError, JsonCatalogSource};
pub use routing::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpRoutingService, HttpRoutingServiceConfig,
    ProviderBuildError,
};
pub use store::{SqliteKeyValueStore, SqliteKeyValueStoreError};
