//! HTTP routing against an OSRM server.
//!
//! [`HttpRoutingService`] implements [`ecotour_core::RoutingService`] on top
//! of the OSRM Route API. Route geometry is requested as GeoJSON; directions
//! are rendered from the step manoeuvres of the same response.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use ecotour_data::routing::{HttpRoutingService, HttpRoutingServiceConfig};
//!
//! let config = HttpRoutingServiceConfig::new("http://localhost:5000")
//!     .with_profile("foot")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let service = HttpRoutingService::with_config(config)?;
//! # Ok::<(), ecotour_data::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpRoutingService, HttpRoutingServiceConfig,
    ProviderBuildError,
};
