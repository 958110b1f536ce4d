//! Road-network routing collaborator and the shared segment cache.
//!
//! [`RoutingService`] is the narrow seam to the external routing engine.
//! [`route_pair`] layers the [`RouteCache`] over it so repeated tours do not
//! re-query segments they already hold.

mod cache;
mod error;
mod service;

pub use cache::{RouteCache, route_pair};
pub use error::RoutingError;
pub use service::{Directions, RouteInfo, RoutingService};
