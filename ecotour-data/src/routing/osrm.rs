//! OSRM API response types for the Route service.
//!
//! Only the fields the routing service reads are modelled. Geometry is
//! requested as GeoJSON so coordinates arrive as `[lon, lat]` pairs.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// A single route through every requested coordinate.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Full route geometry.
    pub geometry: Geometry,
    /// One leg per consecutive coordinate pair.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// Vertices as `[lon, lat]`.
    pub coordinates: Vec<[f64; 2]>,
}

/// The part of a route between two requested coordinates.
#[derive(Debug, Deserialize)]
pub struct Leg {
    /// Turn-by-turn steps, present when `steps=true`.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single manoeuvre and the road travelled after it.
#[derive(Debug, Deserialize)]
pub struct Step {
    /// Road name, empty when unnamed.
    #[serde(default)]
    pub name: String,
    /// Distance in metres.
    #[serde(default)]
    pub distance: f64,
    /// The manoeuvre starting this step.
    pub maneuver: Maneuver,
}

/// OSRM step manoeuvre.
#[derive(Debug, Deserialize)]
pub struct Maneuver {
    /// Manoeuvre kind, e.g. `"depart"`, `"turn"`, `"arrive"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction qualifier, e.g. `"left"` or `"slight right"`.
    pub modifier: Option<String>,
}
