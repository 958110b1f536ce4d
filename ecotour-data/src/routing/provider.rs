//! HTTP-based `RoutingService` using OSRM's Route API.
//!
//! Each query asks OSRM for one route between two coordinates with full
//! GeoJSON geometry and step-level manoeuvres. The same response feeds both
//! [`RoutingService::get_route`] (the interior vertices of the geometry) and
//! [`RoutingService::get_directions`] (one sentence per step).

use std::time::Duration;

use async_trait::async_trait;
use ecotour_core::{Coordinate, Directions, RouteInfo, RoutingError, RoutingService, lat_lon};
use log::debug;
use reqwest::Client;
use thiserror::Error;

use super::osrm::{Route, RouteResponse, Step};

/// Error type for [`HttpRoutingService`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "ecotour-routing/0.1";

/// Default OSRM routing profile. Tours are walked.
pub const DEFAULT_PROFILE: &str = "foot";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpRoutingService`].
#[derive(Debug, Clone)]
pub struct HttpRoutingServiceConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// OSRM profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpRoutingServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRoutingServiceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the OSRM profile, e.g. `"foot"` or `"bike"`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing service backed by an OSRM server.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use ecotour_core::{RoutingService, lat_lon};
/// use ecotour_data::{HttpRoutingService, HttpRoutingServiceConfig};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HttpRoutingServiceConfig::new("http://localhost:5000")
///     .with_timeout(Duration::from_secs(10));
/// let service = HttpRoutingService::with_config(config)?;
///
/// let route = service
///     .get_route(lat_lon(49.2665, -123.25), lat_lon(49.2621, -123.2531))
///     .await?;
/// println!("{} intermediate waypoints", route.waypoints.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpRoutingService {
    client: Client,
    config: HttpRoutingServiceConfig,
}

impl HttpRoutingService {
    /// Create a new service with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingServiceConfig::new(base_url))
    }

    /// Create a new service with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: HttpRoutingServiceConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpRoutingServiceConfig {
        &self.config
    }

    /// Build the OSRM Route API URL for a pair of endpoints.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson&steps=true`.
    fn build_route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson&steps=true",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.x,
            from.y,
            to.x,
            to.y
        )
    }

    async fn fetch_route(&self, from: Coordinate, to: Coordinate) -> Result<Route, RoutingError> {
        let url = self.build_route_url(from, to);
        debug!("requesting route {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        // OSRM reports query errors as JSON bodies on 4xx responses, so the
        // body is decoded before the status is considered.
        match serde_json::from_str::<RouteResponse>(&body) {
            Ok(parsed) => convert_response(parsed),
            Err(_) if !status.is_success() => Err(RoutingError::Http {
                url,
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
            }),
            Err(err) => Err(RoutingError::Parse {
                message: err.to_string(),
            }),
        }
    }

    /// Convert a reqwest error to a `RoutingError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RoutingError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Select the best route from an OSRM response.
fn convert_response(response: RouteResponse) -> Result<Route, RoutingError> {
    if !response.is_ok() {
        return Err(RoutingError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    response
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRoute)
}

/// The route geometry without its endpoint vertices.
fn interior_waypoints(route: &Route) -> RouteInfo {
    let vertices = &route.geometry.coordinates;
    let interior = vertices
        .get(1..vertices.len().saturating_sub(1))
        .unwrap_or_default();
    RouteInfo::new(
        interior
            .iter()
            .map(|&[lon, lat]| lat_lon(lat, lon))
            .collect(),
    )
}

fn render_directions(route: &Route) -> Directions {
    Directions {
        instructions: route
            .legs
            .iter()
            .flat_map(|leg| &leg.steps)
            .map(describe_step)
            .collect(),
    }
}

fn describe_step(step: &Step) -> String {
    let modifier = step.maneuver.modifier.as_deref();
    let (action, preposition) = match (step.maneuver.kind.as_str(), modifier) {
        ("arrive", _) => return "Arrive at your destination".to_owned(),
        ("depart", _) => ("Start".to_owned(), "on"),
        ("roundabout" | "rotary", _) => ("Enter the roundabout".to_owned(), "towards"),
        (_, Some("straight") | None) => ("Continue straight".to_owned(), "onto"),
        (_, Some(direction)) => (format!("Turn {direction}"), "onto"),
    };
    let on_road = if step.name.is_empty() {
        action
    } else {
        format!("{action} {preposition} {}", step.name)
    };
    if step.distance > 0.0 {
        format!("{on_road} ({:.0} m)", step.distance)
    } else {
        on_road
    }
}

#[async_trait]
impl RoutingService for HttpRoutingService {
    async fn get_route(&self, from: Coordinate, to: Coordinate) -> Result<RouteInfo, RoutingError> {
        let route = self.fetch_route(from, to).await?;
        Ok(interior_waypoints(&route))
    }

    async fn get_directions(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Directions, RoutingError> {
        let route = self.fetch_route(from, to).await?;
        Ok(render_directions(&route))
    }
}
