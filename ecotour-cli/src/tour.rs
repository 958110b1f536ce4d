//! Route and proximity commands: `tour` and `nearest`.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ecotour_core::{
    Coordinate, OutputTarget, RouteSurface, RoutingService, TourController, find_closest,
    lat_lon, surface_channel,
};
use ecotour_data::{HttpRoutingService, HttpRoutingServiceConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tokio::runtime::Builder;

use crate::{
    ARG_CATALOG, ARG_DATABASE, ARG_DIRECTIONS_TO, ARG_LATITUDE, ARG_LONGITUDE,
    ARG_OSRM_BASE_URL, CliError, ENV_NEAREST_CATALOG, ENV_NEAREST_LATITUDE,
    ENV_NEAREST_LONGITUDE, ENV_TOUR_CATALOG, ENV_TOUR_LATITUDE, ENV_TOUR_LONGITUDE, Sources,
    write_line,
};

/// CLI arguments for the `tour` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "tour",
    long_about = "Fetch the walking route through the selected sites from an \
                 OSRM server. With a position, also fetch the leg from the \
                 position to the nearest selected site and, optionally, \
                 turn-by-turn directions to one of the sites.",
    about = "Fetch the walking route through the selected sites"
)]
#[ortho_config(prefix = "ECOTOUR")]
pub(crate) struct TourArgs {
    /// Path to the JSON catalog document.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to the SQLite selection database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Visitor latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Visitor longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Print directions to the selected site at this tour index.
    #[arg(long = ARG_DIRECTIONS_TO, value_name = "index")]
    #[serde(default)]
    pub(crate) directions_to: Option<usize>,
}

/// CLI arguments for the `nearest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "nearest", about = "Find the selected site closest to a position")]
#[ortho_config(prefix = "ECOTOUR")]
pub(crate) struct NearestArgs {
    /// Path to the JSON catalog document.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to the SQLite selection database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Reference latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Reference longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
}

/// Resolved `tour` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TourConfig {
    pub(crate) sources: Sources,
    pub(crate) osrm_base_url: String,
    pub(crate) position: Option<Coordinate>,
    pub(crate) directions_to: Option<usize>,
}

impl TryFrom<TourArgs> for TourConfig {
    type Error = CliError;

    fn try_from(args: TourArgs) -> Result<Self, Self::Error> {
        let sources = Sources::resolve(args.catalog, args.database, ENV_TOUR_CATALOG)?;
        let position = match (args.latitude, args.longitude) {
            (Some(latitude), Some(longitude)) => Some(lat_lon(latitude, longitude)),
            (None, None) => None,
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LATITUDE,
                    env: ENV_TOUR_LATITUDE,
                });
            }
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LONGITUDE,
                    env: ENV_TOUR_LONGITUDE,
                });
            }
        };
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpRoutingServiceConfig::default().base_url);
        Ok(Self {
            sources,
            osrm_base_url,
            position,
            directions_to: args.directions_to,
        })
    }
}

/// Resolved `nearest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearestConfig {
    pub(crate) sources: Sources,
    pub(crate) position: Coordinate,
}

impl TryFrom<NearestArgs> for NearestConfig {
    type Error = CliError;

    fn try_from(args: NearestArgs) -> Result<Self, Self::Error> {
        let sources = Sources::resolve(args.catalog, args.database, ENV_NEAREST_CATALOG)?;
        let latitude = args.latitude.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_NEAREST_LATITUDE,
        })?;
        let longitude = args.longitude.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_NEAREST_LONGITUDE,
        })?;
        Ok(Self {
            sources,
            position: lat_lon(latitude, longitude),
        })
    }
}

/// Builds the routing service for the current tour invocation.
pub(crate) trait RoutingServiceFactory {
    fn build(&self, config: &TourConfig) -> Result<Arc<dyn RoutingService>, CliError>;
}

/// Routes through the configured OSRM server.
pub(crate) struct HttpRoutingServiceFactory;

impl RoutingServiceFactory for HttpRoutingServiceFactory {
    fn build(&self, config: &TourConfig) -> Result<Arc<dyn RoutingService>, CliError> {
        let service = HttpRoutingService::new(config.osrm_base_url.clone()).map_err(|source| {
            CliError::BuildRoutingService {
                base_url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        Ok(Arc::new(service))
    }
}

pub(crate) fn run_tour_with(
    args: TourArgs,
    factory: &dyn RoutingServiceFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = TourConfig::try_from(merged)?;
    let selection = config.sources.open()?;
    let service = factory.build(&config)?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let (surface_tx, mut surface_rx) = surface_channel();
    let mut controller =
        TourController::new(selection, service, surface_tx, runtime.handle().clone());

    let markers = controller.refresh()?;
    if config.position.is_some() {
        controller.update_location(config.position);
    }
    for handle in [controller.tour_task(), controller.route_to_tour_task()]
        .into_iter()
        .flatten()
    {
        runtime.block_on(handle.wait());
    }
    let mut surface = RouteSurface::new();
    surface.drain(&mut surface_rx);

    for (index, marker) in markers.iter().enumerate() {
        write_line(
            writer,
            &format!(
                "{index}. {} ({}, {})",
                marker.title, marker.location.y, marker.location.x
            ),
        )?;
    }
    write_path(writer, "Tour", surface.path(OutputTarget::Tour))?;
    if config.position.is_some() {
        write_path(writer, "Route to tour", surface.path(OutputTarget::RouteToTour))?;
    }
    for notice in surface.notifications() {
        write_line(writer, notice)?;
    }
    if let Some(index) = config.directions_to {
        let directions = runtime.block_on(controller.directions_to(index))?;
        write_line(writer, &format!("Directions to stop {index}:"))?;
        write_line(writer, &directions.to_string())?;
    }
    controller.shutdown();
    Ok(())
}

fn write_path(
    writer: &mut dyn Write,
    label: &str,
    path: Option<&[Coordinate]>,
) -> Result<(), CliError> {
    match path {
        Some(points) => {
            write_line(writer, &format!("{label}: {} points", points.len()))?;
            for point in points {
                write_line(writer, &format!("  {}, {}", point.y, point.x))?;
            }
            Ok(())
        }
        None => write_line(writer, &format!("{label}: unavailable")),
    }
}

pub(crate) fn run_nearest(args: NearestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = NearestConfig::try_from(merged)?;
    let selection = config.sources.open()?;
    let selected = selection.selected_pois()?;
    let closest = find_closest(config.position, selected.iter().copied())?;
    write_line(writer, &format!("{}\t{}", closest.id, closest.display_name))
}
