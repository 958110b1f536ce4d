//! Command-line interface for the Ecotour engine.
//!
//! Every command reads the POI catalog document and the SQLite selection
//! database; `tour` additionally talks to an OSRM server.
#![forbid(unsafe_code)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use ecotour_core::{CatalogSource, PoiCatalog, SelectionManager};
use ecotour_data::{JsonCatalogSource, SqliteKeyValueStore};

mod error;
mod selection;
mod tour;

pub use error::CliError;

use selection::{PoisArgs, SelectArgs, SelectionArgs, run_pois, run_select, run_selection};
use tour::{HttpRoutingServiceFactory, NearestArgs, TourArgs, run_nearest, run_tour_with};

pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_POI: &str = "poi";
pub(crate) const ARG_FEATURE: &str = "feature";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_DIRECTIONS_TO: &str = "directions-to";
pub(crate) const ENV_POIS_CATALOG: &str = "ECOTOUR_CMDS_POIS_CATALOG";
pub(crate) const ENV_SELECT_CATALOG: &str = "ECOTOUR_CMDS_SELECT_CATALOG";
pub(crate) const ENV_SELECT_POI: &str = "ECOTOUR_CMDS_SELECT_POI";
pub(crate) const ENV_SELECTION_CATALOG: &str = "ECOTOUR_CMDS_SELECTION_CATALOG";
pub(crate) const ENV_TOUR_CATALOG: &str = "ECOTOUR_CMDS_TOUR_CATALOG";
pub(crate) const ENV_TOUR_LATITUDE: &str = "ECOTOUR_CMDS_TOUR_LATITUDE";
pub(crate) const ENV_TOUR_LONGITUDE: &str = "ECOTOUR_CMDS_TOUR_LONGITUDE";
pub(crate) const ENV_NEAREST_CATALOG: &str = "ECOTOUR_CMDS_NEAREST_CATALOG";
pub(crate) const ENV_NEAREST_LATITUDE: &str = "ECOTOUR_CMDS_NEAREST_LATITUDE";
pub(crate) const ENV_NEAREST_LONGITUDE: &str = "ECOTOUR_CMDS_NEAREST_LONGITUDE";

/// Selection database used when `--database` is not given.
pub(crate) const DEFAULT_DATABASE: &str = "ecotour.db";

/// Run the Ecotour CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration or the command
/// itself fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Pois(args) => run_pois(args, writer),
        Command::Select(args) => run_select(args, writer),
        Command::Selection(args) => run_selection(args, writer),
        Command::Tour(args) => run_tour_with(args, &HttpRoutingServiceFactory, writer),
        Command::Nearest(args) => run_nearest(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ecotour",
    about = "Plan a sustainability walking tour",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every site with its features and selection state.
    Pois(PoisArgs),
    /// Replace the selection by sites or by features.
    Select(SelectArgs),
    /// Show the selected sites and features.
    Selection(SelectionArgs),
    /// Fetch the walking route through the selected sites.
    Tour(TourArgs),
    /// Find the selected site closest to a position.
    Nearest(NearestArgs),
}

/// Catalog document and selection database resolved for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sources {
    pub(crate) catalog: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl Sources {
    /// Resolve the paths, requiring the catalog and defaulting the database.
    pub(crate) fn resolve(
        catalog: Option<Utf8PathBuf>,
        database: Option<Utf8PathBuf>,
        catalog_env: &'static str,
    ) -> Result<Self, CliError> {
        let catalog = catalog.ok_or(CliError::MissingArgument {
            field: ARG_CATALOG,
            env: catalog_env,
        })?;
        let database = database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        Ok(Self { catalog, database })
    }

    /// Load the catalog and open the selection stored beside it.
    pub(crate) fn open(&self) -> Result<SelectionManager<SqliteKeyValueStore>, CliError> {
        let catalog = load_catalog_strict(&self.catalog)?;
        let store = SqliteKeyValueStore::open(&self.database)?;
        Ok(SelectionManager::new(Arc::new(catalog), store))
    }
}

/// Load a catalog, reporting failures instead of degrading to empty.
fn load_catalog_strict(path: &Utf8Path) -> Result<PoiCatalog, CliError> {
    let pois = JsonCatalogSource::open(path)?.load()?;
    Ok(PoiCatalog::new(pois)?)
}

/// Write one line of command output.
pub(crate) fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
