//! Error types emitted by the Ecotour CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use ecotour_core::{
    CatalogError, DirectionsError, ProximityError, SelectionError, UnknownFeature,
};
use ecotour_data::{CatalogDocumentError, ProviderBuildError, SqliteKeyValueStoreError};
use thiserror::Error;

/// Errors emitted by the Ecotour CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Two options that exclude each other were both given.
    #[error("--{first} and --{second} cannot be combined")]
    ConflictingArguments {
        first: &'static str,
        second: &'static str,
    },
    /// The catalog document could not be read or decoded.
    #[error("failed to load the POI catalog: {0}")]
    LoadCatalog(#[from] CatalogDocumentError),
    /// The catalog document decoded but is not a valid catalog.
    #[error("invalid POI catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),
    /// Opening the selection database failed.
    #[error("failed to open the selection database: {0}")]
    OpenStore(#[from] SqliteKeyValueStoreError),
    /// A `--feature` entry names no known feature.
    #[error(transparent)]
    UnknownFeature(#[from] UnknownFeature),
    /// Reading or writing the selection failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The nearest-site search had nothing to search.
    #[error("no site is selected: {0}")]
    Proximity(#[from] ProximityError),
    /// Constructing the routing service failed.
    #[error("failed to build routing service for {base_url:?}: {source}")]
    BuildRoutingService {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Building the async runtime failed.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Directions could not be produced.
    #[error(transparent)]
    Directions(#[from] DirectionsError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
