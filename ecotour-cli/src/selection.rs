//! Catalog and selection commands: `pois`, `select` and `selection`.

use std::collections::HashSet;
use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ecotour_core::{Feature, KeyValueStore, PoiId, PointOfInterest, SelectionManager};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CATALOG, ARG_DATABASE, ARG_FEATURE, ARG_POI, CliError, ENV_POIS_CATALOG,
    ENV_SELECT_CATALOG, ENV_SELECT_POI, ENV_SELECTION_CATALOG, Sources, write_line,
};

/// CLI arguments for the `pois` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "pois", about = "List every site with its features")]
#[ortho_config(prefix = "ECOTOUR")]
pub(crate) struct PoisArgs {
    /// Path to the JSON catalog document.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to the SQLite selection database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `select` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "select",
    long_about = "Replace the selection. Either list site identifiers with \
                 --poi, keeping only features every exposing site covers, or \
                 list feature names with --feature, selecting every site \
                 that exposes one of them. Lists are comma-separated.",
    about = "Replace the selection by sites or by features"
)]
#[ortho_config(prefix = "ECOTOUR")]
pub(crate) struct SelectArgs {
    /// Path to the JSON catalog document.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to the SQLite selection database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Comma-separated site identifiers, in any order.
    #[arg(long = ARG_POI, value_name = "ids")]
    #[serde(default)]
    pub(crate) poi: Option<String>,
    /// Comma-separated feature display names.
    #[arg(long = ARG_FEATURE, value_name = "names")]
    #[serde(default)]
    pub(crate) feature: Option<String>,
}

/// CLI arguments for the `selection` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "selection", about = "Show the selected sites and features")]
#[ortho_config(prefix = "ECOTOUR")]
pub(crate) struct SelectionArgs {
    /// Path to the JSON catalog document.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Path to the SQLite selection database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// What `select` replaces the selection with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectionChange {
    Sites(Vec<PoiId>),
    Features(Vec<Feature>),
}

/// Resolved `select` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectConfig {
    pub(crate) sources: Sources,
    pub(crate) change: SelectionChange,
}

impl TryFrom<SelectArgs> for SelectConfig {
    type Error = CliError;

    fn try_from(args: SelectArgs) -> Result<Self, Self::Error> {
        let sources = Sources::resolve(args.catalog, args.database, ENV_SELECT_CATALOG)?;
        let change = match (args.poi, args.feature) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_POI,
                    second: ARG_FEATURE,
                });
            }
            (Some(ids), None) => SelectionChange::Sites(split_list(&ids).map(PoiId::from).collect()),
            (None, Some(names)) => SelectionChange::Features(
                split_list(&names)
                    .map(str::parse::<Feature>)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (None, None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_POI,
                    env: ENV_SELECT_POI,
                });
            }
        };
        Ok(Self { sources, change })
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

pub(crate) fn run_pois(args: PoisArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let sources = Sources::resolve(merged.catalog, merged.database, ENV_POIS_CATALOG)?;
    let manager = sources.open()?;
    let selected: HashSet<&PoiId> = manager
        .selected_pois()?
        .into_iter()
        .map(|poi| &poi.id)
        .collect();
    for poi in manager.catalog().alphabetical() {
        let mark = if selected.contains(&poi.id) { "[x]" } else { "[ ]" };
        write_line(
            writer,
            &format!("{mark} {}\t{}\t{}", poi.id, poi.display_name, feature_list(poi)),
        )?;
    }
    Ok(())
}

pub(crate) fn run_select(args: SelectArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = SelectConfig::try_from(merged)?;
    let mut manager = config.sources.open()?;
    match &config.change {
        SelectionChange::Sites(ids) => manager.set_selected_poi_ids(ids)?,
        SelectionChange::Features(features) => {
            manager.set_selected_features(features.iter().copied())?;
        }
    }
    write_selection(&manager, writer)
}

pub(crate) fn run_selection(args: SelectionArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let sources = Sources::resolve(merged.catalog, merged.database, ENV_SELECTION_CATALOG)?;
    let manager = sources.open()?;
    write_selection(&manager, writer)
}

fn write_selection<S: KeyValueStore>(
    manager: &SelectionManager<S>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    write_line(writer, "Sites:")?;
    for poi in manager.selected_pois()? {
        write_line(writer, &format!("  {}\t{}", poi.id, poi.display_name))?;
    }
    write_line(writer, "Features:")?;
    for feature in manager.selected_features()? {
        write_line(writer, &format!("  {feature}"))?;
    }
    Ok(())
}

fn feature_list(poi: &PointOfInterest) -> String {
    poi.features
        .iter()
        .map(|feature| feature.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}
