//! Test helpers for laying out a catalog and selection database on disk.

use super::*;
use std::fs;
use tempfile::TempDir;

/// Three campus sites in tour order.
pub(super) const CAMPUS_CATALOG: &str = r#"{
  "points": [
    {
      "id": "nest",
      "name": "the Nest",
      "description": "Student union building with a green roof",
      "latitude": 49.2665,
      "longitude": -123.25,
      "features": ["LEED Certification", "Solar Energy"]
    },
    {
      "id": "cirs",
      "name": "CIRS",
      "description": "Centre for Interactive Research on Sustainability",
      "latitude": 49.2621,
      "longitude": -123.2531,
      "features": ["Rainwater Recovery", "Solar Energy"]
    },
    {
      "id": "farm",
      "name": "UBC Farm",
      "description": "Working farm on the south campus",
      "latitude": 49.2505,
      "longitude": -123.239,
      "features": ["Sustainable Agriculture"]
    }
  ]
}"#;

/// A temporary directory holding the catalog and the selection database.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) catalog: Utf8PathBuf,
    pub(super) database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let catalog = root.join("catalog.json");
        let database = root.join("state").join("ecotour.db");
        Self {
            _dir: dir,
            catalog,
            database,
        }
    }

    pub(super) fn write_catalog(&self, contents: &str) {
        fs::write(&self.catalog, contents).expect("write catalog");
    }

    /// Command line for `command` against this workspace.
    pub(super) fn argv(&self, command: &str, extra: &[String]) -> Vec<String> {
        let mut argv = vec!["ecotour".to_owned(), command.to_owned()];
        argv.extend([
            format!("--{ARG_CATALOG}"),
            self.catalog.as_str().to_owned(),
            format!("--{ARG_DATABASE}"),
            self.database.as_str().to_owned(),
        ]);
        argv.extend(extra.iter().cloned());
        argv
    }
}

/// Parse `argv` and run the command, capturing standard output.
pub(super) fn run_cli(argv: Vec<String>) -> (Result<(), CliError>, String) {
    let mut buffer = Vec::new();
    let outcome = Cli::try_parse_from(argv)
        .map_err(CliError::from)
        .and_then(|cli| dispatch(cli.command, &mut buffer));
    let stdout = String::from_utf8(buffer).expect("stdout utf-8");
    (outcome, stdout)
}

pub(super) fn split(list: &str) -> Vec<String> {
    list.split(',').map(|item| item.trim().to_owned()).collect()
}
