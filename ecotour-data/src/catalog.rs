//! JSON catalog document loader.
//!
//! The document lists tour sites in walking order:
//!
//! ```json
//! { "points": [ { "id": "nest", "name": "The Nest", "description": "",
//!                 "latitude": 49.2665, "longitude": -123.25,
//!                 "features": ["Solar Energy"] } ] }
//! ```

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use ecotour_core::{CatalogSource, Feature, PointOfInterest, UnknownFeature, lat_lon};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading or decoding a catalog document.
#[derive(Debug, Error)]
pub enum CatalogDocumentError {
    /// The document could not be read from disk.
    #[error("failed to read catalog document at {path:?}")]
    Open {
        /// Path of the document.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid catalog JSON.
    #[error("failed to parse catalog document")]
    Parse {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A site lists a feature the application does not know.
    #[error("site \"{id}\" lists an unknown feature")]
    UnknownFeature {
        /// Identifier of the offending site.
        id: String,
        /// The rejected token.
        #[source]
        source: UnknownFeature,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    points: Vec<PointRecord>,
}

#[derive(Debug, Deserialize)]
struct PointRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    features: Vec<String>,
}

impl PointRecord {
    fn into_poi(self) -> Result<PointOfInterest, CatalogDocumentError> {
        let features = self
            .features
            .iter()
            .map(|token| token.parse::<Feature>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CatalogDocumentError::UnknownFeature {
                id: self.id.clone(),
                source,
            })?;
        Ok(
            PointOfInterest::new(self.id, self.name, lat_lon(self.latitude, self.longitude))
                .with_description(self.description)
                .with_features(features),
        )
    }
}

/// A [`CatalogSource`] backed by a JSON document.
///
/// # Examples
/// ```
/// use ecotour_core::{CatalogSource, Feature};
/// use ecotour_data::JsonCatalogSource;
///
/// let source = JsonCatalogSource::from_json(
///     r#"{"points": [{"id": "farm", "name": "UBC Farm",
///         "latitude": 49.2505, "longitude": -123.239,
///         "features": ["Sustainable Agriculture"]}]}"#,
/// );
/// let pois = source.load().expect("valid document");
/// assert!(pois[0].has_feature(Feature::SustainableAgriculture));
/// ```
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    document: String,
}

impl JsonCatalogSource {
    /// Wrap an in-memory document.
    pub fn from_json(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    /// Read the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDocumentError::Open`] when the file cannot be read.
    pub fn open(path: &Utf8Path) -> Result<Self, CatalogDocumentError> {
        let open_error = |source| CatalogDocumentError::Open {
            path: path.to_path_buf(),
            source,
        };
        let mut file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(open_error)?;
        let mut document = String::new();
        file.read_to_string(&mut document).map_err(open_error)?;
        Ok(Self { document })
    }
}

impl CatalogSource for JsonCatalogSource {
    type Error = CatalogDocumentError;

    fn load(&self) -> Result<Vec<PointOfInterest>, Self::Error> {
        let document: CatalogDocument = serde_json::from_str(&self.document)
            .map_err(|source| CatalogDocumentError::Parse { source })?;
        document
            .points
            .into_iter()
            .map(PointRecord::into_poi)
            .collect()
    }
}
