use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use geo::Coord;

use crate::Feature;

/// A WGS84 position in degrees, with `x = longitude` and `y = latitude`.
pub type Coordinate = Coord<f64>;

/// Build a [`Coordinate`] from latitude and longitude, in that order.
///
/// # Examples
/// ```
/// use ecotour_core::lat_lon;
///
/// let icics = lat_lon(49.260887, -123.24902);
/// assert_eq!(icics.y, 49.260887);
/// assert_eq!(icics.x, -123.24902);
/// ```
#[must_use]
pub const fn lat_lon(latitude: f64, longitude: f64) -> Coordinate {
    Coord {
        x: longitude,
        y: latitude,
    }
}

/// Identifier of a point of interest, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PoiId(String);

impl PoiId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoiId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PoiId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A site on the walking tour.
///
/// # Examples
/// ```
/// use ecotour_core::{Feature, PointOfInterest, lat_lon};
///
/// let poi = PointOfInterest::new("cirs", "CIRS", lat_lon(49.2621, -123.2531))
///     .with_description("Centre for Interactive Research on Sustainability")
///     .with_features([Feature::SolarEnergy, Feature::RainwaterRecovery]);
///
/// assert_eq!(poi.id.as_str(), "cirs");
/// assert!(poi.has_feature(Feature::SolarEnergy));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointOfInterest {
    /// Unique identifier.
    pub id: PoiId,
    /// Name shown to the visitor.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Geographic position.
    pub location: Coordinate,
    /// Sustainability features exposed by the site.
    pub features: BTreeSet<Feature>,
}

impl PointOfInterest {
    /// Construct a point of interest with no description and no features.
    pub fn new(id: impl Into<PoiId>, display_name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            location,
            features: BTreeSet::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add features to the site.
    #[must_use]
    pub fn with_features<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        self.features.extend(features);
        self
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Whether the site exposes `feature`.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Alphabetical display order.
    ///
    /// Names compare byte-wise, so capitals sort before lower case. Equal
    /// names fall back to the identifier to keep the order total.
    #[must_use]
    pub fn cmp_alphabetical(&self, other: &Self) -> Ordering {
        self.display_name
            .cmp(&other.display_name)
            .then_with(|| self.id.cmp(&other.id))
    }
}
