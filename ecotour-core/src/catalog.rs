//! The immutable set of tour sites.
//!
//! A [`PoiCatalog`] is built once from a [`CatalogSource`] and shared by
//! reference-counted pointer with every consumer. Declaration order is the
//! walking-tour order.

use std::collections::HashMap;

use log::error;
use thiserror::Error;

use crate::{Feature, PoiId, PointOfInterest};

/// Errors returned by [`PoiCatalog::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two sites share an identifier.
    #[error("point of interest id \"{id}\" is declared more than once")]
    DuplicateId {
        /// The repeated identifier.
        id: PoiId,
    },
}

/// Supplies the sites that seed a catalog, in tour order.
pub trait CatalogSource {
    /// Failure raised while reading or decoding the source.
    type Error: std::error::Error;

    /// Read every site from the source.
    fn load(&self) -> Result<Vec<PointOfInterest>, Self::Error>;
}

/// Immutable collection of points of interest in walking-tour order.
///
/// # Examples
/// ```
/// use ecotour_core::{Feature, PoiCatalog, PointOfInterest, lat_lon};
///
/// # fn main() -> Result<(), ecotour_core::CatalogError> {
/// let catalog = PoiCatalog::new(vec![
///     PointOfInterest::new("b", "beta", lat_lon(0.0, 1.0)),
///     PointOfInterest::new("a", "Alpha", lat_lon(0.0, 0.0))
///         .with_features([Feature::Biofuel]),
/// ])?;
///
/// assert_eq!(catalog.tour_order()[0].id.as_str(), "b");
/// assert_eq!(catalog.alphabetical()[0].id.as_str(), "a");
/// assert_eq!(catalog.with_feature(Feature::Biofuel).count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoiCatalog {
    pois: Vec<PointOfInterest>,
    positions: HashMap<PoiId, usize>,
}

impl PoiCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(pois: Vec<PointOfInterest>) -> Result<Self, CatalogError> {
        let mut positions = HashMap::with_capacity(pois.len());
        for (position, poi) in pois.iter().enumerate() {
            if positions.insert(poi.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId { id: poi.id.clone() });
            }
        }
        Ok(Self { pois, positions })
    }

    /// A catalog with no sites.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pois.len()
    }

    /// Whether the catalog has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Look up a site by identifier.
    #[must_use]
    pub fn lookup(&self, id: &PoiId) -> Option<&PointOfInterest> {
        self.positions.get(id).and_then(|&index| self.pois.get(index))
    }

    /// Whether `id` names a site in this catalog.
    #[must_use]
    pub fn contains(&self, id: &PoiId) -> bool {
        self.positions.contains_key(id)
    }

    /// Sites in walking-tour order.
    #[must_use]
    pub fn tour_order(&self) -> &[PointOfInterest] {
        &self.pois
    }

    /// Sites sorted by display name, capitals first.
    #[must_use]
    pub fn alphabetical(&self) -> Vec<&PointOfInterest> {
        let mut sorted: Vec<_> = self.pois.iter().collect();
        sorted.sort_by(|a, b| a.cmp_alphabetical(b));
        sorted
    }

    /// Sites exposing `feature`, in tour order.
    pub fn with_feature(&self, feature: Feature) -> impl Iterator<Item = &PointOfInterest> + '_ {
        self.pois.iter().filter(move |poi| poi.has_feature(feature))
    }
}

/// Load a catalog from `source`, degrading to an empty catalog on failure.
///
/// Read, decode and validation errors are logged rather than returned;
/// callers treat an empty catalog as valid input.
pub fn load_catalog<S>(source: &S) -> PoiCatalog
where
    S: CatalogSource + ?Sized,
{
    let pois = match source.load() {
        Ok(pois) => pois,
        Err(err) => {
            error!("failed to load POI catalog: {err}");
            return PoiCatalog::empty();
        }
    };
    PoiCatalog::new(pois).unwrap_or_else(|err| {
        error!("rejected POI catalog: {err}");
        PoiCatalog::empty()
    })
}
