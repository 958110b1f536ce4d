//! Keep the selected sites and the selected features consistent.
//!
//! The selection is stored twice: once as site identifiers and once as
//! feature tokens. Setting sites derives the features they fully cover;
//! setting features derives every site exposing one of them. Nothing stored
//! means "everything selected".

mod store;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::{Feature, PoiCatalog, PoiId, PointOfInterest, UnknownFeature};

pub use store::KeyValueStore;

/// Store key holding the selected site identifiers.
pub const SELECTED_POIS_KEY: &str = "SelectedPOI";

/// Store key holding the selected feature tokens.
pub const SELECTED_FEATURES_KEY: &str = "SelectedFeatures";

/// Why a persisted selection could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptionReason {
    /// A stored identifier names no catalog site.
    #[error("point of interest \"{0}\" is not in the catalog")]
    MissingPoi(PoiId),
    /// A stored feature token does not parse.
    #[error(transparent)]
    UnknownFeature(#[from] UnknownFeature),
}

/// Errors raised by [`SelectionManager`].
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A site passed to a setter is not in the catalog.
    #[error("point of interest \"{id}\" is not in the catalog")]
    UnknownPoi {
        /// The unrecognised identifier.
        id: PoiId,
    },
    /// Persisted data references something the current catalog or feature
    /// set does not know.
    #[error("persisted selection under \"{key}\" is corrupt: {reason}")]
    CorruptSelection {
        /// Store key whose contents failed to decode.
        key: &'static str,
        /// What was wrong with the stored value.
        #[source]
        reason: CorruptionReason,
    },
    /// The key-value store failed.
    #[error("selection store failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SelectionError {
    fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}

/// Features fully covered by `selected`.
///
/// A feature is covered when at least one selected site exposes it and no
/// unselected site does.
///
/// # Examples
/// ```
/// use std::collections::HashSet;
/// use ecotour_core::{Feature, PoiCatalog, PoiId, PointOfInterest, covered_features, lat_lon};
///
/// # fn main() -> Result<(), ecotour_core::CatalogError> {
/// let catalog = PoiCatalog::new(vec![
///     PointOfInterest::new("a", "A", lat_lon(0.0, 0.0))
///         .with_features([Feature::Biofuel, Feature::Geothermal]),
///     PointOfInterest::new("b", "B", lat_lon(0.0, 1.0)).with_features([Feature::Geothermal]),
/// ])?;
/// let selected = HashSet::from([PoiId::from("a")]);
///
/// let covered = covered_features(&catalog, &selected);
/// assert!(covered.contains(&Feature::Biofuel));
/// assert!(!covered.contains(&Feature::Geothermal));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn covered_features<S>(catalog: &PoiCatalog, selected: &HashSet<PoiId, S>) -> BTreeSet<Feature>
where
    S: std::hash::BuildHasher,
{
    let (chosen, unchosen): (Vec<_>, Vec<_>) = catalog
        .tour_order()
        .iter()
        .partition(|poi| selected.contains(&poi.id));
    let exposed_elsewhere: BTreeSet<Feature> = unchosen
        .iter()
        .flat_map(|poi| poi.features.iter().copied())
        .collect();
    chosen
        .iter()
        .flat_map(|poi| poi.features.iter().copied())
        .filter(|feature| !exposed_elsewhere.contains(feature))
        .collect()
}

/// Owns the persisted selection for one catalog.
///
/// The catalog is injected so the manager never reaches for global state.
#[derive(Debug)]
pub struct SelectionManager<S> {
    catalog: Arc<PoiCatalog>,
    store: S,
}

impl<S> SelectionManager<S>
where
    S: KeyValueStore,
{
    /// Manage the selection for `catalog`, persisted in `store`.
    pub const fn new(catalog: Arc<PoiCatalog>, store: S) -> Self {
        Self { catalog, store }
    }

    /// The catalog this selection refers to.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<PoiCatalog> {
        &self.catalog
    }

    /// Release the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Select exactly `pois` and the features they fully cover.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownPoi`] if a site is not in the catalog
    /// and [`SelectionError::Store`] if persisting fails.
    pub fn set_selected_pois<'p, I>(&mut self, pois: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = &'p PointOfInterest>,
    {
        self.set_selected_poi_ids(pois.into_iter().map(|poi| &poi.id))
    }

    /// Select the sites named by `ids` and the features they fully cover.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownPoi`] if an identifier is not in the
    /// catalog and [`SelectionError::Store`] if persisting fails.
    pub fn set_selected_poi_ids<'i, I>(&mut self, ids: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = &'i PoiId>,
    {
        let mut selected = HashSet::new();
        for id in ids {
            if !self.catalog.contains(id) {
                return Err(SelectionError::UnknownPoi { id: id.clone() });
            }
            selected.insert(id.clone());
        }
        let features = covered_features(&self.catalog, &selected);
        self.persist(&selected, &features)
    }

    /// Select `features` and every site exposing at least one of them.
    ///
    /// The given features are stored as-is; features that happen to become
    /// fully covered by the derived sites are not added.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Store`] if persisting fails.
    pub fn set_selected_features<I>(&mut self, features: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = Feature>,
    {
        let chosen: BTreeSet<Feature> = features.into_iter().collect();
        let selected: HashSet<PoiId> = chosen
            .iter()
            .flat_map(|&feature| self.catalog.with_feature(feature))
            .map(|poi| poi.id.clone())
            .collect();
        self.persist(&selected, &chosen)
    }

    /// Selected sites in tour order.
    ///
    /// With nothing persisted, every catalog site is selected.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::CorruptSelection`] if a stored identifier is
    /// not in the catalog and [`SelectionError::Store`] if reading fails.
    pub fn selected_pois(&self) -> Result<Vec<&PointOfInterest>, SelectionError> {
        let Some(stored) = self
            .store
            .get_string_list(SELECTED_POIS_KEY)
            .map_err(SelectionError::store)?
        else {
            return Ok(self.catalog.tour_order().iter().collect());
        };

        let mut selected = HashSet::with_capacity(stored.len());
        for token in stored {
            let id = PoiId::from(token);
            if !self.catalog.contains(&id) {
                return Err(SelectionError::CorruptSelection {
                    key: SELECTED_POIS_KEY,
                    reason: CorruptionReason::MissingPoi(id),
                });
            }
            selected.insert(id);
        }
        Ok(self
            .catalog
            .tour_order()
            .iter()
            .filter(|poi| selected.contains(&poi.id))
            .collect())
    }

    /// Selected features in declaration order.
    ///
    /// With nothing persisted, every feature is selected.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::CorruptSelection`] if a stored token does
    /// not name a feature and [`SelectionError::Store`] if reading fails.
    pub fn selected_features(&self) -> Result<Vec<Feature>, SelectionError> {
        let Some(stored) = self
            .store
            .get_string_list(SELECTED_FEATURES_KEY)
            .map_err(SelectionError::store)?
        else {
            return Ok(Feature::ALL.to_vec());
        };

        let features = stored
            .iter()
            .map(|token| token.parse::<Feature>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|err| SelectionError::CorruptSelection {
                key: SELECTED_FEATURES_KEY,
                reason: err.into(),
            })?;
        Ok(features.into_iter().collect())
    }

    /// Write both views in one batch, sites first.
    fn persist(
        &mut self,
        selected: &HashSet<PoiId>,
        features: &BTreeSet<Feature>,
    ) -> Result<(), SelectionError> {
        let ids: Vec<String> = self
            .catalog
            .tour_order()
            .iter()
            .filter(|poi| selected.contains(&poi.id))
            .map(|poi| poi.id.to_string())
            .collect();
        let tokens: Vec<String> = features
            .iter()
            .map(|feature| feature.display_name().to_owned())
            .collect();
        self.store
            .put_string_lists(&[
                (SELECTED_POIS_KEY, ids.as_slice()),
                (SELECTED_FEATURES_KEY, tokens.as_slice()),
            ])
            .map_err(SelectionError::store)
    }
}

#[cfg(test)]
mod tests;
