use super::*;
use crate::lat_lon;
use crate::test_support::MemoryKeyValueStore;
use rstest::{fixture, rstest};

// Solar is shared by "nest" and "cirs"; every other feature sits on one site.
#[fixture]
fn catalog() -> Arc<PoiCatalog> {
    let catalog = PoiCatalog::new(vec![
        PointOfInterest::new("nest", "the Nest", lat_lon(49.2665, -123.2500))
            .with_features([Feature::SolarEnergy, Feature::LeedCertification]),
        PointOfInterest::new("cirs", "CIRS", lat_lon(49.2621, -123.2531))
            .with_features([Feature::SolarEnergy, Feature::RainwaterRecovery]),
        PointOfInterest::new("farm", "UBC Farm", lat_lon(49.2505, -123.2390))
            .with_features([Feature::SustainableAgriculture]),
    ])
    .expect("unique ids");
    Arc::new(catalog)
}

#[fixture]
fn manager(catalog: Arc<PoiCatalog>) -> SelectionManager<MemoryKeyValueStore> {
    SelectionManager::new(catalog, MemoryKeyValueStore::new())
}

fn ids(pois: &[&PointOfInterest]) -> Vec<String> {
    pois.iter().map(|poi| poi.id.to_string()).collect()
}

#[rstest]
fn nothing_persisted_selects_everything(manager: SelectionManager<MemoryKeyValueStore>) {
    let pois = manager.selected_pois().expect("readable");
    assert_eq!(ids(&pois), ["nest", "cirs", "farm"]);
    assert_eq!(
        manager.selected_features().expect("readable"),
        Feature::ALL.to_vec()
    );
}

#[rstest]
fn partial_coverage_drops_shared_feature(mut manager: SelectionManager<MemoryKeyValueStore>) {
    let catalog = Arc::clone(manager.catalog());
    let nest = catalog.lookup(&PoiId::from("nest")).expect("nest");

    manager.set_selected_pois([nest]).expect("persisted");

    assert_eq!(
        manager.selected_features().expect("readable"),
        [Feature::LeedCertification]
    );
}

#[rstest]
fn full_coverage_keeps_shared_feature(mut manager: SelectionManager<MemoryKeyValueStore>) {
    let selection = [PoiId::from("cirs"), PoiId::from("nest")];

    manager.set_selected_poi_ids(&selection).expect("persisted");

    assert_eq!(
        manager.selected_features().expect("readable"),
        [
            Feature::LeedCertification,
            Feature::RainwaterRecovery,
            Feature::SolarEnergy
        ]
    );
    let pois = manager.selected_pois().expect("readable");
    assert_eq!(ids(&pois), ["nest", "cirs"]);
}

#[rstest]
fn empty_selection_persists_empty_lists(mut manager: SelectionManager<MemoryKeyValueStore>) {
    manager
        .set_selected_poi_ids(std::iter::empty())
        .expect("persisted");

    assert!(manager.selected_pois().expect("readable").is_empty());
    assert!(manager.selected_features().expect("readable").is_empty());
}

#[rstest]
fn features_select_every_exposing_site(mut manager: SelectionManager<MemoryKeyValueStore>) {
    manager
        .set_selected_features([Feature::SolarEnergy])
        .expect("persisted");

    let pois = manager.selected_pois().expect("readable");
    assert_eq!(ids(&pois), ["nest", "cirs"]);
    assert_eq!(
        manager.selected_features().expect("readable"),
        [Feature::SolarEnergy]
    );
}

#[rstest]
fn features_are_stored_under_their_own_key(mut manager: SelectionManager<MemoryKeyValueStore>) {
    manager
        .set_selected_features([Feature::SustainableAgriculture])
        .expect("persisted");

    let store = manager.into_store();
    assert_eq!(
        store.raw(SELECTED_POIS_KEY),
        Some(["farm".to_owned()].as_slice())
    );
    assert_eq!(
        store.raw(SELECTED_FEATURES_KEY),
        Some(["Sustainable Agriculture".to_owned()].as_slice())
    );
}

#[rstest]
fn unknown_poi_is_rejected(mut manager: SelectionManager<MemoryKeyValueStore>) {
    let err = manager
        .set_selected_poi_ids(&[PoiId::from("library")])
        .expect_err("library is not in the catalog");

    assert!(matches!(err, SelectionError::UnknownPoi { id } if id.as_str() == "library"));
    assert!(manager.into_store().raw(SELECTED_POIS_KEY).is_none());
}

#[rstest]
fn unparseable_feature_is_corrupt(catalog: Arc<PoiCatalog>) {
    let store = MemoryKeyValueStore::new().with_list(SELECTED_FEATURES_KEY, ["Wind Power"]);
    let manager = SelectionManager::new(catalog, store);

    let err = manager.selected_features().expect_err("corrupt");

    match err {
        SelectionError::CorruptSelection { key, reason } => {
            assert_eq!(key, SELECTED_FEATURES_KEY);
            assert_eq!(
                reason,
                CorruptionReason::UnknownFeature(UnknownFeature {
                    token: "Wind Power".to_owned()
                })
            );
        }
        other => panic!("expected CorruptSelection, got {other:?}"),
    }
}

#[rstest]
fn missing_poi_is_corrupt(catalog: Arc<PoiCatalog>) {
    let store = MemoryKeyValueStore::new().with_list(SELECTED_POIS_KEY, ["nest", "library"]);
    let manager = SelectionManager::new(catalog, store);

    let err = manager.selected_pois().expect_err("corrupt");

    assert!(matches!(
        err,
        SelectionError::CorruptSelection {
            key: SELECTED_POIS_KEY,
            reason: CorruptionReason::MissingPoi(_),
        }
    ));
}

#[rstest]
fn store_failures_propagate(catalog: Arc<PoiCatalog>) {
    let mut manager = SelectionManager::new(catalog, MemoryKeyValueStore::failing());

    assert!(matches!(
        manager.selected_pois(),
        Err(SelectionError::Store(_))
    ));
    assert!(matches!(
        manager.set_selected_features([Feature::Biofuel]),
        Err(SelectionError::Store(_))
    ));
}

#[rstest]
#[case(&["farm"], &[Feature::SustainableAgriculture])]
#[case(&["nest", "farm"], &[Feature::LeedCertification, Feature::SustainableAgriculture])]
#[case(&[], &[])]
fn covered_features_follows_coverage_rule(
    catalog: Arc<PoiCatalog>,
    #[case] selected: &[&str],
    #[case] expected: &[Feature],
) {
    let chosen: HashSet<PoiId> = selected.iter().copied().map(PoiId::from).collect();
    let covered: Vec<_> = covered_features(&catalog, &chosen).into_iter().collect();
    assert_eq!(covered, expected);
}
