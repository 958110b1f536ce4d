use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|&value| value.to_owned()).collect()
}

#[fixture]
fn store() -> SqliteKeyValueStore {
    SqliteKeyValueStore::open_in_memory().expect("in-memory store")
}

#[fixture]
fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn db_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path")
}

#[rstest]
fn absent_key_differs_from_empty_list(mut store: SqliteKeyValueStore) {
    assert_eq!(store.get_string_list("SelectedPOI").expect("read"), None);

    store.put_string_list("SelectedPOI", &[]).expect("write");

    assert_eq!(
        store.get_string_list("SelectedPOI").expect("read"),
        Some(Vec::new())
    );
}

#[rstest]
fn values_keep_their_order(mut store: SqliteKeyValueStore) {
    let values = strings(&["farm", "nest", "cirs"]);

    store.put_string_list("SelectedPOI", &values).expect("write");

    assert_eq!(
        store.get_string_list("SelectedPOI").expect("read"),
        Some(values)
    );
}

#[rstest]
fn rewriting_replaces_the_whole_list(mut store: SqliteKeyValueStore) {
    store
        .put_string_list("SelectedPOI", &strings(&["nest", "cirs", "farm"]))
        .expect("write");
    store
        .put_string_list("SelectedPOI", &strings(&["farm"]))
        .expect("rewrite");

    assert_eq!(
        store.get_string_list("SelectedPOI").expect("read"),
        Some(strings(&["farm"]))
    );
}

#[rstest]
fn batches_write_every_key(mut store: SqliteKeyValueStore) {
    let pois = strings(&["farm"]);
    let features = strings(&["Sustainable Agriculture"]);

    store
        .put_string_lists(&[("SelectedPOI", &pois), ("SelectedFeatures", &features)])
        .expect("write");

    assert_eq!(store.get_string_list("SelectedPOI").expect("read"), Some(pois));
    assert_eq!(
        store.get_string_list("SelectedFeatures").expect("read"),
        Some(features)
    );
}

#[rstest]
fn lists_survive_reopening(temp_dir: TempDir) {
    let path = db_path(&temp_dir, "nested/selection.db");
    {
        let mut store = SqliteKeyValueStore::open(&path).expect("open");
        store
            .put_string_list("SelectedFeatures", &strings(&["Biofuel"]))
            .expect("write");
    }

    let reopened = SqliteKeyValueStore::open(&path).expect("reopen");

    assert_eq!(
        reopened.get_string_list("SelectedFeatures").expect("read"),
        Some(strings(&["Biofuel"]))
    );
}

#[rstest]
fn parent_that_is_a_file_reports_create_directory(temp_dir: TempDir) {
    let blocker = db_path(&temp_dir, "blocker");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");

    let err = SqliteKeyValueStore::open(&blocker.join("selection.db"))
        .expect_err("parent is a regular file");

    assert!(matches!(
        err,
        SqliteKeyValueStoreError::CreateDirectory { path, .. } if path == blocker
    ));
}

/// Path to `dir` spelled through the crate directory's parent, relative to
/// the working directory `cargo test` runs in.
fn through_parent(dir: &TempDir) -> Utf8PathBuf {
    let manifest = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    let crate_name = manifest.file_name().expect("crate directory name");
    let temp_name = dir
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .expect("utf-8 temp dir name");
    Utf8PathBuf::from("..").join(crate_name).join(temp_name)
}

#[rstest]
#[case::existing_parent("selection.db")]
#[case::missing_parent("fresh/selection.db")]
fn parent_reached_through_dot_dot_opens(#[case] name: &str) {
    let manifest = Utf8Path::new(env!("CARGO_MANIFEST_DIR"));
    let dir = tempfile::tempdir_in(manifest).expect("temp dir in crate");
    let path = through_parent(&dir).join(name);

    let mut store = SqliteKeyValueStore::open(&path).expect("open through ..");
    store
        .put_string_list("SelectedPOI", &strings(&["nest"]))
        .expect("write");

    assert_eq!(
        store.get_string_list("SelectedPOI").expect("read"),
        Some(strings(&["nest"]))
    );
    assert!(dir.path().join(name).exists());
}
