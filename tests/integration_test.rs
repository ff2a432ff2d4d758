// Integration tests for cobuy
use cobuy_core::{Error, ItemId, Model, Query, RecommendConfig, Recommender};
use cobuy_storage::{ArtifactStore, Manifest, StorageError, BUNDLE_FILE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn write(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_vec(&value).unwrap()).unwrap();
}

/// Artifacts shaped like the upstream exports: float ids, numeric categories.
fn write_artifacts(dir: &Path) {
    write(
        dir,
        "item_similarity.json",
        json!({
            "items": [100.0, 200.0, 300.0, 400.0],
            "rows": [
                [1.0, 0.91, 0.80, 0.95],
                [0.91, 1.0, 0.40, 0.10],
                [0.80, 0.40, 1.0, 0.20],
                [0.95, 0.10, 0.20, 1.0]
            ]
        }),
    );
    write(
        dir,
        "item_to_category.json",
        json!({"100.0": 1051, "200.0": 1051, "300.0": 1051, "400.0": 9, "500.0": 1051}),
    );
    write(
        dir,
        "category_to_items.json",
        json!({"1051": [100, 200, 300, 500], "9": [400]}),
    );
    write(
        dir,
        "events.json",
        json!([
            {"timestamp": 1433221332117u64, "visitorid": 257597, "event": "view", "itemid": 300},
            {"timestamp": 1433224214164u64, "visitorid": 992329, "event": "transaction", "itemid": 300},
            {"timestamp": 1433221999827u64, "visitorid": 111016, "event": "transaction", "itemid": 500},
            {"timestamp": 1433221955914u64, "visitorid": 483574, "event": "addtocart", "itemid": 200}
        ]),
    );
}

fn set_mtime(path: &Path, time: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Replace the event log so that 200 becomes the best seller
fn write_new_events(dir: &Path) {
    write(
        dir,
        "events.json",
        json!([
            {"event": "transaction", "itemid": 200},
            {"event": "transaction", "itemid": 200}
        ]),
    );
}

fn recommender(model: Model) -> Recommender {
    Recommender::new(Arc::new(model), RecommendConfig::default())
}

#[test]
fn test_load_and_recommend() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let model = ArtifactStore::new(temp_dir.path()).load().unwrap();
    assert_eq!(model.similarity().len(), 4);

    let r = recommender(model);
    let rec = r.recommend(&Query::new(ItemId::new(100))).unwrap();

    assert_eq!(rec.selected_item, ItemId::new(100));
    // 400 is more similar but belongs to another category
    assert_eq!(rec.items_bought_together, vec![ItemId::new(200), ItemId::new(300)]);
    // 500 has a purchase but is missing from the matrix
    assert_eq!(
        rec.similar_items_in_category,
        vec![ItemId::new(300), ItemId::new(200)]
    );
}

#[test]
fn test_null_category_loads_as_uncategorised() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());
    write(
        temp_dir.path(),
        "item_to_category.json",
        json!({"100.0": 1051, "200.0": null, "300.0": 1051, "400.0": 9}),
    );

    let model = ArtifactStore::new(temp_dir.path()).load().unwrap();
    assert_eq!(model.catalog().category_of(ItemId::new(200)), None);

    let r = recommender(model);
    // 200 is still listed under 1051 but carries no category of its own
    let rec = r.recommend(&Query::new(ItemId::new(100))).unwrap();
    assert_eq!(rec.items_bought_together, vec![ItemId::new(300)]);

    let rec = r.recommend(&Query::new(ItemId::new(200))).unwrap();
    assert_eq!(rec.items_bought_together, vec![ItemId::new(100)]);
    assert!(rec.similar_items_in_category.is_empty());
}

#[test]
fn test_unknown_item_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let r = recommender(ArtifactStore::new(temp_dir.path()).load().unwrap());
    let err = r.recommend(&Query::new(ItemId::new(500)));
    assert!(matches!(err, Err(Error::ItemNotFound(_))));

    // the unchecked path still answers from the category tables
    let rec = r.select(ItemId::new(500), 5, 0.75);
    assert!(rec.items_bought_together.is_empty());
    assert_eq!(rec.similar_items_in_category.len(), 3);
}

#[test]
fn test_missing_artifact() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());
    std::fs::remove_file(temp_dir.path().join("category_to_items.json")).unwrap();

    match ArtifactStore::new(temp_dir.path()).load() {
        Err(StorageError::NotFound(path)) => assert!(path.ends_with("category_to_items.json")),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("load should fail without category_to_items.json"),
    }
}

#[test]
fn test_ragged_matrix_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());
    write(
        temp_dir.path(),
        "item_similarity.json",
        json!({"items": [1, 2], "rows": [[1.0, 0.5], [0.5]]}),
    );

    let err = ArtifactStore::new(temp_dir.path()).load();
    assert!(matches!(
        err,
        Err(StorageError::Model(Error::InvalidMatrix(_)))
    ));
}

#[test]
fn test_manifest_verification() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let manifest = Manifest::generate(temp_dir.path()).unwrap();
    assert_eq!(manifest.files.len(), 4);
    manifest.write(temp_dir.path()).unwrap();
    assert!(ArtifactStore::new(temp_dir.path()).load_sources().is_ok());

    write(temp_dir.path(), "events.json", json!([]));
    let err = ArtifactStore::new(temp_dir.path()).load_sources();
    assert!(matches!(err, Err(StorageError::ChecksumMismatch { .. })));
}

#[test]
fn test_bundle_survives_restart() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let store = ArtifactStore::new(temp_dir.path());
    let model = store.load().unwrap();
    store.save_bundle(&model).unwrap();
    let expected = recommender(model).recommend(&Query::new(ItemId::new(100))).unwrap();

    // Without the sources only the bundle can answer
    for name in [
        "item_similarity.json",
        "item_to_category.json",
        "category_to_items.json",
        "events.json",
    ] {
        std::fs::remove_file(temp_dir.path().join(name)).unwrap();
    }

    let restored = ArtifactStore::new(temp_dir.path()).load().unwrap();
    let actual = recommender(restored).recommend(&Query::new(ItemId::new(100))).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_stale_bundle_is_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let store = ArtifactStore::new(temp_dir.path());
    store.save_bundle(&store.load().unwrap()).unwrap();

    write_new_events(temp_dir.path());
    set_mtime(
        &temp_dir.path().join("events.json"),
        SystemTime::now() + Duration::from_secs(60),
    );

    let model = store.load().unwrap();
    assert_eq!(model.purchases().get(ItemId::new(200)), 2);
    assert_eq!(model.purchases().get(ItemId::new(300)), 0);
}

#[test]
fn test_bundle_with_same_mtime_as_source_is_stale() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let store = ArtifactStore::new(temp_dir.path());
    store.save_bundle(&store.load().unwrap()).unwrap();

    // coarse timestamps: both files land in the same tick
    write_new_events(temp_dir.path());
    let tick = SystemTime::now() - Duration::from_secs(5);
    for name in ["item_similarity.json", "item_to_category.json", "category_to_items.json"] {
        set_mtime(&temp_dir.path().join(name), tick - Duration::from_secs(60));
    }
    set_mtime(&temp_dir.path().join("events.json"), tick);
    set_mtime(&temp_dir.path().join(BUNDLE_FILE), tick);

    let model = store.load().unwrap();
    assert_eq!(model.purchases().get(ItemId::new(200)), 2);
}

#[test]
fn test_newer_manifest_invalidates_bundle() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_artifacts(temp_dir.path());

    let store = ArtifactStore::new(temp_dir.path());
    store.save_bundle(&store.load().unwrap()).unwrap();

    // a republished artifact set whose copies kept their old mtimes
    write_new_events(temp_dir.path());
    Manifest::generate(temp_dir.path())
        .unwrap()
        .write(temp_dir.path())
        .unwrap();
    let now = SystemTime::now();
    for name in [
        "item_similarity.json",
        "item_to_category.json",
        "category_to_items.json",
        "events.json",
    ] {
        set_mtime(&temp_dir.path().join(name), now - Duration::from_secs(3600));
    }
    set_mtime(&temp_dir.path().join(BUNDLE_FILE), now - Duration::from_secs(60));
    set_mtime(&temp_dir.path().join("manifest.json"), now);

    let model = store.load().unwrap();
    assert_eq!(model.purchases().get(ItemId::new(200)), 2);

    // once the manifest is older again the bundle wins
    set_mtime(&temp_dir.path().join("manifest.json"), now - Duration::from_secs(3600));
    let model = store.load().unwrap();
    assert_eq!(model.purchases().get(ItemId::new(200)), 0);
}

/// Randomised tables: every answer must respect the selection invariants.
#[test]
fn test_selection_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 60;
    let categories = ["a", "b", "c"];

    let items: Vec<u64> = (0..n).map(|i| 1000 + i as u64).collect();
    let mut rows = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        rows[i][i] = 1.0;
        for j in (i + 1)..n {
            let s: f64 = rng.random_range(-1.0..=1.0);
            rows[i][j] = s;
            rows[j][i] = s;
        }
    }

    let mut item_to_category = serde_json::Map::new();
    let mut category_to_items: std::collections::HashMap<&str, Vec<u64>> = Default::default();
    // some categorised items are off the matrix axis
    for id in items.iter().copied().chain(5000..5010) {
        if rng.random_bool(0.9) {
            let c = categories[rng.random_range(0..categories.len())];
            item_to_category.insert(id.to_string(), json!(c));
            category_to_items.entry(c).or_default().push(id);
        }
    }

    let mut events = Vec::new();
    for _ in 0..400 {
        let id = if rng.random_bool(0.8) {
            items[rng.random_range(0..n)]
        } else {
            rng.random_range(5000..5010)
        };
        let kind = if rng.random_bool(0.3) { "transaction" } else { "view" };
        events.push(json!({"itemid": id, "event": kind}));
    }

    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    write(dir, "item_similarity.json", json!({"items": items, "rows": rows}));
    write(dir, "item_to_category.json", serde_json::Value::Object(item_to_category));
    write(dir, "category_to_items.json", json!(category_to_items));
    write(dir, "events.json", serde_json::Value::Array(events));

    let r = recommender(ArtifactStore::new(dir).load().unwrap());
    let model = r.model().clone();

    for &raw in &items {
        let query = ItemId::new(raw);
        for (top_n, threshold) in [(5, 0.75), (3, 0.0), (10, -1.0), (0, 0.5)] {
            let rec = r.select(query, top_n, threshold);
            let category = model.catalog().category_of(query);

            assert!(rec.items_bought_together.len() <= top_n);
            assert!(rec.similar_items_in_category.len() <= 4);
            assert!(!rec.items_bought_together.contains(&query));
            assert!(!rec.similar_items_in_category.contains(&query));

            let scores: Vec<f64> = rec
                .items_bought_together
                .iter()
                .map(|id| model.similarity().get(query, *id).unwrap())
                .collect();
            assert!(scores.iter().all(|s| *s >= threshold));
            assert!(scores.windows(2).all(|w| w[0] >= w[1]));

            if let Some(category) = category {
                assert!(rec
                    .items_bought_together
                    .iter()
                    .all(|id| model.catalog().category_of(*id) == Some(category)));
            } else {
                assert!(rec.similar_items_in_category.is_empty());
            }

            assert!(rec
                .similar_items_in_category
                .iter()
                .all(|id| model.contains(*id)));
            let counts: Vec<u64> = rec
                .similar_items_in_category
                .iter()
                .map(|id| model.purchases().get(*id))
                .collect();
            assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
