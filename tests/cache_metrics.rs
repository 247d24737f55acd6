mod support;

use std::collections::HashSet;

use metrics_util::debugging::DebuggingRecorder;
use storefront::{
    cache::{CacheKey, METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL, METRIC_CACHE_WRITE_TOTAL},
    domain::entities::UserRecord,
    infra::cache_warmer::METRIC_CACHE_POPULATE_MS,
};

use support::{InMemoryBackingStore, TestApp};

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = TestApp::new(InMemoryBackingStore::seeded(2, 60), false);
    app.warmer.populate().await.expect("population");

    let hit: Option<UserRecord> = app
        .cache
        .get(&CacheKey::User(1))
        .await
        .expect("cache read");
    assert!(hit.is_some());
    let miss: Option<UserRecord> = app
        .cache
        .get(&CacheKey::User(99))
        .await
        .expect("cache read");
    assert!(miss.is_none());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        METRIC_CACHE_HIT_TOTAL,
        METRIC_CACHE_MISS_TOTAL,
        METRIC_CACHE_WRITE_TOTAL,
        METRIC_CACHE_POPULATE_MS,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
