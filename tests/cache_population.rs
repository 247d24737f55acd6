mod support;

use storefront::{
    application::maintenance::MaintenanceService,
    cache::CacheKey,
    domain::entities::{CachedComment, ProductRecord, PurchasedProduct, UserRecord},
    domain::reset::{ResetBaseline, ResetSummary},
    infra::cache_warmer::{CacheWarmError, StepOutcome, WarmStep},
};

use support::{InMemoryBackingStore, TestApp};

fn small_backing() -> InMemoryBackingStore {
    let backing = InMemoryBackingStore::seeded(3, 120);
    backing.insert_comment(1, 1, 2, "a");
    backing.insert_comment(2, 1, 3, "b");
    backing.insert_comment(3, 110, 1, "c");
    backing.insert_history(1, 3, 1);
    backing.insert_history(2, 5, 1);
    backing.insert_history(3, 9, 2);
    backing
}

#[tokio::test]
async fn population_writes_every_view() {
    let app = TestApp::new(small_backing(), false);

    let report = app.warmer.populate().await.expect("population");

    assert_eq!(
        report.outcome(WarmStep::CatalogPages),
        Some(StepOutcome::Written(200))
    );
    assert_eq!(
        report.outcome(WarmStep::ProductComments),
        Some(StepOutcome::Written(2))
    );
    assert_eq!(report.outcome(WarmStep::Users), Some(StepOutcome::Written(3)));
    assert_eq!(
        report.outcome(WarmStep::Products),
        Some(StepOutcome::Written(120))
    );
    assert_eq!(
        report.outcome(WarmStep::UserBuyHistories),
        Some(StepOutcome::Written(2))
    );
    assert_eq!(report.entries_written(), 327);
}

#[tokio::test]
async fn catalog_pages_cover_sparse_id_space() {
    let app = TestApp::new(small_backing(), false);
    app.warmer.populate().await.expect("population");

    let newest: Vec<ProductRecord> = app
        .cache
        .get(&CacheKey::CatalogPage(0))
        .await
        .expect("cache read")
        .expect("page 0 is written even when empty");
    assert!(newest.is_empty());

    let partial: Vec<ProductRecord> = app
        .cache
        .get(&CacheKey::CatalogPage(197))
        .await
        .expect("cache read")
        .expect("page 197");
    let ids: Vec<i64> = partial.iter().map(|product| product.id).collect();
    assert_eq!(ids, (101..=120).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn grouped_lists_keep_newest_first() {
    let app = TestApp::new(small_backing(), false);
    app.warmer.populate().await.expect("population");

    let comments: Vec<CachedComment> = app
        .cache
        .get(&CacheKey::ProductComments(1))
        .await
        .expect("cache read")
        .expect("comments of product 1");
    let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["b", "a"]);
    assert_eq!(comments[0].user_name, "user3");
    assert_eq!(comments[0].id, Some(2));

    let history: Vec<PurchasedProduct> = app
        .cache
        .get(&CacheKey::UserBuyHistories(1))
        .await
        .expect("cache read")
        .expect("history of user 1");
    let ids: Vec<i64> = history.iter().map(|product| product.id).collect();
    assert_eq!(ids, vec![5, 3]);

    assert!(
        !app.cache
            .contains(&CacheKey::UserBuyHistories(3))
            .await
            .expect("cache read")
    );
}

#[tokio::test]
async fn present_guard_skips_only_its_step() {
    let app = TestApp::new(small_backing(), false);
    let placeholder = support::user(1);
    app.cache
        .set(&CacheKey::User(1), &placeholder)
        .await
        .expect("seed guard");

    let report = app.warmer.populate().await.expect("population");

    assert_eq!(report.outcome(WarmStep::Users), Some(StepOutcome::Skipped));
    assert_eq!(
        report.outcome(WarmStep::Products),
        Some(StepOutcome::Written(120))
    );
    let missing: Option<UserRecord> = app
        .cache
        .get(&CacheKey::User(2))
        .await
        .expect("cache read");
    assert!(missing.is_none());
}

#[tokio::test]
async fn backing_store_failure_aborts_population() {
    let app = TestApp::new(small_backing(), false);
    app.backing.fail_reads(true);

    let err = app
        .warmer
        .populate()
        .await
        .expect_err("population should fail");
    assert!(matches!(
        err,
        CacheWarmError::Load {
            step: "catalog pages",
            ..
        }
    ));
    assert!(app.cache_store.is_empty());

    app.backing.fail_reads(false);
    app.warmer.populate().await.expect("retry succeeds");
    assert!(
        app.cache
            .contains(&CacheKey::Product(120))
            .await
            .expect("cache read")
    );
}

#[tokio::test]
async fn initialize_trims_to_baseline_then_populates() {
    let app = TestApp::new(small_backing(), false);
    let maintenance = MaintenanceService::new(app.repos.maintenance.clone(), app.warmer.clone())
        .with_baseline(ResetBaseline {
            max_user_id: 2,
            max_product_id: 100,
            max_comment_id: 2,
            max_history_id: 2,
        });

    let report = maintenance.initialize().await.expect("initialize");

    assert_eq!(
        report.reset,
        ResetSummary {
            users: 1,
            products: 20,
            comments: 1,
            histories: 1,
        }
    );
    assert_eq!(
        report.warm.outcome(WarmStep::Products),
        Some(StepOutcome::Written(100))
    );
    assert_eq!(
        report.warm.outcome(WarmStep::ProductComments),
        Some(StepOutcome::Written(1))
    );
    assert!(
        !app.cache
            .contains(&CacheKey::User(3))
            .await
            .expect("cache read")
    );
    maintenance.health_check().await.expect("health check");
}

#[tokio::test]
async fn reset_alone_leaves_the_cache_untouched() {
    let app = TestApp::new(small_backing(), false);
    app.backing.insert_user(support::user(5_001));
    let maintenance = MaintenanceService::new(app.repos.maintenance.clone(), app.warmer.clone());

    let summary = maintenance.reset().await.expect("reset");

    assert_eq!(summary.users, 1);
    assert!(!app.backing.has_user(5_001));
    assert!(app.cache_store.is_empty());
}
