#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use storefront::{
    application::repos::{
        CommentsRepo, CreateCommentParams, HistoriesRepo, MaintenanceRepo, ProductsRepo,
        RecordPurchaseParams, RepoError, RepositorySet, UsersRepo,
    },
    cache::{CacheClient, CacheConfig, MemoryCacheStore},
    domain::{
        catalog::CatalogPage,
        entities::{
            AuthoredComment, CommentRecord, HistoryRecord, ProductRecord, PurchasedProduct,
            UserPurchase, UserRecord,
        },
        reset::{ResetBaseline, ResetSummary},
    },
    infra::{
        cache_warmer::CacheWarmer,
        http::{HttpState, build_router, session},
    },
};
use time::macros::datetime;

pub const SESSION_SECRET: &str = "integration-test-session-secret";

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, UserRecord>,
    products: BTreeMap<i64, ProductRecord>,
    comments: BTreeMap<i64, CommentRecord>,
    histories: BTreeMap<i64, HistoryRecord>,
}

/// Backing store kept in process memory, mirroring the Postgres adapter's query semantics.
#[derive(Debug, Default)]
pub struct InMemoryBackingStore {
    tables: Mutex<Tables>,
    fail_reads: AtomicBool,
}

impl InMemoryBackingStore {
    /// Users `1..=users` and products `1..=products`, with no comments or purchases.
    pub fn seeded(users: i64, products: i64) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().expect("lock");
            for id in 1..=users {
                tables.users.insert(id, user(id));
            }
            for id in 1..=products {
                tables.products.insert(id, product(id));
            }
        }
        store
    }

    pub fn insert_user(&self, record: UserRecord) {
        self.tables
            .lock()
            .expect("lock")
            .users
            .insert(record.id, record);
    }

    pub fn insert_comment(&self, id: i64, product_id: i64, user_id: i64, content: &str) {
        self.tables.lock().expect("lock").comments.insert(
            id,
            CommentRecord {
                id,
                product_id,
                user_id,
                content: content.to_string(),
                created_at: datetime!(2016-08-01 10:00:00),
            },
        );
    }

    pub fn insert_history(&self, id: i64, product_id: i64, user_id: i64) {
        self.tables.lock().expect("lock").histories.insert(
            id,
            HistoryRecord {
                id,
                product_id,
                user_id,
                created_at: datetime!(2016-08-01 10:00:00),
            },
        );
    }

    pub fn histories(&self) -> Vec<HistoryRecord> {
        self.tables
            .lock()
            .expect("lock")
            .histories
            .values()
            .cloned()
            .collect()
    }

    pub fn comment_count(&self) -> usize {
        self.tables.lock().expect("lock").comments.len()
    }

    pub fn comment_count_for(&self, product_id: i64) -> usize {
        self.tables
            .lock()
            .expect("lock")
            .comments
            .values()
            .filter(|comment| comment.product_id == product_id)
            .count()
    }

    pub fn has_user(&self, id: i64) -> bool {
        self.tables.lock().expect("lock").users.contains_key(&id)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), RepoError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("backing store unavailable"));
        }
        Ok(())
    }
}

pub fn user(id: i64) -> UserRecord {
    UserRecord {
        id,
        name: format!("user{id}"),
        email: format!("user{id}@example.com"),
        password: format!("password{id}"),
    }
}

pub fn product(id: i64) -> ProductRecord {
    ProductRecord {
        id,
        name: format!("product {id}"),
        image_path: format!("/image/{id}.jpg"),
        price: (id % 100) as i32 * 10,
        description: format!("description of product {id}"),
    }
}

fn purchased(product: &ProductRecord, history: &HistoryRecord) -> PurchasedProduct {
    PurchasedProduct {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        image_path: product.image_path.clone(),
        price: product.price,
        created_at: history.created_at,
    }
}

#[async_trait]
impl UsersRepo for InMemoryBackingStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .expect("lock")
            .users
            .values()
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .expect("lock")
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

#[async_trait]
impl ProductsRepo for InMemoryBackingStore {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .expect("lock")
            .products
            .values()
            .cloned()
            .collect())
    }

    async fn list_catalog_page(&self, page: CatalogPage) -> Result<Vec<ProductRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .expect("lock")
            .products
            .range(page.ids())
            .rev()
            .map(|(_, product)| product.clone())
            .collect())
    }
}

#[async_trait]
impl CommentsRepo for InMemoryBackingStore {
    async fn list_authored_comments(&self) -> Result<Vec<AuthoredComment>, RepoError> {
        self.check_reads()?;
        let tables = self.tables.lock().expect("lock");
        let mut rows: Vec<AuthoredComment> = tables
            .comments
            .values()
            .filter(|comment| tables.products.contains_key(&comment.product_id))
            .filter_map(|comment| {
                tables.users.get(&comment.user_id).map(|author| AuthoredComment {
                    comment: comment.clone(),
                    user_name: author.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            a.comment
                .product_id
                .cmp(&b.comment.product_id)
                .then(b.comment.id.cmp(&a.comment.id))
        });
        Ok(rows)
    }

    async fn create_comment(&self, params: CreateCommentParams) -> Result<i64, RepoError> {
        let mut tables = self.tables.lock().expect("lock");
        let id = tables.comments.keys().next_back().copied().unwrap_or(0) + 1;
        tables.comments.insert(
            id,
            CommentRecord {
                id,
                product_id: params.product_id,
                user_id: params.user_id,
                content: params.content,
                created_at: params.created_at,
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl HistoriesRepo for InMemoryBackingStore {
    async fn list_user_purchases(&self) -> Result<Vec<UserPurchase>, RepoError> {
        self.check_reads()?;
        let tables = self.tables.lock().expect("lock");
        let mut rows: Vec<UserPurchase> = tables
            .histories
            .values()
            .filter_map(|history| {
                tables
                    .products
                    .get(&history.product_id)
                    .map(|product| UserPurchase {
                        user_id: history.user_id,
                        history_id: history.id,
                        product: purchased(product, history),
                    })
            })
            .collect();
        rows.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then(b.history_id.cmp(&a.history_id))
        });
        Ok(rows)
    }

    async fn list_purchases_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<PurchasedProduct>, RepoError> {
        self.check_reads()?;
        let tables = self.tables.lock().expect("lock");
        Ok(tables
            .histories
            .values()
            .rev()
            .filter(|history| history.user_id == user_id)
            .filter_map(|history| {
                tables
                    .products
                    .get(&history.product_id)
                    .map(|product| purchased(product, history))
            })
            .collect())
    }

    async fn has_purchased(&self, product_id: i64, user_id: i64) -> Result<bool, RepoError> {
        self.check_reads()?;
        Ok(self
            .tables
            .lock()
            .expect("lock")
            .histories
            .values()
            .any(|history| history.product_id == product_id && history.user_id == user_id))
    }

    async fn record_purchase(&self, params: RecordPurchaseParams) -> Result<i64, RepoError> {
        let mut tables = self.tables.lock().expect("lock");
        let id = tables.histories.keys().next_back().copied().unwrap_or(0) + 1;
        tables.histories.insert(
            id,
            HistoryRecord {
                id,
                product_id: params.product_id,
                user_id: params.user_id,
                created_at: params.created_at,
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl MaintenanceRepo for InMemoryBackingStore {
    async fn reset_to_baseline(&self, baseline: ResetBaseline) -> Result<ResetSummary, RepoError> {
        let mut tables = self.tables.lock().expect("lock");
        let users = tables.users.split_off(&(baseline.max_user_id + 1)).len() as u64;
        let products = tables.products.split_off(&(baseline.max_product_id + 1)).len() as u64;
        let comments = tables.comments.split_off(&(baseline.max_comment_id + 1)).len() as u64;
        let histories = tables
            .histories
            .split_off(&(baseline.max_history_id + 1))
            .len() as u64;
        Ok(ResetSummary {
            users,
            products,
            comments,
            histories,
        })
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.check_reads()
    }
}

pub struct TestApp {
    pub router: Router,
    pub backing: Arc<InMemoryBackingStore>,
    pub cache_store: Arc<MemoryCacheStore>,
    pub cache: CacheClient,
    pub repos: RepositorySet,
    pub warmer: Arc<CacheWarmer>,
}

impl TestApp {
    pub fn new(backing: InMemoryBackingStore, persist_comments: bool) -> Self {
        let backing = Arc::new(backing);
        let cache_store = Arc::new(MemoryCacheStore::new());
        let cache = CacheClient::new(cache_store.clone());
        let repos = RepositorySet::from_shared(backing.clone());
        let warmer = Arc::new(CacheWarmer::new(&repos, cache.clone()));
        let config = CacheConfig {
            persist_comments,
            ..CacheConfig::default()
        };
        let state = HttpState::new(
            &repos,
            cache.clone(),
            warmer.clone(),
            &config,
            session::session_key(SESSION_SECRET),
        );

        Self {
            router: build_router(state),
            backing,
            cache_store,
            cache,
            repos,
            warmer,
        }
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request should build")
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// `name=value` pair of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(session::SESSION_COOKIE))
        .map(|value| value.split(';').next().unwrap_or_default().to_string())
        .next()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
