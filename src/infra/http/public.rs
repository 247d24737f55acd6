use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{FromRef, Path, Query, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use serde::Deserialize;

use crate::{
    application::{
        auth::AuthService, comments::CommentService, error::AppError,
        maintenance::MaintenanceService, purchases::PurchaseService, repos::RepositorySet,
        storefront::StorefrontService,
    },
    cache::{CacheClient, CacheConfig},
    infra::cache_warmer::CacheWarmer,
    presentation::views::{
        CatalogView, LOGIN_PATH, LoginPromptView, ProductDetailView, UserPageView,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
    session,
};

#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub storefront: Arc<StorefrontService>,
    pub purchases: Arc<PurchaseService>,
    pub comments: Arc<CommentService>,
    pub maintenance: Arc<MaintenanceService>,
    pub session_key: Key,
}

impl HttpState {
    /// Wire the request-facing services over shared repositories and one cache handle.
    pub fn new(
        repos: &RepositorySet,
        cache: CacheClient,
        warmer: Arc<CacheWarmer>,
        cache_config: &CacheConfig,
        session_key: Key,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repos.users.clone(), cache.clone())),
            storefront: Arc::new(StorefrontService::new(
                cache.clone(),
                repos.histories.clone(),
            )),
            purchases: Arc::new(PurchaseService::new(repos.histories.clone())),
            comments: Arc::new(CommentService::new(
                cache,
                repos.comments.clone(),
                cache_config.persist_comments,
            )),
            maintenance: Arc::new(MaintenanceService::new(repos.maintenance.clone(), warmer)),
            session_key,
        }
    }
}

impl FromRef<HttpState> for Key {
    fn from_ref(state: &HttpState) -> Self {
        state.session_key.clone()
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/", get(index))
        .route("/products/{product_id}", get(product_detail))
        .route("/users/{user_id}", get(user_page))
        .route("/products/buy/{product_id}", post(buy_product))
        .route("/comments/{product_id}", post(post_comment))
        .route("/initialize", get(initialize))
        .route("/_health/db", get(db_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogQuery {
    page: Option<String>,
}

impl CatalogQuery {
    /// Leading digits of `page`; anything else reads as page 0.
    fn page_index(&self) -> u32 {
        let Some(raw) = self.page.as_deref() else {
            return 0;
        };
        let raw = raw.trim_start();
        let end = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let digits = &raw[..end];
        if digits.is_empty() {
            return 0;
        }
        // Past the last page either way; renders empty.
        digits.parse().unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Deserialize)]
struct CommentForm {
    content: String,
}

async fn login_page(jar: SignedCookieJar) -> impl IntoResponse {
    (
        session::clear(jar),
        Json(LoginPromptView::new("Please log in")),
    )
}

async fn login(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(SignedCookieJar, Redirect), (SignedCookieJar, AppError)> {
    match state.auth.authenticate(&form.email, &form.password).await {
        Ok(user) => Ok((session::bind_user(jar, user.id), Redirect::to("/"))),
        Err(err) => Err((session::clear(jar), AppError::from(err))),
    }
}

async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    (session::clear(jar), Redirect::to(LOGIN_PATH))
}

async fn index(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogView>, AppError> {
    let viewer = state
        .auth
        .current_user(session::session_user_id(&jar))
        .await?;
    let view = state
        .storefront
        .catalog_page(query.page_index(), viewer.as_ref())
        .await?;
    Ok(Json(view))
}

async fn product_detail(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductDetailView>, AppError> {
    let viewer = state
        .auth
        .current_user(session::session_user_id(&jar))
        .await?;
    let view = state
        .storefront
        .product_detail(product_id, viewer.as_ref())
        .await?;
    Ok(Json(view))
}

async fn user_page(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
) -> Result<Json<UserPageView>, AppError> {
    let viewer = state
        .auth
        .current_user(session::session_user_id(&jar))
        .await?;
    let view = state.storefront.user_page(user_id, viewer.as_ref()).await?;
    Ok(Json(view))
}

async fn buy_product(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Path(product_id): Path<i64>,
) -> Result<Redirect, AppError> {
    let buyer = state
        .auth
        .require_user(session::session_user_id(&jar))
        .await?;
    state.purchases.buy(product_id, &buyer).await?;
    Ok(Redirect::to(&format!("/users/{}", buyer.id)))
}

async fn post_comment(
    State(state): State<HttpState>,
    jar: SignedCookieJar,
    Path(product_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    let author = state
        .auth
        .require_user(session::session_user_id(&jar))
        .await?;
    state
        .comments
        .post(product_id, author.id, &form.content)
        .await?;
    Ok(Redirect::to(&format!("/users/{}", author.id)))
}

async fn initialize(State(state): State<HttpState>) -> Result<&'static str, AppError> {
    state.maintenance.initialize().await?;
    Ok("Finish")
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.maintenance.health_check().await)
}
