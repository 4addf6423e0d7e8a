use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::error::WpError;
use crate::core::service::WordPress;
use crate::models::types::SUBMIT_FAILED_MESSAGE;
use crate::models::{
    Category, ContactForm, MenuItem, Page, PageList, Post, PostList, SiteInfo, SiteSettings,
    SubmitFormResult,
};

/// 分类列表默认数量
const DEFAULT_CATEGORY_LIMIT: usize = 20;

/// 接口错误
#[derive(Debug)]
pub enum ApiError {
    /// WordPress 请求失败
    Upstream(WpError),
    /// 资源不存在
    NotFound(String),
}

impl From<WpError> for ApiError {
    fn from(e: WpError) -> Self {
        ApiError::Upstream(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upstream(e @ WpError::PageOutOfRange { .. }) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Upstream(e) => {
                let body = json!({
                    "error": e.to_string(),
                    "upstreamStatus": e.status(),
                });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{} not found", what) })),
            )
                .into_response(),
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
struct PostsParams {
    page: Option<usize>,
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

async fn health(State(service): State<Arc<WordPress>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "transport": service.transport(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_posts(
    State(service): State<Arc<WordPress>>,
    Query(params): Query<PostsParams>,
) -> ApiResult<PostList> {
    let page = params.page.unwrap_or(1);
    let category = params.category.unwrap_or_default();
    Ok(Json(service.fetch_posts(page, &category).await?))
}

async fn post_by_slug(
    State(service): State<Arc<WordPress>>,
    Path(slug): Path<String>,
) -> ApiResult<Post> {
    service
        .fetch_post_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("post {}", slug)))
}

async fn list_pages(State(service): State<Arc<WordPress>>) -> ApiResult<PageList> {
    Ok(Json(service.fetch_pages().await?))
}

async fn page_by_slug(
    State(service): State<Arc<WordPress>>,
    Path(slug): Path<String>,
) -> ApiResult<Page> {
    service
        .fetch_page_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("page {}", slug)))
}

async fn list_categories(
    State(service): State<Arc<WordPress>>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<Category>> {
    let limit = params.limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
    Ok(Json(service.fetch_categories(limit).await?))
}

/// 站点信息和 Logo 并行获取，失败时回退到占位值
async fn site_info(State(service): State<Arc<WordPress>>) -> Json<SiteInfo> {
    let (info, logo) = tokio::join!(service.fetch_site_info(), service.fetch_site_logo());
    let mut info = info.unwrap_or_else(|e| {
        warn!("Using default site info: {}", e);
        SiteInfo::default()
    });
    info.logo = logo.unwrap_or_else(|e| {
        warn!("Site logo unavailable: {}", e);
        None
    });
    Json(info)
}

async fn menu(
    State(service): State<Arc<WordPress>>,
    Path(location): Path<String>,
) -> ApiResult<Vec<MenuItem>> {
    Ok(Json(service.fetch_menu(&location).await?))
}

async fn site_settings(State(service): State<Arc<WordPress>>) -> ApiResult<SiteSettings> {
    Ok(Json(service.fetch_site_settings().await?.unwrap_or_default()))
}

async fn contact_form(
    State(service): State<Arc<WordPress>>,
    Path(form_id): Path<u64>,
) -> ApiResult<ContactForm> {
    service
        .fetch_contact_form(form_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("form {}", form_id)))
}

/// 提交表单；请求失败时也返回结果结构，状态为 `error`
async fn submit_form(
    State(service): State<Arc<WordPress>>,
    Path(form_id): Path<u64>,
    Json(fields): Json<Map<String, Value>>,
) -> (StatusCode, Json<SubmitFormResult>) {
    let data: Vec<(String, String)> = fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    match service.submit_contact_form(form_id, data).await {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(e) => {
            warn!("Contact form {} submission failed: {}", form_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(SubmitFormResult::failed(SUBMIT_FAILED_MESSAGE)),
            )
        }
    }
}

/// 构建 JSON 接口路由
pub fn router(service: Arc<WordPress>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(post_by_slug))
        .route("/api/pages", get(list_pages))
        .route("/api/pages/:slug", get(page_by_slug))
        .route("/api/categories", get(list_categories))
        .route("/api/site", get(site_info))
        .route("/api/menus/:location", get(menu))
        .route("/api/settings", get(site_settings))
        .route("/api/forms/:id", get(contact_form).post(submit_form))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// 本地 JSON 接口服务器
pub struct Server {
    /// 访问层
    service: Arc<WordPress>,
    /// 端口
    port: u16,
}

impl Server {
    /// 创建新的服务器
    pub fn new(service: WordPress, port: u16) -> Self {
        Self {
            service: Arc::new(service),
            port,
        }
    }

    /// 启动服务器
    pub async fn start(self) -> Result<()> {
        let app = router(self.service.clone());

        let addr: SocketAddr = format!("0.0.0.0:{}", self.port).parse()?;
        info!(
            "API server started at http://localhost:{} ({} via {})",
            self.port,
            self.service.config().wp_url,
            self.service.transport()
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
