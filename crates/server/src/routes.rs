use std::{path::Path, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::{
    image_url::{ImageUrls, UPLOADS_PATH},
    point::{repo::seaorm::SeaOrmPointRepository, PointService},
    upload::UploadStore,
};

use crate::openapi::ApiDoc;

pub mod items;
pub mod points;

/// Shared handler state. Everything inside is cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub points: Arc<PointService<SeaOrmPointRepository>>,
    pub uploads: Arc<UploadStore>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, urls: ImageUrls, uploads_dir: impl AsRef<Path>) -> Self {
        let repo = Arc::new(SeaOrmPointRepository::new(db.clone()));
        Self {
            db,
            points: Arc::new(PointService::new(repo, urls)),
            uploads: Arc::new(UploadStore::new(uploads_dir.as_ref())),
        }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: API routes, uploaded files and API docs
pub fn build_router(state: ServerState, cors: CorsLayer, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    let api = Router::new()
        .route("/health", get(health))
        .route("/items", get(items::list))
        .route("/points", get(points::list).post(points::create))
        .route("/points/:id", get(points::show))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    // Compose
    api.nest_service(UPLOADS_PATH, uploads)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
