use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use rust_photo_gallery::item::{ErrorBody, PageResult};

use crate::drive::FolderSource;
use crate::error::ServiceError;
use crate::listing::{self, ListQuery};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn FolderSource>,
}

pub fn router(state: AppState) -> Router {
    // The widget is served from arbitrary origins; preflight included.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/photos", get(list_photos))
        .route("/healthz", get(health))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<u32>,
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
    page: Option<u32>,
}

async fn list_photos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult>, Failure> {
    let query = ListQuery {
        limit: params.limit,
        page_token: params.page_token,
        page: params.page,
    };
    let page = listing::list_page(state.source.as_ref(), &query).await?;
    Ok(Json(page))
}

async fn health() -> &'static str {
    "ok"
}

/// Wire-side failure: the original cause is logged here and flattened to a
/// generic body, so callers cannot distinguish configuration from upstream
/// trouble.
struct Failure(ServiceError);

impl From<ServiceError> for Failure {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        error!(error = %self.0, "photos request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "failed to list photos".to_string(),
                details: None,
            }),
        )
            .into_response()
    }
}
