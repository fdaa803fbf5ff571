//! REST Transport
//!
//! TigerStyle: Thin axum glue between HTTP and the entity services.
//!
//! Routes (both collections symmetric):
//! - `GET    /{users|posts}`       full collection
//! - `GET    /{users|posts}/{id}`  one record or 404
//! - `POST   /{users|posts}`       201 created record, 400, 409 (users)
//! - `PUT    /{users|posts}/{id}`  merged record, 404, 400, 409 (users)
//! - `DELETE /{users|posts}/{id}`  confirmation message or 404

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::model::{NewPost, NewUser, Post, PostPatch, User, UserPatch};
use crate::service::AppState;
use crate::store::Deleted;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Content type stamped on every response
pub const RESPONSE_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// =============================================================================
// Errors
// =============================================================================

/// JSON error body, `{ "statusCode", "message", "error" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

/// A service failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self(ServiceError::validation(
            "Validation failed (numeric string is expected)",
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");

        let body = ErrorBody {
            status_code: status.as_u16(),
            message: self.0.to_string(),
            error: self.0.class().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Router
// =============================================================================

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .fallback(no_route)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static(RESPONSE_CONTENT_TYPE),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on an already-bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}

async fn no_route(method: Method, uri: Uri) -> Response {
    let body = ErrorBody {
        status_code: StatusCode::NOT_FOUND.as_u16(),
        message: format!("Cannot {} {}", method, uri.path()),
        error: "Not Found".to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// =============================================================================
// User Handlers
// =============================================================================

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.find_all().await)
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(state.users.find_one(id).await?))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(data) = payload?;
    let user = state.users.create(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(state.users.update(id, patch).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Deleted>> {
    let Path(id) = id?;
    Ok(Json(state.users.remove(id).await?))
}

// =============================================================================
// Post Handlers
// =============================================================================

async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.posts.find_all().await)
}

async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Post>> {
    let Path(id) = id?;
    Ok(Json(state.posts.find_one(id).await?))
}

async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(data) = payload?;
    let post = state.posts.create(data).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<PostPatch>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(state.posts.update(id, patch).await?))
}

async fn delete_post(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Deleted>> {
    let Path(id) = id?;
    Ok(Json(state.posts.remove(id).await?))
}
