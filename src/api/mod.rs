//! HTTP API: routes, shared state and error mapping.

pub mod error;
pub mod handlers;
pub mod state;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::category::Category;
use crate::config::ServerConfig;
use crate::selection::SelectionRequest;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let mut api = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/cloudinary/upscale", post(handlers::cloudinary::upscale))
        .route("/api/cloudinary/remove-bg", post(handlers::cloudinary::remove_bg))
        .route("/api/cloudinary/upload", post(handlers::cloudinary::upload))
        .route("/api/upload", post(handlers::uploads::upload))
        .route("/api/my-photos/save-photo", post(handlers::uploads::save_photo))
        .route("/api/list-uploads", get(handlers::uploads::list_uploads))
        .route("/api/delete-uploads", post(handlers::uploads::delete_uploads));

    for category in Category::ALL {
        let handler = move |state: State<AppState>,
                            body: Result<Json<SelectionRequest>, JsonRejection>| {
            handlers::selection::select(category, state, body)
        };
        api = api.route(category.route(), post(handler));
    }

    let body_limit = server.body_limit_mb.saturating_mul(1024 * 1024);

    api.nest_service(state.uploads.url_prefix(), ServeDir::new(state.uploads.dir()))
        .nest_service(state.my_photos.url_prefix(), ServeDir::new(state.my_photos.dir()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.allowed_origins))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
