pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post, put},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

pub use config::Config;
pub use db::{Database, MemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    /// `None` until the store connection is established.
    pub store: Option<Arc<dyn Store>>,
    pub images_dir: PathBuf,
}

impl AppState {
    pub fn ready(store: Arc<dyn Store>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Some(store),
            images_dir: images_dir.into(),
        }
    }

    pub fn pending(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: None,
            images_dir: images_dir.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_some()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/images/{image_name}", get(handlers::get_image))
        // Catalogue
        .route("/collection/lessons", get(handlers::list_lessons))
        .route("/collection/lessons/{id}", put(handlers::update_lesson))
        // Orders
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/collection/orders", post(handlers::create_order))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::route_not_found)
        // Outermost first: CORS headers, trace, access log, preflight, panic
        // catcher. The headers wrap everything so early replies carry them too.
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(middleware::ALLOW_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(middleware::ALLOW_HEADERS),
                ))
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::log_request))
                .layer(axum::middleware::from_fn(middleware::preflight))
                .layer(CatchPanicLayer::custom(middleware::handle_panic)),
        )
        .with_state(state)
}
