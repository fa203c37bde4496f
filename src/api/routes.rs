use crate::api::handlers;
use crate::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/content",
            post(handlers::content::create).get(handlers::content::list),
        )
        .route("/content/{id}", delete(handlers::content::remove))
        .route("/content/process", post(handlers::content::process))
        .route("/content/search", post(handlers::content::search))
        .route("/content/chat", post(handlers::content::chat))
        .route(
            "/products",
            post(handlers::products::upsert).get(handlers::products::list),
        )
        .route("/products/process", post(handlers::products::process))
        .route("/products/search", post(handlers::products::search))
        .route("/products/chat", post(handlers::products::chat))
        .route(
            "/settings",
            get(handlers::settings::get_all).put(handlers::settings::update),
        )
        .route("/settings/{key}", get(handlers::settings::get_one));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api)
        .with_state(state)
}
