use crate::{
    handlers::{self, api},
    services::CoffeeApp,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn build_router(app: Arc<CoffeeApp>) -> Router {
    Router::new()
        // Page
        .route("/", get(handlers::index))
        .route("/connect", post(handlers::connect_wallet))
        .route("/disconnect", post(handlers::disconnect_wallet))
        .route("/coffee", post(handlers::buy_coffee))

        // JSON API
        .route("/api/session", get(api::get_session))
        .route(
            "/api/payments",
            get(api::list_payments).post(api::submit_payment),
        )
        .route("/api/connect", post(api::connect))
        .route("/api/disconnect", post(api::disconnect))

        // Live feed
        .route("/ws/payments", get(handlers::payments_feed))

        .route("/health", get(handlers::health_check))
        .with_state(app)

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
