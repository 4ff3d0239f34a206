use crate::dashboard::serve_dashboard;
use crate::handlers::{self, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Report endpoints. Callers add rate limiting before mounting them.
pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/reports/table", post(handlers::leads_table))
        .route("/api/v1/reports/duplicates", post(handlers::duplicates))
        .route(
            "/api/v1/reports/missing-contact-owner",
            post(handlers::missing_contact_owner),
        )
        .route(
            "/api/v1/reports/missing-contact-owner/download",
            post(handlers::download_missing_contact_owner),
        )
        .route(
            "/api/v1/reports/distribution/:field",
            post(handlers::distribution),
        )
        .route("/api/v1/reports/country-map", post(handlers::country_map))
        .route("/api/v1/reports/dashboard", post(handlers::dashboard))
}

/// Request bodies carry the upload base64 encoded, plus a little JSON.
pub fn request_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.div_ceil(3) * 4 + 64 * 1024
}

/// Full application: health check, dashboard page and the given report routes.
pub fn build_app(state: Arc<AppState>, reports: Router<Arc<AppState>>) -> Router {
    let body_limit = request_body_limit(state.config.max_upload_bytes);

    let reports = reports.layer(
        ServiceBuilder::new()
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(body_limit)),
    );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(serve_dashboard))
        .merge(reports)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
