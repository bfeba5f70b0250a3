use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use property_desk::workflows::favorites::{
    favorites_router, FavoriteRepository, FavoritesService,
};
use property_desk::workflows::leads::{
    lead_router, LeadPipelineService, LeadRepository, ProfileDirectory,
};
use property_desk::workflows::listings::{
    gallery_router, listing_router, ListingGalleryService, ListingLifecycleService,
    ListingRepository, MediaRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_marketplace_routes<R, M, L, D, F>(
    listings: Arc<ListingLifecycleService<R>>,
    gallery: Arc<ListingGalleryService<R, M>>,
    leads: Arc<LeadPipelineService<L, R, D>>,
    favorites: Arc<FavoritesService<F, R>>,
) -> Router
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
    L: LeadRepository + 'static,
    D: ProfileDirectory + 'static,
    F: FavoriteRepository + 'static,
{
    listing_router(listings)
        .merge(gallery_router(gallery))
        .merge(lead_router(leads))
        .merge(favorites_router(favorites))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (status, Json(json!({ "status": label })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
