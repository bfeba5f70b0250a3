use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::repository::FavoriteRepository;
use super::service::FavoritesService;
use crate::workflows::access::actor_from_headers;
use crate::workflows::error::login_required;
use crate::workflows::listings::domain::ListingId;
use crate::workflows::listings::repository::ListingRepository;

/// Router builder exposing the favorite toggle and the caller's saved listings.
pub fn favorites_router<F, P>(service: Arc<FavoritesService<F, P>>) -> Router
where
    F: FavoriteRepository + 'static,
    P: ListingRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:listing_id/favorite",
            get(state_handler::<F, P>).post(toggle_handler::<F, P>),
        )
        .route("/api/v1/favorites", get(list_handler::<F, P>))
        .with_state(service)
}

pub(crate) async fn state_handler<F, P>(
    State(service): State<Arc<FavoritesService<F, P>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    F: FavoriteRepository + 'static,
    P: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    match service.state(&actor, &ListingId(listing_id)) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn toggle_handler<F, P>(
    State(service): State<Arc<FavoritesService<F, P>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    F: FavoriteRepository + 'static,
    P: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    match service.toggle(&actor, &ListingId(listing_id)) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_handler<F, P>(
    State(service): State<Arc<FavoritesService<F, P>>>,
    headers: HeaderMap,
) -> Response
where
    F: FavoriteRepository + 'static,
    P: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    match service.favorites(&actor) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(error) => error.into_response(),
    }
}
