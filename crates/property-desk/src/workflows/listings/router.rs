use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{ListingFields, ListingId, ListingStatus, ListingView};
use super::gallery::{MediaId, MoveDirection};
use super::media::ListingGalleryService;
use super::repository::{ListingRepository, MediaRepository};
use super::service::{ListingLifecycleService, DEFAULT_QUEUE_LIMIT};
use crate::workflows::access::actor_from_headers;
use crate::workflows::error::{json_body, login_required, WorkflowError};

/// Router builder exposing listing drafting, moderation and public read endpoints.
pub fn listing_router<R>(service: Arc<ListingLifecycleService<R>>) -> Router
where
    R: ListingRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            post(create_handler::<R>).get(owned_handler::<R>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(get_handler::<R>)
                .put(save_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/listings/:listing_id/submit",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/listings/:listing_id/approve",
            post(approve_handler::<R>),
        )
        .route(
            "/api/v1/listings/:listing_id/reject",
            post(reject_handler::<R>),
        )
        .route(
            "/api/v1/listings/:listing_id/review",
            get(review_handler::<R>),
        )
        .route("/api/v1/admin/listings", get(queue_handler::<R>))
        .route("/api/v1/properties/:slug", get(public_handler::<R>))
        .with_state(service)
}

/// Router builder for gallery ordering and cover selection.
pub fn gallery_router<R, M>(service: Arc<ListingGalleryService<R, M>>) -> Router
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:listing_id/media",
            get(gallery_handler::<R, M>).post(add_media_handler::<R, M>),
        )
        .route(
            "/api/v1/media/:media_id",
            delete(remove_media_handler::<R, M>),
        )
        .route(
            "/api/v1/media/:media_id/cover",
            put(cover_handler::<R, M>),
        )
        .route(
            "/api/v1/media/:media_id/move",
            post(move_handler::<R, M>),
        )
        .with_state(service)
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, WorkflowError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

fn view(
    result: Result<super::domain::ListingRecord, WorkflowError>,
) -> Result<ListingView, WorkflowError> {
    result.map(|record| record.view())
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    payload: Result<Json<ListingFields>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let fields = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::CREATED,
        view(service.create_draft(&actor, fields)),
    )
}

pub(crate) async fn owned_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let result = service
        .owned_listings(&actor)
        .map(|records| records.iter().map(|record| record.view()).collect::<Vec<_>>());
    respond(StatusCode::OK, result)
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    respond(
        StatusCode::OK,
        view(service.get(&actor, &ListingId(listing_id))),
    )
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    payload: Result<Json<ListingFields>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let fields = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::OK,
        view(service.save_edits(&actor, &ListingId(listing_id), fields)),
    )
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    payload: Result<Json<ListingFields>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let fields = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::ACCEPTED,
        view(service.submit_for_approval(&actor, &ListingId(listing_id), fields)),
    )
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    respond(
        StatusCode::OK,
        view(service.approve(&actor, &ListingId(listing_id))),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

pub(crate) async fn reject_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::OK,
        view(service.reject(&actor, &ListingId(listing_id), request.reason.as_deref())),
    )
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    respond(StatusCode::OK, service.review(&actor, &ListingId(listing_id)))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueueQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn queue_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Query(query): Query<QueueQuery>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let status = match query.status.as_deref() {
        None => ListingStatus::Pending,
        Some(raw) => match raw.parse::<ListingStatus>() {
            Ok(status) => status,
            Err(error) => return WorkflowError::from(error).into_response(),
        },
    };
    let limit = query.limit.unwrap_or(DEFAULT_QUEUE_LIMIT);
    let result = service
        .review_queue(&actor, status, limit)
        .map(|records| records.iter().map(|record| record.view()).collect::<Vec<_>>());
    respond(StatusCode::OK, result)
}

pub(crate) async fn public_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    Path(slug): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let result = service.public_listing(&slug).map(|record| record.public_view());
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<ListingLifecycleService<R>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    match service.delete_listing(&actor, &ListingId(listing_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

/// Anonymous callers see published galleries only.
pub(crate) async fn gallery_handler<R, M>(
    State(service): State<Arc<ListingGalleryService<R, M>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    let actor = actor_from_headers(&headers);
    respond(
        StatusCode::OK,
        service.gallery(actor.as_ref(), &ListingId(listing_id)),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddMediaRequest {
    pub(crate) file_name: String,
}

pub(crate) async fn add_media_handler<R, M>(
    State(service): State<Arc<ListingGalleryService<R, M>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    payload: Result<Json<AddMediaRequest>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::CREATED,
        service.add_image(&actor, &ListingId(listing_id), &request.file_name),
    )
}

pub(crate) async fn cover_handler<R, M>(
    State(service): State<Arc<ListingGalleryService<R, M>>>,
    headers: HeaderMap,
    Path(media_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    respond(StatusCode::OK, service.set_cover(&actor, &MediaId(media_id)))
}

pub(crate) async fn remove_media_handler<R, M>(
    State(service): State<Arc<ListingGalleryService<R, M>>>,
    headers: HeaderMap,
    Path(media_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    respond(StatusCode::OK, service.remove_image(&actor, &MediaId(media_id)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveRequest {
    pub(crate) direction: MoveDirection,
}

pub(crate) async fn move_handler<R, M>(
    State(service): State<Arc<ListingGalleryService<R, M>>>,
    headers: HeaderMap,
    Path(media_id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Response
where
    R: ListingRepository + 'static,
    M: MediaRepository + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    respond(
        StatusCode::OK,
        service.move_image(&actor, &MediaId(media_id), request.direction),
    )
}
