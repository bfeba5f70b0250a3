use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::contact::ContactChannel;
use super::domain::{LeadId, LeadStatus};
use super::inbox::InboxFilter;
use super::repository::{LeadRepository, ProfileDirectory};
use super::service::LeadPipelineService;
use crate::workflows::access::actor_from_headers;
use crate::workflows::error::{json_body, login_required, WorkflowError};
use crate::workflows::listings::domain::ListingId;
use crate::workflows::listings::repository::ListingRepository;

/// Router builder exposing lead submission and the agent inbox.
pub fn lead_router<L, P, D>(service: Arc<LeadPipelineService<L, P, D>>) -> Router
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:listing_id/leads",
            post(submit_handler::<L, P, D>),
        )
        .route("/api/v1/leads", get(inbox_handler::<L, P, D>))
        .route(
            "/api/v1/leads/:lead_id/status",
            put(status_handler::<L, P, D>),
        )
        .route(
            "/api/v1/leads/:lead_id/contact",
            post(contact_handler::<L, P, D>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmitLeadRequest {
    #[serde(default)]
    pub(crate) message: Option<String>,
}

pub(crate) async fn submit_handler<L, P, D>(
    State(service): State<Arc<LeadPipelineService<L, P, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    payload: Result<Json<SubmitLeadRequest>, JsonRejection>,
) -> Response
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    match service.submit_lead(&actor, &ListingId(listing_id), request.message) {
        Ok(lead) => (StatusCode::CREATED, Json(lead)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InboxQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) async fn inbox_handler<L, P, D>(
    State(service): State<Arc<LeadPipelineService<L, P, D>>>,
    headers: HeaderMap,
    Query(query): Query<InboxQuery>,
) -> Response
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let filter = match query.status.as_deref().unwrap_or("all").parse::<InboxFilter>() {
        Ok(filter) => filter,
        Err(error) => return WorkflowError::from(error).into_response(),
    };
    match service.inbox(&actor, filter) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: String,
}

pub(crate) async fn status_handler<L, P, D>(
    State(service): State<Arc<LeadPipelineService<L, P, D>>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Response
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    match service.set_status(&actor, &LeadId(lead_id), &request.status) {
        Ok(lead) => (StatusCode::OK, Json(lead)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactRequest {
    pub(crate) channel: ContactChannel,
    pub(crate) observed_status: LeadStatus,
}

pub(crate) async fn contact_handler<L, P, D>(
    State(service): State<Arc<LeadPipelineService<L, P, D>>>,
    headers: HeaderMap,
    Path(lead_id): Path<String>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Response
where
    L: LeadRepository + 'static,
    P: ListingRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let Some(actor) = actor_from_headers(&headers) else {
        return login_required();
    };
    let request = match json_body(payload) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };
    match service.contact(
        &actor,
        &LeadId(lead_id),
        request.channel,
        request.observed_status,
    ) {
        Ok(action) => (StatusCode::OK, Json(action)).into_response(),
        Err(error) => error.into_response(),
    }
}
