use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::access::Role;
use super::listings::domain::{AvailabilityStatus, ListingStatus};

/// Caller-correctable input problems. Surfaced verbatim, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Valid price is required")]
    InvalidPrice,
    #[error("City is required")]
    MissingCity,
    #[error("unknown lead status '{0}' (expected new, contacted, closed or spam)")]
    UnknownLeadStatus(String),
    #[error("unknown listing status '{0}' (expected draft, pending, published or rejected)")]
    UnknownListingStatus(String),
    #[error("invalid request body: {0}")]
    MalformedBody(String),
}

/// The entity is not in a state that allows the transition; the caller's view is stale.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("listing is {status}; only pending listings can be reviewed")]
    NotPending { status: ListingStatus },
    #[error("listing is {status}; submit for approval from draft, rejected or pending")]
    SubmitNotAllowed { status: ListingStatus },
    #[error("listing is not accepting inquiries (status {status}, availability {availability})")]
    ListingClosedForLeads {
        status: ListingStatus,
        availability: AvailabilityStatus,
    },
    #[error("record changed since it was read; refresh and try again")]
    StaleRecord,
}

/// The actor lacks the role or ownership for the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("{required} role required (actor is {})", .actual.label())]
    RoleRequired { required: &'static str, actual: Role },
    #[error("only the listing owner or an admin may do this")]
    NotOwner,
    #[error("owners may only delete draft or rejected listings (listing is {status})")]
    DeleteNotAllowed { status: ListingStatus },
}

/// Failures reported by the storage platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record revision is stale")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Error raised by the listing and lead services.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Collaborator(#[from] RepositoryError),
    #[error("Lead could not be created.")]
    LeadNotCreated,
}

impl WorkflowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::Precondition(_) => StatusCode::CONFLICT,
            WorkflowError::Authorization(_) => StatusCode::FORBIDDEN,
            WorkflowError::Collaborator(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            WorkflowError::Collaborator(RepositoryError::Conflict | RepositoryError::Stale) => {
                StatusCode::CONFLICT
            }
            WorkflowError::Collaborator(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            WorkflowError::LeadNotCreated => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Response for requests that arrive without a session.
pub fn login_required() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "login required" })),
    )
        .into_response()
}

/// Unwrap a JSON body, reporting extractor failures as validation errors.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, WorkflowError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()).into())
}
