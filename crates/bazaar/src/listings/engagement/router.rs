use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ResponseId, ResponseView};
use super::ledger::{ResponseLedger, ResponseLedgerError};
use super::machine::{EngagementError, EngagementStateMachine};
use super::repository::EngagementRepository;
use crate::listings::registry::{ListingRef, ListingType};
use crate::listings::store::{ChatService, UserId};

/// Ledger and state machine over one shared repository, wired as router
/// state.
pub struct EngagementHandle<R, C> {
    pub ledger: ResponseLedger<R>,
    pub machine: EngagementStateMachine<R, C>,
}

impl<R, C> EngagementHandle<R, C>
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    pub fn new(repository: Arc<R>, chat: Arc<C>) -> Self {
        Self {
            ledger: ResponseLedger::new(repository.clone()),
            machine: EngagementStateMachine::new(repository, chat),
        }
    }
}

/// Router builder exposing HTTP endpoints for responses and the
/// confirmation workflow.
pub fn engagement_router<R, C>(handle: Arc<EngagementHandle<R, C>>) -> Router
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:listing_type/:id/responses",
            post(submit_response_handler::<R, C>).get(list_responses_handler::<R, C>),
        )
        .route(
            "/api/v1/responses/:id",
            delete(delete_response_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/open",
            post(open_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/confirm",
            post(confirm_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/cancel",
            post(cancel_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/complete",
            post(complete_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/pending/:performer_id",
            delete(delete_pending_handler::<R, C>),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/engagement/performers",
            get(performers_handler::<R, C>),
        )
        .with_state(handle)
}

fn parse_listing(listing_type: &str, id: i64) -> Result<ListingRef, Response> {
    match listing_type.parse::<ListingType>() {
        Ok(parsed) => Ok(ListingRef::new(parsed, id)),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            Err((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response())
        }
    }
}

fn ledger_error_response(error: ResponseLedgerError) -> Response {
    let status = match &error {
        ResponseLedgerError::AlreadyResponded => StatusCode::CONFLICT,
        ResponseLedgerError::ResponseNotFound => StatusCode::NOT_FOUND,
        ResponseLedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn engagement_error_response(error: EngagementError) -> Response {
    let status = match &error {
        EngagementError::ConfirmationNotFound => StatusCode::NOT_FOUND,
        EngagementError::Chat(_) | EngagementError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponseRequest {
    pub(crate) user_id: i64,
    pub(crate) price: u32,
    #[serde(default)]
    pub(crate) description: String,
}

pub(crate) async fn submit_response_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
    axum::Json(request): axum::Json<SubmitResponseRequest>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle.ledger.submit(
        listing,
        UserId(request.user_id),
        request.price,
        request.description,
        Utc::now(),
    ) {
        Ok(response) => {
            (StatusCode::CREATED, axum::Json(ResponseView::from(&response))).into_response()
        }
        Err(error) => ledger_error_response(error),
    }
}

pub(crate) async fn list_responses_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle.ledger.list_by_listing(listing) {
        Ok(responses) => {
            let views: Vec<ResponseView> = responses.iter().map(ResponseView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => ledger_error_response(error),
    }
}

pub(crate) async fn delete_response_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path(id): Path<i64>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    match handle.ledger.delete(ResponseId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => ledger_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenRequest {
    pub(crate) client_id: i64,
    pub(crate) performer_id: i64,
}

pub(crate) async fn open_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
    axum::Json(request): axum::Json<OpenRequest>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle.machine.open(
        listing,
        UserId(request.client_id),
        UserId(request.performer_id),
        Utc::now(),
    ) {
        Ok(confirmation) => {
            (StatusCode::CREATED, axum::Json(confirmation.status_view())).into_response()
        }
        Err(error) => engagement_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActingUserRequest {
    pub(crate) acting_user_id: i64,
}

pub(crate) async fn confirm_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
    axum::Json(request): axum::Json<ActingUserRequest>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle
        .machine
        .confirm(listing, UserId(request.acting_user_id), Utc::now())
    {
        Ok(confirmation) => {
            (StatusCode::OK, axum::Json(confirmation.status_view())).into_response()
        }
        Err(error) => engagement_error_response(error),
    }
}

pub(crate) async fn cancel_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
    axum::Json(request): axum::Json<ActingUserRequest>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle
        .machine
        .cancel(listing, UserId(request.acting_user_id), Utc::now())
    {
        Ok(confirmation) => {
            (StatusCode::OK, axum::Json(confirmation.status_view())).into_response()
        }
        Err(error) => engagement_error_response(error),
    }
}

pub(crate) async fn complete_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle.machine.complete(listing, Utc::now()) {
        Ok(confirmation) => {
            (StatusCode::OK, axum::Json(confirmation.status_view())).into_response()
        }
        Err(error) => engagement_error_response(error),
    }
}

pub(crate) async fn delete_pending_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id, performer_id)): Path<(String, i64, i64)>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle
        .machine
        .delete_pending_by_performer(listing, UserId(performer_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => engagement_error_response(error),
    }
}

pub(crate) async fn performers_handler<R, C>(
    State(handle): State<Arc<EngagementHandle<R, C>>>,
    Path((listing_type, id)): Path<(String, i64)>,
) -> Response
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    let listing = match parse_listing(&listing_type, id) {
        Ok(listing) => listing,
        Err(response) => return response,
    };

    match handle.machine.performer_ids(listing) {
        Ok(ids) => {
            let ids: Vec<i64> = ids.into_iter().map(|user| user.0).collect();
            (StatusCode::OK, axum::Json(json!({ "performer_ids": ids }))).into_response()
        }
        Err(error) => engagement_error_response(error),
    }
}
