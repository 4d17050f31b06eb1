use crate::infra::{AppState, CatalogEntry, InMemoryListingStore, InMemoryReviewSource};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bazaar::listings::engagement::{engagement_router, EngagementHandle, EngagementRepository};
use bazaar::listings::promotion::{
    lift_promoted, rank_full, Promotable, PromotionError, PromotionWindow, TopAssignmentService,
};
use bazaar::listings::registry::{ListingRef, ListingType};
use bazaar::listings::store::{ChatService, ReviewSource, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Promotion side of the serving layer: the assignment service over the
/// listing store, plus the catalog and review aggregates cards render from.
#[derive(Clone)]
pub(crate) struct PromotionState {
    pub(crate) top: TopAssignmentService<InMemoryListingStore>,
    pub(crate) catalog: Arc<Vec<CatalogEntry>>,
    pub(crate) reviews: Arc<InMemoryReviewSource>,
}

pub(crate) fn with_marketplace_routes<R, C>(
    handle: Arc<EngagementHandle<R, C>>,
    promotion: PromotionState,
) -> axum::Router
where
    R: EngagementRepository + 'static,
    C: ChatService + 'static,
{
    engagement_router(handle)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/listings",
            axum::routing::get(listing_cards_endpoint),
        )
        .route(
            "/api/v1/listings/:listing_type/:id/top",
            axum::routing::post(activate_top_endpoint),
        )
        .layer(Extension(promotion))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RankMode {
    #[default]
    Full,
    Lift,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingCardsQuery {
    #[serde(default)]
    pub(crate) mode: RankMode,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingCardView {
    pub(crate) listing_type: String,
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) price: u32,
    pub(crate) review_count: u32,
    pub(crate) average_rating: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) top_until: Option<DateTime<Utc>>,
}

struct Card {
    entry: CatalogEntry,
    promotion: Option<PromotionWindow>,
}

impl Promotable for Card {
    fn promotion(&self) -> Option<&PromotionWindow> {
        self.promotion.as_ref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.entry.created_at
    }
}

pub(crate) fn ranked_cards(
    promotion: &PromotionState,
    mode: RankMode,
    now: DateTime<Utc>,
) -> Result<Vec<ListingCardView>, PromotionError> {
    let mut cards = Vec::with_capacity(promotion.catalog.len());
    for entry in promotion.catalog.iter() {
        cards.push(Card {
            entry: entry.clone(),
            promotion: promotion.top.current_window(entry.listing)?,
        });
    }

    match mode {
        RankMode::Full => rank_full(&mut cards, now),
        RankMode::Lift => lift_promoted(&mut cards, now),
    }

    Ok(cards
        .into_iter()
        .map(|card| {
            let listing = card.entry.listing;
            let top_until = card
                .promotion
                .filter(|window| window.is_active(now))
                .map(|window| window.expires_at);
            ListingCardView {
                listing_type: listing.listing_type.to_string(),
                id: listing.id,
                title: card.entry.title,
                price: card.entry.price,
                review_count: promotion.reviews.review_count(listing),
                average_rating: promotion.reviews.average_rating(listing),
                top_until,
            }
        })
        .collect())
}

pub(crate) async fn listing_cards_endpoint(
    Extension(promotion): Extension<PromotionState>,
    Query(query): Query<ListingCardsQuery>,
) -> Response {
    match ranked_cards(&promotion, query.mode, Utc::now()) {
        Ok(cards) => (StatusCode::OK, Json(cards)).into_response(),
        Err(error) => promotion_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivateTopRequest {
    pub(crate) acting_user_id: i64,
    pub(crate) duration_days: i64,
}

pub(crate) async fn activate_top_endpoint(
    Extension(promotion): Extension<PromotionState>,
    Path((listing_type, id)): Path<(String, i64)>,
    Json(request): Json<ActivateTopRequest>,
) -> Response {
    let listing = match listing_type.parse::<ListingType>() {
        Ok(parsed) => ListingRef::new(parsed, id),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let owner = match promotion.top.owner_id(listing) {
        Ok(owner) => owner,
        Err(error) => return promotion_error_response(error),
    };
    if owner != UserId(request.acting_user_id) {
        let payload = json!({ "error": "only the listing owner may activate a boost" });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    }

    match promotion
        .top
        .activate(listing, request.duration_days, Utc::now())
    {
        Ok(window) => (StatusCode::CREATED, Json(window)).into_response(),
        Err(error) => promotion_error_response(error),
    }
}

fn promotion_error_response(error: PromotionError) -> Response {
    let status = match &error {
        PromotionError::ListingNotFound => StatusCode::NOT_FOUND,
        PromotionError::InvalidDuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PromotionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
