//! Enquiry endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::EnquiryRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ListingId;
use crate::http::server::AppState;
use crate::models::EnquiryMessage;

/// Create enquiry request
#[derive(Debug, Deserialize)]
pub struct EnquiryRequest {
    #[serde(default)]
    pub message: String,
}

/// Enquiry response: the chat link to open
#[derive(Debug, Serialize)]
pub struct EnquiryResponse {
    pub whatsapp_url: String,
}

/// POST /api/enquiry/{id}
async fn create_enquiry(
    State(state): State<Arc<AppState>>,
    ListingId(listing_id): ListingId,
    payload: Result<Json<EnquiryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnquiryResponse>), ApiError> {
    let Json(req) = payload?;
    let message = EnquiryMessage::new(&req.message)?;

    let enquiry = EnquiryRepo::new(&state.pool)
        .create(listing_id, &message, &state.config.whatsapp_number)
        .await?;

    tracing::info!(listing_id, enquiry_id = enquiry.id, "enquiry recorded");

    Ok((
        StatusCode::CREATED,
        Json(EnquiryResponse {
            whatsapp_url: enquiry.whatsapp_url,
        }),
    ))
}

/// Enquiry routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/enquiry/{id}", post(create_enquiry))
}
