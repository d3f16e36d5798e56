//! Admin endpoints, all behind [`AdminAccess`]

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::ListingRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{AdminAccess, ListingId};
use crate::http::server::AppState;
use crate::models::Listing;

/// Admin view: every field, owner contact and proof included
#[derive(Debug, Serialize)]
pub struct AdminListingResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rent: Option<i64>,
    pub location: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub proof_filename: Option<String>,
    pub property_images: Option<String>,
    pub is_verified: bool,
    pub contact_clicks: i64,
    pub created_at: String,
}

impl From<Listing> for AdminListingResponse {
    fn from(l: Listing) -> Self {
        let property_images = l.images_column();
        Self {
            id: l.id,
            title: l.title,
            description: l.description,
            rent: l.rent,
            location: l.location,
            owner_name: l.owner.name,
            owner_email: l.owner.email,
            owner_phone: l.owner.phone,
            proof_filename: l.proof_filename,
            property_images,
            is_verified: l.is_verified,
            contact_clicks: l.contact_clicks,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

/// Acknowledgement for admin mutations
#[derive(Debug, Serialize)]
pub struct AdminAck {
    pub message: &'static str,
}

/// GET /api/admin/listings
async fn list_all(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminListingResponse>>, ApiError> {
    let listings = ListingRepo::new(&state.pool).list(None).await?;
    Ok(Json(
        listings.into_iter().map(AdminListingResponse::from).collect(),
    ))
}

/// POST /api/admin/verify/{id}
async fn verify(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
    ListingId(id): ListingId,
) -> Result<Json<AdminAck>, ApiError> {
    ListingRepo::new(&state.pool).set_verified(id, true).await?;
    tracing::info!(listing_id = id, "listing verified");
    Ok(Json(AdminAck { message: "verified" }))
}

/// POST /api/admin/unverify/{id}
async fn unverify(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
    ListingId(id): ListingId,
) -> Result<Json<AdminAck>, ApiError> {
    ListingRepo::new(&state.pool).set_verified(id, false).await?;
    tracing::info!(listing_id = id, "listing unverified");
    Ok(Json(AdminAck {
        message: "unverified",
    }))
}

/// POST /api/admin/delete/{id}
///
/// Files first (best effort), then enquiries and the listing row together.
async fn delete(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
    ListingId(id): ListingId,
) -> Result<Json<AdminAck>, ApiError> {
    let repo = ListingRepo::new(&state.pool);
    let listing = repo.get(id).await?;

    state.uploads.remove_all(listing.stored_files()).await;
    repo.delete(id).await?;

    tracing::info!(listing_id = id, "listing deleted");
    Ok(Json(AdminAck { message: "deleted" }))
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/listings", get(list_all))
        .route("/api/admin/verify/{id}", post(verify))
        .route("/api/admin/unverify/{id}", post(unverify))
        .route("/api/admin/delete/{id}", post(delete))
}
