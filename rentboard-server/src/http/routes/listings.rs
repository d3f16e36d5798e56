//! Public listing endpoints: submission, search, detail

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::ListingRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ListingId;
use crate::http::server::AppState;
use crate::models::listing::TEXT_FIELDS;
use crate::models::{Listing, ListingForm, NewListing, UploadRole, UploadedFile};

/// Search query
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
}

/// Public view: no owner contact, no proof document
#[derive(Debug, Serialize)]
pub struct PublicListingResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rent: Option<i64>,
    pub location: Option<String>,
    pub is_verified: bool,
    pub contact_clicks: i64,
    pub created_at: String,
    /// Comma-joined stored image names, null when there are none
    pub property_images: Option<String>,
}

impl From<Listing> for PublicListingResponse {
    fn from(l: Listing) -> Self {
        let property_images = l.images_column();
        Self {
            id: l.id,
            title: l.title,
            description: l.description,
            rent: l.rent,
            location: l.location,
            is_verified: l.is_verified,
            contact_clicks: l.contact_clicks,
            created_at: l.created_at.to_rfc3339(),
            property_images,
        }
    }
}

/// Create listing response
#[derive(Debug, Serialize)]
pub struct ListingCreatedResponse {
    pub message: &'static str,
    pub listing_id: i64,
}

/// Drain the multipart body into an unvalidated form.
///
/// Only the first proof part counts; unknown text parts are skipped unread.
async fn read_form(mut multipart: Multipart) -> Result<ListingForm, ApiError> {
    let mut form = ListingForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == UploadRole::Proof.field_name() {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;
            if form.proof.is_none() {
                form.proof = Some(UploadedFile::new(file_name, bytes));
            }
        } else if name == UploadRole::Image.field_name() {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;
            form.images.push(UploadedFile::new(file_name, bytes));
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

/// POST /api/listings - multipart submission
async fn create_listing(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ListingCreatedResponse>), ApiError> {
    let form = read_form(multipart?).await?;
    let submission = form.validate()?;

    if submission.dropped_images > 0 {
        tracing::info!(
            dropped = submission.dropped_images,
            "skipped property images with disallowed type"
        );
    }

    // Files go to disk before the row; a failed insert leaves them orphaned.
    let proof_filename = match &submission.proof {
        Some(file) => Some(state.uploads.save(UploadRole::Proof, file).await?),
        None => None,
    };

    let mut property_images = Vec::with_capacity(submission.images.len());
    for file in &submission.images {
        property_images.push(state.uploads.save(UploadRole::Image, file).await?);
    }

    let listing = ListingRepo::new(&state.pool)
        .create(NewListing {
            details: submission.details,
            proof_filename,
            property_images,
        })
        .await?;

    tracing::info!(
        listing_id = listing.id,
        images = listing.property_images.len(),
        proof = listing.proof_filename.is_some(),
        "listing created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ListingCreatedResponse {
            message: "Listing created",
            listing_id: listing.id,
        }),
    ))
}

/// GET /api/listings?q= - newest first, optional search
async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<PublicListingResponse>>, ApiError> {
    let listings = ListingRepo::new(&state.pool)
        .list(query.q.as_deref())
        .await?;

    Ok(Json(
        listings
            .into_iter()
            .map(PublicListingResponse::from)
            .collect(),
    ))
}

/// GET /api/listings/{id}
async fn get_listing(
    State(state): State<Arc<AppState>>,
    ListingId(id): ListingId,
) -> Result<Json<PublicListingResponse>, ApiError> {
    let listing = ListingRepo::new(&state.pool).get(id).await?;
    Ok(Json(PublicListingResponse::from(listing)))
}

/// Listing routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/listings", get(list_listings).post(create_listing))
        .route("/api/listings/{id}", get(get_listing))
}
