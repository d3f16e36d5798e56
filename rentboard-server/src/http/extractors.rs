//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::error::ApiError;
use super::server::AppState;
use crate::models::ValidationError;

/// Header carrying the admin key (preferred over the query parameter)
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Deserialize)]
struct AdminKeyQuery {
    key: Option<String>,
}

/// Proof that the request carried the admin secret.
///
/// Put it first in a handler's arguments so a bad key is rejected before
/// anything else (path ids included) is looked at.
pub struct AdminAccess;

impl FromRequestParts<Arc<AppState>> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let supplied = supplied_key(parts);

        match supplied {
            Some(key) if keys_match(&key, &state.config.admin_secret) => Ok(Self),
            _ => {
                tracing::warn!(path = %parts.uri.path(), "admin key rejected");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

fn supplied_key(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(ADMIN_KEY_HEADER) {
        return value.to_str().ok().map(str::to_owned);
    }
    Query::<AdminKeyQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.key)
}

/// Constant-time comparison (length is the only thing that can leak).
fn keys_match(supplied: &str, secret: &str) -> bool {
    supplied.as_bytes().ct_eq(secret.as_bytes()).into()
}

/// Extract and validate a numeric listing id from path
pub struct ListingId(pub i64);

impl<S> FromRequestParts<S> for ListingId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let id = id.parse::<i64>().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be an integer",
            })
        })?;

        Ok(Self(id))
    }
}
