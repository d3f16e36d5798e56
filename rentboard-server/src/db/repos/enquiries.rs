//! Enquiry repository
//!
//! Recording an enquiry bumps the listing's click counter, builds the
//! WhatsApp link from the listing's current title and description, and
//! stores the enquiry, all in one transaction.

use sqlx::{AnyPool, FromRow};

use super::{decode_timestamp, encode_timestamp, now, DbError};
use crate::models::enquiry::whatsapp_url;
use crate::models::{ContactNumber, Enquiry, EnquiryMessage, EnquiryTarget};

#[derive(Debug, Clone, FromRow)]
struct EnquiryRow {
    id: i64,
    listing_id: i64,
    message: String,
    whatsapp_url: String,
    created_at: String,
}

impl TryFrom<EnquiryRow> for Enquiry {
    type Error = DbError;

    fn try_from(row: EnquiryRow) -> Result<Self, Self::Error> {
        let created_at = decode_timestamp("enquiry", row.id, &row.created_at)?;
        Ok(Enquiry {
            id: row.id,
            listing_id: row.listing_id,
            message: row.message,
            whatsapp_url: row.whatsapp_url,
            created_at,
        })
    }
}

/// Enquiry repository
pub struct EnquiryRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> EnquiryRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Record an enquiry against an existing listing.
    ///
    /// Fails with NotFound (and changes nothing) when the listing is absent.
    pub async fn create(
        &self,
        listing_id: i64,
        message: &EnquiryMessage,
        contact: &ContactNumber,
    ) -> Result<Enquiry, DbError> {
        let mut tx = self.pool.begin().await?;

        let (title, description): (String, Option<String>) = sqlx::query_as(
            r#"
            UPDATE listings
            SET contact_clicks = contact_clicks + 1
            WHERE id = $1
            RETURNING title, description
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "listing",
            id: listing_id.to_string(),
        })?;

        let target = EnquiryTarget {
            listing_id,
            title,
            description,
        };
        let url = whatsapp_url(contact, &target, message);

        let row: EnquiryRow = sqlx::query_as(
            r#"
            INSERT INTO enquiries (listing_id, message, whatsapp_url, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, message, whatsapp_url, created_at
            "#,
        )
        .bind(listing_id)
        .bind(message.as_str())
        .bind(url)
        .bind(encode_timestamp(now()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Enquiry::try_from(row)
    }

    /// Enquiries for one listing, oldest first.
    #[cfg(test)]
    pub(crate) async fn list_for_listing(&self, listing_id: i64) -> Result<Vec<Enquiry>, DbError> {
        let rows: Vec<EnquiryRow> = sqlx::query_as(
            r#"
            SELECT id, listing_id, message, whatsapp_url, created_at
            FROM enquiries
            WHERE listing_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(listing_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Enquiry::try_from).collect()
    }
}
