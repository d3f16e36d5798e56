//! Listing repository
//!
//! - create: single INSERT ... RETURNING
//! - list: newest first, optional case-insensitive substring search
//! - set_verified / delete: NotFound when no row matched

use sqlx::{AnyPool, FromRow};

use super::{decode_timestamp, encode_timestamp, now, DbError};
use crate::models::listing::{decode_images, encode_images};
use crate::models::{Listing, NewListing, OwnerContact};

const LISTING_COLUMNS: &str = "id, title, description, rent, location, owner_name, \
     owner_email, owner_phone, proof_filename, property_images, is_verified, \
     contact_clicks, created_at";

/// Listing record as read through the Any driver
#[derive(Debug, Clone, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: Option<String>,
    rent: Option<i64>,
    location: Option<String>,
    owner_name: String,
    owner_email: String,
    owner_phone: String,
    proof_filename: Option<String>,
    property_images: Option<String>,
    is_verified: i64,
    contact_clicks: i64,
    created_at: String,
}

impl TryFrom<ListingRow> for Listing {
    type Error = DbError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let created_at = decode_timestamp("listing", row.id, &row.created_at)?;
        Ok(Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            rent: row.rent,
            location: row.location,
            owner: OwnerContact {
                name: row.owner_name,
                email: row.owner_email,
                phone: row.owner_phone,
            },
            proof_filename: row.proof_filename,
            property_images: decode_images(row.property_images.as_deref()),
            is_verified: row.is_verified != 0,
            contact_clicks: row.contact_clicks,
            created_at,
        })
    }
}

/// Escape LIKE wildcards so the term matches literally (escape char `\`).
///
/// Case folding happens in SQL so the term and the columns fold alike.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound {
        resource: "listing",
        id: id.to_string(),
    }
}

/// Listing repository
pub struct ListingRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> ListingRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Insert a new listing; unverified with zero clicks.
    pub async fn create(&self, new: NewListing) -> Result<Listing, DbError> {
        let sql = format!(
            r#"
            INSERT INTO listings (
                title, description, rent, location,
                owner_name, owner_email, owner_phone,
                proof_filename, property_images,
                is_verified, contact_clicks, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0, $10)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let details = new.details;
        let row: ListingRow = sqlx::query_as(&sql)
            .bind(details.title)
            .bind(details.description)
            .bind(details.rent)
            .bind(details.location)
            .bind(details.owner.name)
            .bind(details.owner.email)
            .bind(details.owner.phone)
            .bind(new.proof_filename)
            .bind(encode_images(&new.property_images))
            .bind(encode_timestamp(now()))
            .fetch_one(self.pool)
            .await?;

        Listing::try_from(row)
    }

    /// All listings newest first, optionally filtered by a search term.
    ///
    /// The term matches case-insensitively as a substring of the title,
    /// description or location. A blank term means no filter.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Listing>, DbError> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());

        let rows: Vec<ListingRow> = match term {
            Some(term) => {
                let sql = format!(
                    r#"
                    SELECT {}
                    FROM listings
                    WHERE LOWER(title) LIKE LOWER($1) ESCAPE '\'
                       OR LOWER(COALESCE(description, '')) LIKE LOWER($1) ESCAPE '\'
                       OR LOWER(COALESCE(location, '')) LIKE LOWER($1) ESCAPE '\'
                    ORDER BY created_at DESC, id DESC
                    "#,
                    LISTING_COLUMNS
                );
                sqlx::query_as(&sql)
                    .bind(like_pattern(term))
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM listings ORDER BY created_at DESC, id DESC",
                    LISTING_COLUMNS
                );
                sqlx::query_as(&sql).fetch_all(self.pool).await?
            }
        };

        rows.into_iter().map(Listing::try_from).collect()
    }

    /// Get a single listing by id.
    pub async fn get(&self, id: i64) -> Result<Listing, DbError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let row: ListingRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        Listing::try_from(row)
    }

    /// Set the verified flag. Setting it to its current value is not an error.
    pub async fn set_verified(&self, id: i64, verified: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE listings SET is_verified = $1 WHERE id = $2")
            .bind(i64::from(verified))
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Delete a listing and its enquiries in one transaction.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let enquiries = sqlx::query("DELETE FROM enquiries WHERE listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let listing = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if listing.rows_affected() == 0 {
            // Dropping tx rolls back
            return Err(not_found(id));
        }

        tx.commit().await?;

        tracing::debug!(
            listing_id = id,
            enquiries = enquiries.rows_affected(),
            "listing deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseBackend;
    use crate::db::{create_pool, migrations};
    use crate::models::ListingDetails;

    async fn test_pool() -> AnyPool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        migrations::run(&pool, DatabaseBackend::Sqlite).await.unwrap();
        pool
    }

    fn new_listing(title: &str, description: Option<&str>, location: Option<&str>) -> NewListing {
        NewListing {
            details: ListingDetails {
                title: title.into(),
                description: description.map(Into::into),
                rent: Some(1500),
                location: location.map(Into::into),
                owner: OwnerContact {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                    phone: "+2348000000000".into(),
                },
            },
            proof_filename: Some("1_proof_x_deed.pdf".into()),
            property_images: vec!["1_img_a_front.jpg".into(), "1_img_b_back.png".into()],
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Lekki"), "%Lekki%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);

        let created = repo
            .create(new_listing("Flat", Some("Nice"), Some("Yaba")))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(!created.is_verified);
        assert_eq!(created.contact_clicks, 0);
        assert_eq!(created.rent, Some(1500));
        assert_eq!(created.property_images.len(), 2);

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn zero_images_are_stored_as_absent() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);

        let mut new = new_listing("Flat", None, None);
        new.property_images.clear();
        let created = repo.create(new).await.unwrap();
        assert!(created.property_images.is_empty());

        let (column,): (Option<String>,) =
            sqlx::query_as("SELECT property_images FROM listings WHERE id = $1")
                .bind(created.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(column, None);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_searchable() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);

        let first = repo
            .create(new_listing("Studio", Some("Small"), Some("Ikeja")))
            .await
            .unwrap();
        let second = repo
            .create(new_listing("Duplex", None, Some("Lekki Phase 1")))
            .await
            .unwrap();

        let all = repo.list(None).await.unwrap();
        let ids: Vec<_> = all.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let by_location = repo.list(Some("lekki")).await.unwrap();
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].id, second.id);

        let by_description = repo.list(Some("SMALL")).await.unwrap();
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, first.id);

        assert!(repo.list(Some("Abuja")).await.unwrap().is_empty());
        assert!(repo.list(Some("%")).await.unwrap().is_empty());
        assert_eq!(repo.list(Some("   ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_matches_non_ascii_text_as_stored() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);

        let listing = repo
            .create(new_listing("Éko Atlantic penthouse", None, Some("ÉKO")))
            .await
            .unwrap();
        repo.create(new_listing("Bungalow", None, Some("Ajah")))
            .await
            .unwrap();

        for term in ["Éko", "ÉKO", "Éko ATLANTIC"] {
            let hits = repo.list(Some(term)).await.unwrap();
            assert_eq!(hits.len(), 1, "search for {term:?}");
            assert_eq!(hits[0].id, listing.id);
        }
    }

    #[tokio::test]
    async fn set_verified_is_idempotent() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);
        let listing = repo.create(new_listing("Flat", None, None)).await.unwrap();

        repo.set_verified(listing.id, true).await.unwrap();
        repo.set_verified(listing.id, true).await.unwrap();
        assert!(repo.get(listing.id).await.unwrap().is_verified);

        repo.set_verified(listing.id, false).await.unwrap();
        assert!(!repo.get(listing.id).await.unwrap().is_verified);
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);

        assert!(matches!(repo.get(404).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.set_verified(404, true).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(404).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let pool = test_pool().await;
        let repo = ListingRepo::new(&pool);
        let listing = repo.create(new_listing("Flat", None, None)).await.unwrap();

        repo.delete(listing.id).await.unwrap();
        assert!(matches!(
            repo.get(listing.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
