//! Listing submission parsing and the stored listing record

use chrono::{DateTime, Utc};

use super::upload::UploadedFile;
use super::ValidationError;

/// Separator used when storing property image names in one column
pub const IMAGE_SEPARATOR: char = ',';

/// Text fields read from the submission form; other text parts are ignored
pub const TEXT_FIELDS: [&str; 7] = [
    "title",
    "description",
    "rent",
    "location",
    "owner_name",
    "owner_email",
    "owner_phone",
];

/// Raw listing form exactly as received, before any validation
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub rent: String,
    pub location: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub proof: Option<UploadedFile>,
    pub images: Vec<UploadedFile>,
}

/// Owner contact triple, never exposed on public endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Validated descriptive fields of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDetails {
    pub title: String,
    pub description: Option<String>,
    pub rent: Option<i64>,
    pub location: Option<String>,
    pub owner: OwnerContact,
}

/// A submission that passed validation; files are still only in memory
#[derive(Debug, Clone)]
pub struct ListingSubmission {
    pub details: ListingDetails,
    pub proof: Option<UploadedFile>,
    pub images: Vec<UploadedFile>,
    /// Image parts silently skipped for having a disallowed type
    pub dropped_images: usize,
}

/// Row to insert once files are persisted
#[derive(Debug, Clone)]
pub struct NewListing {
    pub details: ListingDetails,
    pub proof_filename: Option<String>,
    pub property_images: Vec<String>,
}

/// Listing as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub rent: Option<i64>,
    pub location: Option<String>,
    pub owner: OwnerContact,
    pub proof_filename: Option<String>,
    pub property_images: Vec<String>,
    pub is_verified: bool,
    pub contact_clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl ListingForm {
    /// Assign a text field by its form name. Returns false for unknown names.
    pub fn set_text(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "rent" => &mut self.rent,
            "location" => &mut self.location,
            "owner_name" => &mut self.owner_name,
            "owner_email" => &mut self.owner_email,
            "owner_phone" => &mut self.owner_phone,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Validate every field before anything touches disk or database.
    ///
    /// # Rules
    /// - title and the owner contact triple must be non-empty after trimming
    /// - rent, when present, must parse as an integer
    /// - a proof file with a disallowed type rejects the whole submission
    /// - image files with a disallowed type are dropped
    pub fn validate(self) -> Result<ListingSubmission, ValidationError> {
        let title = self.title.trim();
        let owner_name = self.owner_name.trim();
        let owner_email = self.owner_email.trim();
        let owner_phone = self.owner_phone.trim();

        let missing: Vec<&'static str> = [
            ("title", title),
            ("owner_name", owner_name),
            ("owner_email", owner_email),
            ("owner_phone", owner_phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired { fields: missing });
        }

        let rent = parse_rent(&self.rent)?;

        let proof = match self.proof {
            Some(file) if file.file_name.is_empty() => None,
            Some(file) if !file.has_allowed_extension() => {
                return Err(ValidationError::DisallowedFileType {
                    field: "proofFile",
                    file_name: file.file_name,
                });
            }
            other => other,
        };

        let total_images = self.images.len();
        let images: Vec<UploadedFile> = self
            .images
            .into_iter()
            .filter(UploadedFile::has_allowed_extension)
            .collect();

        Ok(ListingSubmission {
            details: ListingDetails {
                title: title.to_owned(),
                description: non_empty(&self.description),
                rent,
                location: non_empty(&self.location),
                owner: OwnerContact {
                    name: owner_name.to_owned(),
                    email: owner_email.to_owned(),
                    phone: owner_phone.to_owned(),
                },
            },
            proof,
            dropped_images: total_images - images.len(),
            images,
        })
    }
}

impl Listing {
    /// Every upload referenced by this listing, proof first.
    pub fn stored_files(&self) -> Vec<&str> {
        self.proof_filename
            .iter()
            .map(String::as_str)
            .chain(self.property_images.iter().map(String::as_str))
            .collect()
    }

    /// Property images in their stored column form (`None` when there are none)
    pub fn images_column(&self) -> Option<String> {
        encode_images(&self.property_images)
    }
}

/// Join image names for storage. Zero images is stored as absent, not "".
pub fn encode_images(names: &[String]) -> Option<String> {
    if names.is_empty() {
        None
    } else {
        Some(names.join(&IMAGE_SEPARATOR.to_string()))
    }
}

/// Split the stored column back into names, tolerating legacy empty strings.
pub fn decode_images(column: Option<&str>) -> Vec<String> {
    column
        .map(|joined| {
            joined
                .split(IMAGE_SEPARATOR)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_rent(raw: &str) -> Result<Option<i64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| ValidationError::NotAnInteger {
            field: "rent",
            value: raw.to_owned(),
        })
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ListingForm {
        ListingForm {
            title: "  Two bedroom flat ".into(),
            description: "Close to the market".into(),
            rent: "1500".into(),
            location: "Lekki".into(),
            owner_name: "Ada".into(),
            owner_email: "ada@example.com".into(),
            owner_phone: "+2348000000000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_complete_form_and_trims() {
        let submission = complete_form().validate().unwrap();
        assert_eq!(submission.details.title, "Two bedroom flat");
        assert_eq!(submission.details.rent, Some(1500));
        assert_eq!(submission.details.location.as_deref(), Some("Lekki"));
        assert!(submission.proof.is_none());
    }

    #[test]
    fn missing_owner_email_is_rejected() {
        let form = ListingForm {
            owner_email: "   ".into(),
            ..complete_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                fields: vec!["owner_email"]
            }
        );
    }

    #[test]
    fn rent_parsing() {
        let form = ListingForm {
            rent: "abc".into(),
            ..complete_form()
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::NotAnInteger { field: "rent", .. }
        ));

        let form = ListingForm {
            rent: " ".into(),
            ..complete_form()
        };
        assert_eq!(form.validate().unwrap().details.rent, None);
    }

    #[test]
    fn empty_optional_text_becomes_none() {
        let form = ListingForm {
            description: "".into(),
            location: "  ".into(),
            ..complete_form()
        };
        let details = form.validate().unwrap().details;
        assert_eq!(details.description, None);
        assert_eq!(details.location, None);
    }

    #[test]
    fn disallowed_proof_rejects_submission() {
        let form = ListingForm {
            proof: Some(UploadedFile::new("installer.exe", "MZ")),
            ..complete_form()
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::DisallowedFileType {
                field: "proofFile",
                ..
            }
        ));
    }

    #[test]
    fn proof_without_filename_is_absent() {
        let form = ListingForm {
            proof: Some(UploadedFile::new("", "")),
            ..complete_form()
        };
        assert!(form.validate().unwrap().proof.is_none());
    }

    #[test]
    fn disallowed_images_are_dropped() {
        let form = ListingForm {
            images: vec![
                UploadedFile::new("front.jpg", "a"),
                UploadedFile::new("virus.exe", "b"),
                UploadedFile::new("back.PNG", "c"),
            ],
            ..complete_form()
        };
        let submission = form.validate().unwrap();
        let names: Vec<_> = submission
            .images
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["front.jpg", "back.PNG"]);
        assert_eq!(submission.dropped_images, 1);
    }

    #[test]
    fn set_text_ignores_unknown_fields() {
        let mut form = ListingForm::default();
        assert!(form.set_text("title", "Flat".into()));
        assert!(!form.set_text("is_verified", "true".into()));
        assert_eq!(form.title, "Flat");

        for field in TEXT_FIELDS {
            assert!(form.set_text(field, "x".into()), "{field} not settable");
        }
    }

    #[test]
    fn image_column_encoding() {
        assert_eq!(encode_images(&[]), None);
        let names = vec!["a.png".to_owned(), "b.jpg".to_owned()];
        assert_eq!(encode_images(&names).as_deref(), Some("a.png,b.jpg"));
        assert_eq!(decode_images(Some("a.png,b.jpg")), names);
        assert!(decode_images(Some("")).is_empty());
        assert!(decode_images(None).is_empty());
    }
}
