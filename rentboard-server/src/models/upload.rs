//! Upload file policy: allowed types, name sanitisation, stored names
//!
//! Stored names look like `<unix-seconds>_<role>_<token>_<sanitized-original>`.
//! The random token keeps two uploads in the same second from colliding.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Extensions accepted for proofs and property images (lowercase)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Fallback when sanitisation leaves nothing of the original name
const FALLBACK_NAME: &str = "file";

static UNSAFE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("invalid filename regex"));

/// What an uploaded file is attached to the listing as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRole {
    /// Single proof-of-ownership document
    Proof,
    /// One of the property images
    Image,
}

impl UploadRole {
    /// Tag embedded in stored file names
    pub fn tag(self) -> &'static str {
        match self {
            Self::Proof => "proof",
            Self::Image => "img",
        }
    }

    /// Multipart field carrying files of this role
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Proof => "proofFile",
            Self::Image => "propertyImages",
        }
    }
}

/// A file part received in a listing submission, held in memory until validated
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn has_allowed_extension(&self) -> bool {
        extension_allowed(&self.file_name)
    }
}

/// Case-insensitive check of the text after the last period.
pub fn extension_allowed(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped, and leading/trailing dots and underscores
/// are trimmed so the result can never escape the upload directory.
pub fn sanitize_filename(name: &str) -> String {
    let flattened = name.replace(|c: char| c == '/' || c == '\\', " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS_RE.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Build the on-disk name for an accepted upload.
pub fn stored_name(role: UploadRole, original: &str, at: DateTime<Utc>, token: Uuid) -> String {
    format!(
        "{}_{}_{}_{}",
        at.timestamp(),
        role.tag(),
        token.simple(),
        sanitize_filename(original)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        assert!(extension_allowed("deed.pdf"));
        assert!(extension_allowed("HOUSE.JPG"));
        assert!(extension_allowed("front.view.Jpeg"));
        assert!(extension_allowed("plan.png"));
    }

    #[test]
    fn rejects_other_or_missing_extensions() {
        assert!(!extension_allowed("setup.exe"));
        assert!(!extension_allowed("pdf"));
        assert!(!extension_allowed(""));
        assert!(!extension_allowed("photo.jpg.exe"));
    }

    #[test]
    fn sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\windows\\win.ini"), "windows_win.ini");
        assert_eq!(sanitize_filename("/abs/path.pdf"), "abs_path.pdf");
    }

    #[test]
    fn sanitize_replaces_spaces_and_unsafe_chars() {
        assert_eq!(sanitize_filename("my house photo.jpg"), "my_house_photo.jpg");
        assert_eq!(sanitize_filename("deed;rm -rf*.pdf"), "deedrm_-rf.pdf");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
    }

    #[test]
    fn sanitize_falls_back_when_nothing_left() {
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[test]
    fn stored_name_embeds_timestamp_role_and_token() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let token = Uuid::nil();
        let name = stored_name(UploadRole::Image, "front door.JPG", at, token);
        assert_eq!(
            name,
            format!("{}_img_{}_front_door.JPG", at.timestamp(), token.simple())
        );

        let proof = stored_name(UploadRole::Proof, "deed.pdf", at, token);
        assert!(proof.contains("_proof_"));
        assert!(proof.ends_with("_deed.pdf"));
    }

    #[test]
    fn distinct_tokens_never_collide() {
        let at = Utc::now();
        let a = stored_name(UploadRole::Image, "a.png", at, Uuid::new_v4());
        let b = stored_name(UploadRole::Image, "a.png", at, Uuid::new_v4());
        assert_ne!(a, b);
    }
}
