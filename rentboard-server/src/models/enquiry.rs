//! Enquiry messages and WhatsApp deep links

use chrono::{DateTime, Utc};

use super::ValidationError;

const WHATSAPP_BASE: &str = "https://wa.me";

/// Non-empty, trimmed enquiry text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryMessage(String);

impl EnquiryMessage {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "message" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Destination phone number for enquiry chats (digits only, international form)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNumber(String);

impl ContactNumber {
    /// Accepts digits with optional `+`, spaces or dashes, stored as digits.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let digits: String = s
            .chars()
            .filter(|c| !matches!(c, '+' | ' ' | '-'))
            .collect();
        if digits.is_empty() {
            return Err(ValidationError::Empty {
                field: "whatsapp number",
            });
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "whatsapp number",
                reason: "must contain only digits",
            });
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The listing fields quoted into an enquiry
#[derive(Debug, Clone)]
pub struct EnquiryTarget {
    pub listing_id: i64,
    pub title: String,
    pub description: Option<String>,
}

/// Enquiry as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Enquiry {
    pub id: i64,
    pub listing_id: i64,
    pub message: String,
    pub whatsapp_url: String,
    pub created_at: DateTime<Utc>,
}

/// Text pre-filled into the chat
pub fn enquiry_text(target: &EnquiryTarget, message: &EnquiryMessage) -> String {
    format!(
        "Enquiry about listing #{}: {}. {}\n\nMessage:\n{}",
        target.listing_id,
        target.title,
        target.description.as_deref().unwrap_or(""),
        message.as_str()
    )
}

/// `https://wa.me/<number>?text=<percent-encoded text>`
///
/// Pure string composition; nothing is sent anywhere.
pub fn whatsapp_url(
    contact: &ContactNumber,
    target: &EnquiryTarget,
    message: &EnquiryMessage,
) -> String {
    let text = enquiry_text(target, message);
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE,
        contact.as_str(),
        urlencoding::encode(&text)
    )
}
