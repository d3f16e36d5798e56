//! Domain models with validation at construction
//!
//! Form and JSON input is turned into these types before any mutation.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod listing;
pub mod enquiry;
pub mod upload;

pub use validation::ValidationError;
pub use listing::{
    Listing, ListingDetails, ListingForm, ListingSubmission, NewListing, OwnerContact,
};
pub use enquiry::{ContactNumber, Enquiry, EnquiryMessage, EnquiryTarget};
pub use upload::{UploadRole, UploadedFile};
