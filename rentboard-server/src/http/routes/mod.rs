//! Route handlers organized by resource

pub mod health;
pub mod pages;
pub mod listings;
pub mod enquiries;
pub mod admin;
