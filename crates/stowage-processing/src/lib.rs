//! Stowage Processing Library
//!
//! Image thumbnail rendering and content-type inference for stored blobs.

pub mod content_type;
pub mod thumbnail;

pub use content_type::content_type_for;
pub use thumbnail::{ProcessingError, ThumbnailRenderer};
