//! Stowage API Library
//!
//! HTTP handlers, session middleware, the file service and application setup.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::ErrorResponse;
pub use setup::{initialize_app, Application};
pub use state::AppState;
