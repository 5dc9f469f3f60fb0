//! Stowage Core Library
//!
//! Domain models, error types and configuration shared by every stowage crate.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;

pub use backend::StoreBackend;
pub use config::{Config, LogFormat, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
