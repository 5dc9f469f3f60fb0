//! Stowage Storage Library
//!
//! Blob store abstraction and its local filesystem implementation.
//!
//! # Storage key format
//!
//! The store is a single flat directory. Originals are stored under a freshly
//! generated opaque key (a UUID v4); thumbnail variants live next to them as
//! `{key}_{width}`. Keys must not contain `/`, `..` or other path separators.
//! Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::{new_blob_key, variant_key};
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
