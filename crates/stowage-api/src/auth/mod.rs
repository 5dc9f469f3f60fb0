//! Authentication and authorization
//!
//! Sessions come from `GET /connect`; requests carry the token in `X-Token`.
//! [`middleware::session_middleware`] resolves it once per request, handlers
//! pick the result up through [`OwnerContext`] or [`MaybeOwner`], and every
//! per-node decision goes through [`policy::authorize`].

pub mod basic;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;

pub use models::{MaybeOwner, OwnerContext};
pub use policy::{authorize, Access, Authorization};
