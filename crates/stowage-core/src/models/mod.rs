//! Domain models shared by the store, worker and API crates.

mod job;
mod node;
mod thumbnail;
mod user;

pub use job::*;
pub use node::*;
pub use thumbnail::*;
pub use user::*;
