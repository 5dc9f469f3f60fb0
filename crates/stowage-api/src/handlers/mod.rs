pub mod files;
pub mod session;
pub mod status;
pub mod users;
