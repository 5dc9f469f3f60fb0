//! API constants

/// Nodes per page in `GET /files`.
pub const PAGE_SIZE: i64 = 20;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// Upper bound for each dependency check in `GET /status`.
pub const STATUS_CHECK_TIMEOUT_SECS: u64 = 5;

/// Server-level concurrency limit.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
