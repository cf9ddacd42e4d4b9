//! Middleware stack for the query gateway.
//!
//! Order (outermost first): CORS → per-route RateLimit → handler.

pub mod cors;
pub mod rate_limit;

pub use cors::create_cors_layer;
pub use rate_limit::{cleanup_task, RateLimitLayer, RateLimitService, RateLimitState};
