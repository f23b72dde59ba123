//! HTTP middleware
//!
//! Cross-cutting request handling applied around the route handlers:
//!
//! - [`rate_limit`]: token bucket rate limiting per client and endpoint class
//! - [`security`]: security response headers

pub mod rate_limit;
pub mod security;
