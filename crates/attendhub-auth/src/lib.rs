//! # attendhub-auth
//!
//! Access control primitives that gate the check-in surface.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token issuing and fail-closed validation
//! - `rate_limit`: per-client token-bucket admission control

pub mod jwt;
pub mod rate_limit;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenError, TokenPair};
pub use rate_limit::RateLimiter;
