//! JWT token encoding, decoding, and claims management.
//!
//! Every token is signed with HS256 and nothing else; [`decoder::parse`]
//! rejects any token whose header names a different algorithm.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use claims::{Claims, TokenType};
pub use decoder::{JwtDecoder, parse};
pub use encoder::{JwtEncoder, TokenPair, issue};
pub use error::TokenError;

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: jsonwebtoken::Algorithm = jsonwebtoken::Algorithm::HS256;

/// Role claim carried by device tokens.
pub const DEVICE_ROLE: &str = "device";
