//! `ledgerly-auth`: credential hashing and stateless session tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod principal;
pub mod token;
pub mod user;

pub use claims::{AuthError, SessionClaims, validate_claims};
pub use password::{PasswordError, PasswordHasher};
pub use principal::Principal;
pub use token::{DEFAULT_TOKEN_TTL_SECS, Hs256SessionTokens, JwtValidator, TokenIssueError};
pub use user::{MAX_USERNAME_LEN, NewUser, User};
