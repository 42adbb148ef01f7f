//! # Learnhub Auth
//!
//! Credential verification for the Learnhub API.
//!
//! This crate owns the JWT claim structure and the verifier. Verification
//! is a pure check with no side effects and no retries; the one subtlety is
//! that an expired token is a *distinct* outcome from every other failure
//! ([`TokenError::Expired`] vs [`TokenError::Invalid`]) so callers can tell
//! "log in again" apart from "forbidden".

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{TokenError, create_access_token, verify_token};
