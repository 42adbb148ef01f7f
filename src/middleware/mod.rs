//! Middleware and extractors for authentication and authorization.
//!
//! - [`auth`]: identity resolution from bearer credentials (mandatory and
//!   optional variants)
//! - [`role`]: role and email-verification gates applied after identity
//!   resolution
//!
//! # Request flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] (or [`auth::OptionalAuthUser`]) verifies the token
//!    and resolves the identity
//! 3. Role/verification gates reject or pass
//! 4. The handler receives the identity as an explicit value
//!
//! Each step returns either a resolved value or a terminal
//! [`AppError`](learnhub_core::AppError); the first failure short-circuits.

pub mod auth;
pub mod role;
