//! Role and email-verification gates.
//!
//! Pure predicates applied after identity resolution, plus extractor forms
//! for routes where the gate is the whole story. All gates are
//! side-effect-free and composable; the first failure short-circuits.

use axum::{extract::FromRequestParts, http::request::Parts};

use learnhub_core::AppError;

use crate::middleware::auth::{AuthUser, Identity};
use crate::modules::users::model::UserRole;
use crate::state::AppState;

/// Checks that an attached identity's role is one of `allowed`.
///
/// No identity at all is an authentication problem (401), a present
/// identity with the wrong role is an authorization problem (403).
pub fn require_role(role: Option<UserRole>, allowed: &[UserRole]) -> Result<(), AppError> {
    match role {
        None => Err(AppError::unauthorized(anyhow::anyhow!(
            "Authentication required"
        ))),
        Some(role) if !allowed.contains(&role) => Err(AppError::forbidden(anyhow::anyhow!(
            "You do not have permission to perform this action"
        ))),
        Some(_) => Ok(()),
    }
}

/// Checks that an attached identity has a verified email address.
pub fn require_email_verified(identity: Option<&Identity>) -> Result<(), AppError> {
    match identity {
        None => Err(AppError::unauthorized(anyhow::anyhow!(
            "Authentication required"
        ))),
        Some(identity) if !identity.is_email_verified => Err(AppError::forbidden(
            anyhow::anyhow!("Please verify your email first"),
        )),
        Some(_) => Ok(()),
    }
}

/// Extractor for admin-only routes.
///
/// Resolves the full identity, then rejects with 403 unless the user is an
/// admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        require_role(Some(identity.role), &[UserRole::Admin])?;

        Ok(RequireAdmin(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn identity(role: UserRole, verified: bool) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role,
            is_email_verified: verified,
            enrolled_courses: vec![],
        }
    }

    #[test]
    fn test_require_role_accepts_allowed_role() {
        assert!(require_role(Some(UserRole::Admin), &[UserRole::Admin]).is_ok());
    }

    #[test]
    fn test_require_role_rejects_learner_from_admin_gate() {
        let err = require_role(Some(UserRole::Learner), &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_role_rejects_anonymous_with_401() {
        let err = require_role(None, &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_role_multiple_allowed() {
        assert!(require_role(Some(UserRole::Learner), &[UserRole::Learner, UserRole::Admin]).is_ok());
    }

    #[test]
    fn test_require_email_verified_accepts_verified() {
        let id = identity(UserRole::Learner, true);
        assert!(require_email_verified(Some(&id)).is_ok());
    }

    #[test]
    fn test_require_email_verified_rejects_unverified_with_403() {
        let id = identity(UserRole::Learner, false);
        let err = require_email_verified(Some(&id)).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_require_email_verified_rejects_anonymous_with_401() {
        let err = require_email_verified(None).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
