use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use sqlx::PgPool;
use uuid::Uuid;

use learnhub_auth::{TokenError, verify_token};
use learnhub_core::AppError;

use crate::modules::users::model::UserRole;
use crate::state::AppState;

/// Upper bound on the user lookup so a slow database surfaces as a
/// dependency failure instead of hanging the request.
const USER_LOOKUP_TIMEOUT: Duration = Duration::from_secs(20);

/// Fully resolved identity for an authenticated request.
///
/// Loaded from storage once per request and threaded into handlers as a
/// value; never persisted and never shared across requests.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub enrolled_courses: Vec<Uuid>,
}

/// Reduced identity carrying only what the credential itself asserts.
///
/// Used on optional-auth paths, which never touch the user store.
#[derive(Debug, Clone)]
pub struct ClaimIdentity {
    pub id: Uuid,
    pub role: UserRole,
}

/// Extractor for endpoints that require an authenticated user.
///
/// Verifies the bearer credential and loads the current user record.
/// Outcomes are mapped to distinct statuses: missing credential and
/// verification failures are 401, an expired credential is 406, and a
/// storage failure during the lookup is 500.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Please log in to access this resource"))
        })?;

        let claims = verify_token(token, &state.jwt_config).map_err(|e| match e {
            TokenError::Expired => {
                AppError::expired(anyhow::anyhow!("Your token has expired. Please log in again"))
            }
            TokenError::Invalid => AppError::unauthorized(anyhow::anyhow!("Authentication failed")),
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Authentication failed")))?;

        let identity = load_identity(&state.db, user_id).await?;

        Ok(AuthUser(identity))
    }
}

/// Extractor for endpoints that work with or without a credential.
///
/// A missing credential means an anonymous request, and so does any
/// invalid credential. The one failure that is *not* swallowed is expiry:
/// a client silently downgraded to anonymous after its session expired
/// would be confusing, so that still surfaces as 406.
///
/// Never performs a user lookup; the identity is claim-derived only.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<ClaimIdentity>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(OptionalAuthUser(None));
        };

        let claims = match verify_token(token, &state.jwt_config) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                return Err(AppError::expired(anyhow::anyhow!(
                    "Your token has expired. Please log in again"
                )));
            }
            Err(TokenError::Invalid) => {
                tracing::debug!("optional auth token verification failed, continuing as anonymous");
                return Ok(OptionalAuthUser(None));
            }
        };

        let identity = Uuid::parse_str(&claims.sub)
            .ok()
            .zip(UserRole::parse(&claims.role))
            .map(|(id, role)| ClaimIdentity { id, role });

        Ok(OptionalAuthUser(identity))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

/// Loads the full identity for `user_id`, bounded by [`USER_LOOKUP_TIMEOUT`].
async fn load_identity(db: &PgPool, user_id: Uuid) -> Result<Identity, AppError> {
    #[derive(sqlx::FromRow)]
    struct IdentityRow {
        id: Uuid,
        role: UserRole,
        is_email_verified: bool,
    }

    let lookup = async {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, role, is_email_verified FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let enrolled_courses =
            sqlx::query_scalar::<_, Uuid>("SELECT course_id FROM enrollments WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(db)
                .await?;

        Ok::<_, sqlx::Error>(Some(Identity {
            id: row.id,
            role: row.role,
            is_email_verified: row.is_email_verified,
            enrolled_courses,
        }))
    };

    match tokio::time::timeout(USER_LOOKUP_TIMEOUT, lookup).await {
        Err(_) => {
            tracing::error!(%user_id, "user lookup timed out");
            Err(AppError::database(anyhow::anyhow!("Database query failed")))
        }
        Ok(Err(e)) => {
            tracing::error!(%user_id, error = %e, "user lookup failed");
            Err(AppError::database(anyhow::anyhow!("Database query failed")))
        }
        Ok(Ok(None)) => Err(AppError::unauthorized(anyhow::anyhow!(
            "User no longer exists"
        ))),
        Ok(Ok(Some(identity))) => Ok(identity),
    }
}
