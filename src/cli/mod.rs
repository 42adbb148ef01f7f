//! CLI commands that bypass the HTTP surface.
//!
//! Admin accounts are never created through the API; `create-admin` is the
//! only way to bootstrap one.

use sqlx::PgPool;
use uuid::Uuid;

use learnhub_core::{AppError, hash_password};

/// Creates an admin user with a verified email.
pub async fn create_admin(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, AppError> {
    let hashed = hash_password(password)?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO users (first_name, last_name, email, password, role, is_email_verified)
           VALUES ($1, $2, $3, $4, 'admin', TRUE)
           RETURNING id"#,
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(&hashed)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return AppError::bad_request(anyhow::anyhow!(
                "A user with this email already exists"
            ));
        }
        AppError::from(e)
    })?;

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::model::UserRole;
    use axum::http::StatusCode;
    use learnhub_core::verify_password;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_admin(pool: PgPool) {
        let email = format!("admin-{}@test.com", Uuid::new_v4());
        let user_id = create_admin(&pool, "Root", "Admin", &email, "s3cure-pass")
            .await
            .unwrap();

        let (role, verified, password): (UserRole, bool, String) = sqlx::query_as(
            "SELECT role, is_email_verified, password FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(role, UserRole::Admin);
        assert!(verified);
        assert!(verify_password("s3cure-pass", &password).unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_admin_duplicate_email(pool: PgPool) {
        let email = format!("admin-{}@test.com", Uuid::new_v4());
        create_admin(&pool, "Root", "Admin", &email, "s3cure-pass")
            .await
            .unwrap();

        let result = create_admin(&pool, "Other", "Admin", &email, "s3cure-pass").await;

        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
