use axum::Router;
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::PgPool;
use uuid::Uuid;

use learnhub::router::init_router;
use learnhub::state::AppState;
use learnhub_auth::{Claims, create_access_token};
use learnhub_config::{CorsConfig, JwtConfig};
use learnhub_core::hash_password;

pub fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// Creates a user. `role` is "learner" or "admin".
pub async fn create_test_user(
    pool: &PgPool,
    role: &str,
    is_email_verified: bool,
) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password("testpass123").unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO users (first_name, last_name, email, password, role, is_email_verified)
           VALUES ('Test', 'User', $1, $2, $3::user_role, $4)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(is_email_verified)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        role: role.to_string(),
    }
}

pub async fn create_course_with_module(pool: &PgPool, lesson_count: i32) -> (Uuid, Uuid) {
    let course_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO courses (title) VALUES ('Test Course') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let module_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO course_modules (course_id, title, lesson_count)
         VALUES ($1, 'Test Module', $2) RETURNING id",
    )
    .bind(course_id)
    .bind(lesson_count)
    .fetch_one(pool)
    .await
    .unwrap();

    (course_id, module_id)
}

#[allow(dead_code)]
pub async fn enroll(pool: &PgPool, user_id: Uuid, course_id: Uuid) {
    sqlx::query("INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await
        .unwrap();
}

#[allow(dead_code)]
pub async fn add_progress(pool: &PgPool, user_id: Uuid, course_id: Uuid, module_id: Uuid) {
    sqlx::query(
        "INSERT INTO progress (user_id, course_id, module_id, completed_lessons)
         VALUES ($1, $2, $3, 1)",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(module_id)
    .execute(pool)
    .await
    .unwrap();
}

/// Mints a valid access token for the user.
pub fn mint_token(user: &TestUser) -> String {
    dotenvy::dotenv().ok();
    create_access_token(user.id, &user.role, &JwtConfig::from_env()).unwrap()
}

/// Mints a token whose expiry is two hours in the past, signed with the
/// real secret so only the expiry check fails.
#[allow(dead_code)]
pub fn mint_expired_token(user: &TestUser) -> String {
    dotenvy::dotenv().ok();
    let config = JwtConfig::from_env();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: now - 7200,
        iat: now - 10800,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
