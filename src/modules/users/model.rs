//! User data models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Role a user holds on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Learner,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Learner => "learner",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<UserRole> {
        match s {
            "learner" => Some(UserRole::Learner),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// A user's own profile, with credential fields withheld.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for updating the caller's own profile.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(
        min = 2,
        max = 50,
        message = "First name must be between 2 and 50 characters long"
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 2,
        max = 50,
        message = "Last name must be between 2 and 50 characters long"
    ))]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: Option<String>,
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '.' | '(' | ')'));

    if !(7..=15).contains(&digits) || !allowed {
        let mut err = ValidationError::new("phone_number");
        err.message = Some("Please provide a valid phone number".into());
        return Err(err);
    }

    Ok(())
}

/// A course the caller is enrolled in, with a progress summary.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EnrolledCourse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub completed_lessons: i64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Per-module progress line in a course progress report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleProgress {
    pub module_id: Uuid,
    pub module_name: String,
    pub completed_lessons: i32,
    pub total_lessons: i32,
}

/// Progress report for a single enrolled course.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgressReport {
    /// Percentage of lessons completed across the whole course.
    /// Defined as 0.0 when the course has no lessons.
    pub overall_progress: f64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub module_progress: Vec<ModuleProgress>,
}
