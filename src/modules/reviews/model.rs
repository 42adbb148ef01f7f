//! Review data models, DTOs, and view models.
//!
//! A review is uniquely identified by its natural key (user, module,
//! course). The listing view models are deliberately split by audience:
//! public entries carry only the reviewer's first name, admin entries the
//! full identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use learnhub_core::pagination::{PageMeta, PageParams};
use learnhub_core::serde::{
    deserialize_bool_flag, deserialize_lenient_i64, deserialize_optional_uuid,
};
use learnhub_core::FieldError;

/// A stored module review.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ModuleReview {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub rating: i32,
    pub feedback: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw submission body.
///
/// Fields are kept as loose JSON values so type violations surface as
/// field-level validation errors instead of a body-level rejection, and so
/// every violated field can be reported at once.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmitReviewDto {
    #[schema(value_type = Option<i32>, example = 5)]
    pub rating: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub feedback: Option<Value>,
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub rating: i32,
    pub feedback: String,
}

impl SubmitReviewDto {
    /// Validates the submission exhaustively.
    ///
    /// Every violated field is reported; validation never stops at the
    /// first failure. Rules: `rating` is a required integer in 1..=5,
    /// `feedback` is an optional string (null and absent mean empty).
    pub fn validate_fields(&self) -> Result<ReviewInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let rating = match &self.rating {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("rating", "rating is required"));
                None
            }
            Some(Value::Number(n)) => match n.as_i64() {
                Some(r) if (1..=5).contains(&r) => Some(r as i32),
                Some(_) => {
                    errors.push(FieldError::new("rating", "rating must be between 1 and 5"));
                    None
                }
                None => {
                    errors.push(FieldError::new("rating", "rating must be an integer"));
                    None
                }
            },
            Some(_) => {
                errors.push(FieldError::new("rating", "rating must be a number"));
                None
            }
        };

        let feedback = match &self.feedback {
            None | Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                errors.push(FieldError::new("feedback", "feedback must be a string"));
                None
            }
        };

        match (rating, feedback) {
            (Some(rating), Some(feedback)) if errors.is_empty() => {
                Ok(ReviewInput { rating, feedback })
            }
            _ => Err(errors),
        }
    }
}

/// Review view returned to its author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewData {
    pub id: Uuid,
    pub rating: i32,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ModuleReview> for ReviewData {
    fn from(review: ModuleReview) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            feedback: review.feedback,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Reviewer as shown publicly: first name only, last name and email are
/// withheld.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicReviewer {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicReviewEntry {
    pub id: Uuid,
    pub user: PublicReviewer,
    pub rating: i32,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

/// Reviewer as shown to admins: full identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewerInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminReviewEntry {
    pub id: Uuid,
    pub user: ReviewerInfo,
    pub rating: i32,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One bucket of the 1-5 ratings histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub total_reviews: i64,
    /// Zero-filled buckets for ratings 1 through 5, ascending.
    pub rating_distribution: Vec<RatingBucket>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleSummary {
    pub id: Uuid,
    pub title: String,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TitledRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicReviewsResponse {
    pub module: ModuleSummary,
    pub summary: ReviewSummary,
    pub reviews: Vec<PublicReviewEntry>,
    pub pagination: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleReviewsAdminResponse {
    pub module: TitledRef,
    pub reviews: Vec<AdminReviewEntry>,
    pub pagination: PageMeta,
}

/// Global admin listing row: review plus full reviewer, module, and course
/// identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminReviewRow {
    pub id: Uuid,
    pub rating: i32,
    pub feedback: String,
    pub is_deleted: bool,
    pub user: ReviewerInfo,
    pub module: TitledRef,
    pub course: TitledRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The filter set actually applied to a global admin listing, echoed back
/// for traceability.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedFilters {
    pub rating: Option<i64>,
    pub course_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub search: Option<String>,
    pub show_deleted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllReviewsAdminResponse {
    pub reviews: Vec<AdminReviewRow>,
    pub pagination: PageMeta,
    pub filters: AppliedFilters,
}

/// Query parameters for the global admin listing. All filters are optional
/// and composable.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AdminReviewFilterParams {
    /// Exact rating match (1-5)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub course_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub module_id: Option<Uuid>,
    /// Case-insensitive substring match on feedback
    pub search: Option<String>,
    /// Include soft-deleted reviews (default: excluded)
    #[serde(default, deserialize_with = "deserialize_bool_flag")]
    pub show_deleted: bool,
    #[serde(flatten)]
    pub pagination: PageParams,
}

/// Path parameters for module-scoped review routes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReviewPath {
    pub course_id: Uuid,
    pub module_id: Uuid,
}

/// Path parameters for the admin delete-by-id route.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AdminReviewPath {
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub review_id: Uuid,
}
