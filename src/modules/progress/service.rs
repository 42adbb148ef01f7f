use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;

use crate::modules::progress::model::ProgressRecord;

pub struct ProgressService;

impl ProgressService {
    /// Whether the user has a completion record for this module.
    ///
    /// Deliberately uncached: eligibility can change between checks, so
    /// every call hits storage.
    #[instrument(skip(db))]
    pub async fn has_completed(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                 SELECT 1 FROM progress
                 WHERE user_id = $1 AND course_id = $2 AND module_id = $3
               )"#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(module_id)
        .fetch_one(db)
        .await?;

        Ok(exists)
    }

    /// All progress records a user has within a course.
    #[instrument(skip(db))]
    pub async fn for_course(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<ProgressRecord>, AppError> {
        let records = sqlx::query_as::<_, ProgressRecord>(
            r#"SELECT id, user_id, course_id, module_id, completed_lessons, last_accessed
               FROM progress
               WHERE user_id = $1 AND course_id = $2"#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }
}
