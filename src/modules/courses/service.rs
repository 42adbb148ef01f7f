use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;

use crate::modules::courses::model::{Course, CourseModule};

pub struct CourseService;

impl CourseService {
    /// Looks up a non-deleted course by id.
    #[instrument(skip(db))]
    pub async fn find_course(db: &PgPool, course_id: Uuid) -> Result<Course, AppError> {
        let course = sqlx::query_as::<_, Course>(
            r#"SELECT id, title, description, is_deleted, created_at, updated_at
               FROM courses
               WHERE id = $1 AND is_deleted = FALSE"#,
        )
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;

        Ok(course)
    }

    /// Looks up a non-deleted module, scoped to its course.
    ///
    /// The course scope is part of the lookup key so a module id cannot be
    /// addressed through another course's URL.
    #[instrument(skip(db))]
    pub async fn find_module(
        db: &PgPool,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<CourseModule, AppError> {
        let module = sqlx::query_as::<_, CourseModule>(
            r#"SELECT id, course_id, title, lesson_count, average_rating, is_deleted,
                      created_at, updated_at
               FROM course_modules
               WHERE id = $1 AND course_id = $2 AND is_deleted = FALSE"#,
        )
        .bind(module_id)
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Module not found")))?;

        Ok(module)
    }

    /// All non-deleted modules of a course, oldest first.
    #[instrument(skip(db))]
    pub async fn modules_of(db: &PgPool, course_id: Uuid) -> Result<Vec<CourseModule>, AppError> {
        let modules = sqlx::query_as::<_, CourseModule>(
            r#"SELECT id, course_id, title, lesson_count, average_rating, is_deleted,
                      created_at, updated_at
               FROM course_modules
               WHERE course_id = $1 AND is_deleted = FALSE
               ORDER BY created_at"#,
        )
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn create_course(pool: &PgPool, title: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>("INSERT INTO courses (title) VALUES ($1) RETURNING id")
            .bind(title)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn create_module(pool: &PgPool, course_id: Uuid, title: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO course_modules (course_id, title) VALUES ($1, $2) RETURNING id",
        )
        .bind(course_id)
        .bind(title)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_module_success(pool: PgPool) {
        let course_id = create_course(&pool, "Rust Basics").await;
        let module_id = create_module(&pool, course_id, "Ownership").await;

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();

        assert_eq!(module.id, module_id);
        assert_eq!(module.title, "Ownership");
        assert_eq!(module.average_rating, 0.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_module_wrong_course_is_not_found(pool: PgPool) {
        let course_id = create_course(&pool, "Rust Basics").await;
        let other_course_id = create_course(&pool, "Advanced Rust").await;
        let module_id = create_module(&pool, course_id, "Ownership").await;

        let result = CourseService::find_module(&pool, other_course_id, module_id).await;

        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_module_soft_deleted_is_not_found(pool: PgPool) {
        let course_id = create_course(&pool, "Rust Basics").await;
        let module_id = create_module(&pool, course_id, "Ownership").await;

        sqlx::query("UPDATE course_modules SET is_deleted = TRUE WHERE id = $1")
            .bind(module_id)
            .execute(&pool)
            .await
            .unwrap();

        let result = CourseService::find_module(&pool, course_id, module_id).await;

        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_course_not_found(pool: PgPool) {
        let result = CourseService::find_course(&pool, Uuid::new_v4()).await;
        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_modules_of_excludes_deleted(pool: PgPool) {
        let course_id = create_course(&pool, "Rust Basics").await;
        create_module(&pool, course_id, "Ownership").await;
        let deleted_id = create_module(&pool, course_id, "Borrowing").await;

        sqlx::query("UPDATE course_modules SET is_deleted = TRUE WHERE id = $1")
            .bind(deleted_id)
            .execute(&pool)
            .await
            .unwrap();

        let modules = CourseService::modules_of(&pool, course_id).await.unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Ownership");
    }
}
