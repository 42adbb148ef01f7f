use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;

use crate::middleware::auth::Identity;
use crate::modules::courses::service::CourseService;
use crate::modules::progress::service::ProgressService;
use crate::modules::users::model::{
    CourseProgressReport, EnrolledCourse, ModuleProgress, UpdateProfileDto, UserProfile,
};

const PROFILE_COLUMNS: &str = "id, first_name, last_name, email, phone_number, role, \
                               is_email_verified, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// The caller's profile, credential fields withheld.
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(profile)
    }

    /// Applies a partial profile update; absent fields keep their value.
    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"UPDATE users
               SET first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   phone_number = COALESCE($4, phone_number),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {PROFILE_COLUMNS}"#
        ))
        .bind(user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.phone_number)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(profile)
    }

    /// The caller's enrolled, non-deleted courses with a progress summary.
    #[instrument(skip(db))]
    pub async fn enrolled_courses(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<EnrolledCourse>, AppError> {
        let courses = sqlx::query_as::<_, EnrolledCourse>(
            r#"SELECT c.id, c.title, c.description, e.enrolled_at,
                      COALESCE(SUM(p.completed_lessons), 0) AS completed_lessons,
                      MAX(p.last_accessed) AS last_accessed
               FROM enrollments e
               JOIN courses c ON c.id = e.course_id AND c.is_deleted = FALSE
               LEFT JOIN progress p ON p.course_id = c.id AND p.user_id = e.user_id
               WHERE e.user_id = $1
               GROUP BY c.id, c.title, c.description, e.enrolled_at
               ORDER BY e.enrolled_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(courses)
    }

    /// Progress report for one enrolled course.
    ///
    /// Overall progress is completed lessons over total lessons across the
    /// course's modules. A course with zero lessons reports 0% rather than
    /// dividing by zero.
    #[instrument(skip(db, user))]
    pub async fn course_progress(
        db: &PgPool,
        user: &Identity,
        course_id: Uuid,
    ) -> Result<CourseProgressReport, AppError> {
        let course = CourseService::find_course(db, course_id).await?;

        if !user.enrolled_courses.contains(&course.id) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "You are not enrolled in this course"
            )));
        }

        let modules = CourseService::modules_of(db, course.id).await?;
        let records = ProgressService::for_course(db, user.id, course.id).await?;

        if records.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!("Progress not found")));
        }

        let total_lessons: i64 = modules.iter().map(|m| i64::from(m.lesson_count)).sum();
        let completed_lessons: i64 = records.iter().map(|p| i64::from(p.completed_lessons)).sum();

        let overall_progress = if total_lessons == 0 {
            0.0
        } else {
            completed_lessons as f64 / total_lessons as f64 * 100.0
        };

        let module_progress = modules
            .iter()
            .map(|module| ModuleProgress {
                module_id: module.id,
                module_name: module.title.clone(),
                completed_lessons: records
                    .iter()
                    .find(|p| p.module_id == module.id)
                    .map(|p| p.completed_lessons)
                    .unwrap_or(0),
                total_lessons: module.lesson_count,
            })
            .collect();

        let last_accessed = records.iter().map(|p| p.last_accessed).max();

        Ok(CourseProgressReport {
            overall_progress,
            last_accessed,
            module_progress,
        })
    }
}
