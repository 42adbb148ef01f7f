use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A learner's progress within one module of a course.
///
/// The existence of a row for (user, course, module) is what makes that
/// user eligible to review the module; this core reads these records but
/// does not own their lifecycle.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub completed_lessons: i32,
    pub last_accessed: DateTime<Utc>,
}
