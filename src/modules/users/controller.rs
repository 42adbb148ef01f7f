use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    CourseProgressReport, EnrolledCourse, UpdateProfileDto, UserProfile,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The caller's profile", body = UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::get_profile(&state.db, user.id).await?;

    Ok(Json(profile))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Validation failed, every violated field listed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::update_profile(&state.db, user.id, dto).await?;

    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/users/me/courses",
    responses(
        (status = 200, description = "Enrolled courses with progress summaries", body = Vec<EnrolledCourse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_enrolled_courses(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<EnrolledCourse>>, AppError> {
    let courses = UserService::enrolled_courses(&state.db, user.id).await?;

    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/users/me/courses/{course_id}/progress",
    params(
        ("course_id" = Uuid, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Progress report for the course", body = CourseProgressReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not enrolled in this course"),
        (status = 404, description = "Course or progress not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_progress(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseProgressReport>, AppError> {
    let report = UserService::course_progress(&state.db, &user, course_id).await?;

    Ok(Json(report))
}
