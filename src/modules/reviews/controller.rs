use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;
use learnhub_core::pagination::PageParams;

use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::role::{self, RequireAdmin};
use crate::modules::courses::service::CourseService;
use crate::modules::progress::service::ProgressService;
use crate::modules::reviews::model::{
    AdminReviewFilterParams, AdminReviewPath, AllReviewsAdminResponse, MessageResponse,
    ModuleReviewsAdminResponse, PublicReviewsResponse, ReviewData, ReviewPath, SubmitReviewDto,
};
use crate::modules::reviews::service::ReviewService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID")
    ),
    request_body = SubmitReviewDto,
    responses(
        (status = 200, description = "Review submitted", body = ReviewData),
        (status = 400, description = "Validation failed, every violated field listed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Email unverified or module not completed"),
        (status = 404, description = "Module not found")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn submit_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
    Json(dto): Json<SubmitReviewDto>,
) -> Result<Json<ReviewData>, AppError> {
    role::require_email_verified(Some(&user))?;

    let input = dto.validate_fields().map_err(AppError::validation)?;

    CourseService::find_module(&state.db, path.course_id, path.module_id).await?;

    let completed =
        ProgressService::has_completed(&state.db, user.id, path.course_id, path.module_id).await?;
    if !completed {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "You must complete this module before reviewing it"
        )));
    }

    let review =
        ReviewService::submit(&state.db, user.id, path.course_id, path.module_id, input).await?;

    Ok(Json(ReviewData::from(review)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews/me",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "The caller's review, or null if none", body = ReviewData),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
) -> Result<Json<Option<ReviewData>>, AppError> {
    let review =
        ReviewService::fetch_own(&state.db, user.id, path.course_id, path.module_id).await?;

    Ok(Json(review.map(ReviewData::from)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews/me",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Review soft-deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No review to delete")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_my_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
) -> Result<Json<MessageResponse>, AppError> {
    ReviewService::soft_delete(&state.db, user.id, path.course_id, path.module_id).await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews/{review_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review soft-deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Module or review not found")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_review_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(path): Path<AdminReviewPath>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::find_module(&state.db, path.course_id, path.module_id).await?;

    ReviewService::soft_delete_by_id(&state.db, path.review_id, path.course_id, path.module_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Public reviews with ratings histogram", body = PublicReviewsResponse),
        (status = 404, description = "Module not found"),
        (status = 406, description = "Expired credential supplied")
    ),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn get_public_reviews(
    State(state): State<AppState>,
    OptionalAuthUser(_viewer): OptionalAuthUser,
    Path(path): Path<ReviewPath>,
    Query(params): Query<PageParams>,
) -> Result<Json<PublicReviewsResponse>, AppError> {
    let module = CourseService::find_module(&state.db, path.course_id, path.module_id).await?;

    let response = ReviewService::list_public(&state.db, &module, &params).await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/modules/{module_id}/reviews/admin",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("module_id" = Uuid, Path, description = "Module ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Module reviews with full reviewer identity", body = ModuleReviewsAdminResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Module not found")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_module_reviews_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(path): Path<ReviewPath>,
    Query(params): Query<PageParams>,
) -> Result<Json<ModuleReviewsAdminResponse>, AppError> {
    let module = CourseService::find_module(&state.db, path.course_id, path.module_id).await?;

    let response = ReviewService::list_for_module_admin(&state.db, &module, &params).await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/admin/reviews",
    params(AdminReviewFilterParams),
    responses(
        (status = 200, description = "All reviews matching the filters", body = AllReviewsAdminResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    ),
    tag = "Reviews",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_all_reviews_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filters): Query<AdminReviewFilterParams>,
) -> Result<Json<AllReviewsAdminResponse>, AppError> {
    let response = ReviewService::list_all_admin(&state.db, &filters).await?;

    Ok(Json(response))
}
