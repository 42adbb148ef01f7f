use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use learnhub_core::errors::FieldError;
use learnhub_core::pagination::{PageMeta, PageParams};

use crate::modules::reviews::model::{
    AdminReviewEntry, AdminReviewFilterParams, AdminReviewRow, AllReviewsAdminResponse,
    AppliedFilters, MessageResponse, ModuleReviewsAdminResponse, ModuleSummary, PublicReviewEntry,
    PublicReviewer, PublicReviewsResponse, RatingBucket, ReviewData, ReviewSummary, ReviewerInfo,
    SubmitReviewDto, TitledRef,
};
use crate::modules::users::model::{
    CourseProgressReport, EnrolledCourse, ModuleProgress, UpdateProfileDto, UserProfile, UserRole,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::reviews::controller::submit_review,
        crate::modules::reviews::controller::get_my_review,
        crate::modules::reviews::controller::delete_my_review,
        crate::modules::reviews::controller::delete_review_admin,
        crate::modules::reviews::controller::get_public_reviews,
        crate::modules::reviews::controller::get_module_reviews_admin,
        crate::modules::reviews::controller::get_all_reviews_admin,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::get_enrolled_courses,
        crate::modules::users::controller::get_course_progress,
    ),
    components(
        schemas(
            SubmitReviewDto,
            ReviewData,
            MessageResponse,
            PublicReviewer,
            PublicReviewEntry,
            ReviewerInfo,
            AdminReviewEntry,
            RatingBucket,
            ReviewSummary,
            ModuleSummary,
            TitledRef,
            PublicReviewsResponse,
            ModuleReviewsAdminResponse,
            AdminReviewRow,
            AppliedFilters,
            AllReviewsAdminResponse,
            AdminReviewFilterParams,
            UserProfile,
            UserRole,
            UpdateProfileDto,
            EnrolledCourse,
            ModuleProgress,
            CourseProgressReport,
            PageMeta,
            PageParams,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Reviews", description = "Module review lifecycle and listings"),
        (name = "Users", description = "Profile and course progress endpoints")
    ),
    info(
        title = "Learnhub API",
        version = "0.1.0",
        description = "E-learning platform API: authentication, module reviews, and course progress.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
