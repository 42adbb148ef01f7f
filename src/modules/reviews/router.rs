use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    delete_my_review, delete_review_admin, get_all_reviews_admin, get_module_reviews_admin,
    get_my_review, get_public_reviews, submit_review,
};

/// Routes nested under `/courses/{course_id}/modules/{module_id}/reviews`.
pub fn init_reviews_router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_review).get(get_public_reviews))
        .route("/me", get(get_my_review).delete(delete_my_review))
        .route("/admin", get(get_module_reviews_admin))
        .route("/{review_id}", delete(delete_review_admin))
}

/// Routes nested under `/admin/reviews`.
pub fn init_admin_reviews_router() -> Router<AppState> {
    Router::new().route("/", get(get_all_reviews_admin))
}
