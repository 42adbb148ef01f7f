use axum::{
    Router,
    routing::get,
};

use crate::state::AppState;

use super::controller::{get_course_progress, get_enrolled_courses, get_profile, update_profile};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile).patch(update_profile))
        .route("/me/courses", get(get_enrolled_courses))
        .route("/me/courses/{course_id}/progress", get(get_course_progress))
}
