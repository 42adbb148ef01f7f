use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use learnhub_core::AppError;
use learnhub_core::pagination::{PageMeta, PageParams};

use crate::modules::courses::model::CourseModule;
use crate::modules::reviews::model::{
    AdminReviewEntry, AdminReviewFilterParams, AdminReviewRow, AllReviewsAdminResponse,
    AppliedFilters, ModuleReview, ModuleReviewsAdminResponse, ModuleSummary, PublicReviewEntry,
    PublicReviewer, PublicReviewsResponse, RatingBucket, ReviewInput, ReviewSummary, ReviewerInfo,
    TitledRef,
};

const REVIEW_COLUMNS: &str =
    "id, user_id, course_id, module_id, rating, feedback, is_deleted, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PublicReviewJoinRow {
    id: Uuid,
    rating: i32,
    feedback: String,
    created_at: chrono::DateTime<chrono::Utc>,
    first_name: String,
}

#[derive(sqlx::FromRow)]
struct AdminReviewJoinRow {
    id: Uuid,
    rating: i32,
    feedback: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct AllReviewJoinRow {
    id: Uuid,
    rating: i32,
    feedback: String,
    is_deleted: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    module_id: Uuid,
    module_title: String,
    course_id: Uuid,
    course_title: String,
}

pub struct ReviewService;

impl ReviewService {
    /// Creates or updates the caller's review for a module.
    ///
    /// The upsert targets the (user, module, course) unique key, so
    /// concurrent submissions serialize in the database and the store ends
    /// with a single row. A previously soft-deleted review is revived by
    /// resubmission: `is_deleted` flips back to false. That is part of the
    /// observable contract, not an accident.
    #[instrument(skip(db, input))]
    pub async fn submit(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
        input: ReviewInput,
    ) -> Result<ModuleReview, AppError> {
        let review = sqlx::query_as::<_, ModuleReview>(&format!(
            r#"INSERT INTO module_reviews (user_id, course_id, module_id, rating, feedback)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (user_id, module_id, course_id)
               DO UPDATE SET rating = EXCLUDED.rating,
                             feedback = EXCLUDED.feedback,
                             is_deleted = FALSE,
                             updated_at = NOW()
               RETURNING {REVIEW_COLUMNS}"#
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(module_id)
        .bind(input.rating)
        .bind(&input.feedback)
        .fetch_one(db)
        .await?;

        Self::refresh_module_rating(db, course_id, module_id).await;

        Ok(review)
    }

    /// The caller's own non-deleted review, if any. Absence is a normal
    /// state, not an error.
    #[instrument(skip(db))]
    pub async fn fetch_own(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<ModuleReview>, AppError> {
        let review = sqlx::query_as::<_, ModuleReview>(&format!(
            r#"SELECT {REVIEW_COLUMNS} FROM module_reviews
               WHERE user_id = $1 AND course_id = $2 AND module_id = $3 AND is_deleted = FALSE"#
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(module_id)
        .fetch_optional(db)
        .await?;

        Ok(review)
    }

    /// Soft-deletes the caller's review. The row is kept; it just drops out
    /// of every default read path.
    #[instrument(skip(db))]
    pub async fn soft_delete(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<ModuleReview, AppError> {
        let review = sqlx::query_as::<_, ModuleReview>(&format!(
            r#"UPDATE module_reviews
               SET is_deleted = TRUE, updated_at = NOW()
               WHERE user_id = $1 AND course_id = $2 AND module_id = $3 AND is_deleted = FALSE
               RETURNING {REVIEW_COLUMNS}"#
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(module_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Review not found")))?;

        Self::refresh_module_rating(db, course_id, module_id).await;

        Ok(review)
    }

    /// Administrative soft-delete keyed by review id.
    ///
    /// Still scoped to course and module so an id from another module
    /// cannot be deleted through this URL.
    #[instrument(skip(db))]
    pub async fn soft_delete_by_id(
        db: &PgPool,
        review_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<ModuleReview, AppError> {
        let review = sqlx::query_as::<_, ModuleReview>(&format!(
            r#"UPDATE module_reviews
               SET is_deleted = TRUE, updated_at = NOW()
               WHERE id = $1 AND course_id = $2 AND module_id = $3 AND is_deleted = FALSE
               RETURNING {REVIEW_COLUMNS}"#
        ))
        .bind(review_id)
        .bind(course_id)
        .bind(module_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Review not found")))?;

        Self::refresh_module_rating(db, course_id, module_id).await;

        Ok(review)
    }

    /// Public listing: non-deleted reviews, newest first, reviewer reduced
    /// to a first name, plus the ratings histogram.
    #[instrument(skip(db, module))]
    pub async fn list_public(
        db: &PgPool,
        module: &CourseModule,
        params: &PageParams,
    ) -> Result<PublicReviewsResponse, AppError> {
        let page = params.page();
        let limit = params.limit();

        let total = Self::count_for_module(db, module).await?;

        let rows = sqlx::query_as::<_, PublicReviewJoinRow>(
            r#"SELECT r.id, r.rating, r.feedback, r.created_at, u.first_name
               FROM module_reviews r
               JOIN users u ON u.id = r.user_id
               WHERE r.module_id = $1 AND r.course_id = $2 AND r.is_deleted = FALSE
               ORDER BY r.created_at DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(module.id)
        .bind(module.course_id)
        .bind(limit)
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        let rating_distribution =
            Self::rating_distribution(db, module.course_id, module.id).await?;

        let reviews = rows
            .into_iter()
            .map(|row| PublicReviewEntry {
                id: row.id,
                user: PublicReviewer {
                    name: row.first_name,
                },
                rating: row.rating,
                feedback: row.feedback,
                created_at: row.created_at,
            })
            .collect();

        Ok(PublicReviewsResponse {
            module: ModuleSummary {
                id: module.id,
                title: module.title.clone(),
                average_rating: module.average_rating,
            },
            summary: ReviewSummary {
                total_reviews: total,
                rating_distribution,
            },
            reviews,
            pagination: PageMeta::new(page, limit, total),
        })
    }

    /// Admin listing for one module: full reviewer identity, no histogram.
    #[instrument(skip(db, module))]
    pub async fn list_for_module_admin(
        db: &PgPool,
        module: &CourseModule,
        params: &PageParams,
    ) -> Result<ModuleReviewsAdminResponse, AppError> {
        let page = params.page();
        let limit = params.limit();

        let total = Self::count_for_module(db, module).await?;

        let rows = sqlx::query_as::<_, AdminReviewJoinRow>(
            r#"SELECT r.id, r.rating, r.feedback, r.created_at, r.updated_at,
                      u.id AS user_id, u.first_name, u.last_name, u.email
               FROM module_reviews r
               JOIN users u ON u.id = r.user_id
               WHERE r.module_id = $1 AND r.course_id = $2 AND r.is_deleted = FALSE
               ORDER BY r.created_at DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(module.id)
        .bind(module.course_id)
        .bind(limit)
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        let reviews = rows
            .into_iter()
            .map(|row| AdminReviewEntry {
                id: row.id,
                user: ReviewerInfo {
                    id: row.user_id,
                    name: format!("{} {}", row.first_name, row.last_name),
                    email: row.email,
                },
                rating: row.rating,
                feedback: row.feedback,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect();

        Ok(ModuleReviewsAdminResponse {
            module: TitledRef {
                id: module.id,
                title: module.title.clone(),
            },
            reviews,
            pagination: PageMeta::new(page, limit, total),
        })
    }

    /// Global admin listing across every course and module.
    ///
    /// Filters compose; soft-deleted rows are excluded unless
    /// `show_deleted` is set. The applied filter set is echoed back.
    #[instrument(skip(db, filters))]
    pub async fn list_all_admin(
        db: &PgPool,
        filters: &AdminReviewFilterParams,
    ) -> Result<AllReviewsAdminResponse, AppError> {
        let page = filters.pagination.page();
        let limit = filters.pagination.limit();

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM module_reviews r");
        Self::apply_admin_filters(&mut count_query, filters);
        let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

        let mut data_query = QueryBuilder::<Postgres>::new(
            r#"SELECT r.id, r.rating, r.feedback, r.is_deleted, r.created_at, r.updated_at,
                      u.id AS user_id, u.first_name, u.last_name, u.email,
                      m.id AS module_id, m.title AS module_title,
                      c.id AS course_id, c.title AS course_title
               FROM module_reviews r
               JOIN users u ON u.id = r.user_id
               JOIN course_modules m ON m.id = r.module_id
               JOIN courses c ON c.id = r.course_id"#,
        );
        Self::apply_admin_filters(&mut data_query, filters);
        data_query.push(" ORDER BY r.created_at DESC");
        data_query.push(" LIMIT ").push_bind(limit);
        data_query.push(" OFFSET ").push_bind(filters.pagination.offset());

        let rows: Vec<AllReviewJoinRow> = data_query.build_query_as().fetch_all(db).await?;

        let reviews = rows
            .into_iter()
            .map(|row| AdminReviewRow {
                id: row.id,
                rating: row.rating,
                feedback: row.feedback,
                is_deleted: row.is_deleted,
                user: ReviewerInfo {
                    id: row.user_id,
                    name: format!("{} {}", row.first_name, row.last_name),
                    email: row.email,
                },
                module: TitledRef {
                    id: row.module_id,
                    title: row.module_title,
                },
                course: TitledRef {
                    id: row.course_id,
                    title: row.course_title,
                },
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect();

        Ok(AllReviewsAdminResponse {
            reviews,
            pagination: PageMeta::new(page, limit, total),
            filters: AppliedFilters {
                rating: filters.rating,
                course_id: filters.course_id,
                module_id: filters.module_id,
                search: filters.search.clone(),
                show_deleted: filters.show_deleted,
            },
        })
    }

    /// Grouped count of non-deleted reviews by rating, zero-filled for the
    /// full 1-5 range and sorted by rating ascending.
    #[instrument(skip(db))]
    pub async fn rating_distribution(
        db: &PgPool,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<Vec<RatingBucket>, AppError> {
        let counts = sqlx::query_as::<_, (i32, i64)>(
            r#"SELECT rating, COUNT(*) FROM module_reviews
               WHERE module_id = $1 AND course_id = $2 AND is_deleted = FALSE
               GROUP BY rating
               ORDER BY rating"#,
        )
        .bind(module_id)
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(zero_filled(&counts))
    }

    async fn count_for_module(db: &PgPool, module: &CourseModule) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM module_reviews
               WHERE module_id = $1 AND course_id = $2 AND is_deleted = FALSE"#,
        )
        .bind(module.id)
        .bind(module.course_id)
        .fetch_one(db)
        .await?;

        Ok(total)
    }

    fn apply_admin_filters(
        query: &mut QueryBuilder<'_, Postgres>,
        filters: &AdminReviewFilterParams,
    ) {
        query.push(" WHERE TRUE");

        if !filters.show_deleted {
            query.push(" AND r.is_deleted = FALSE");
        }
        if let Some(rating) = filters.rating {
            query.push(" AND r.rating = ").push_bind(rating);
        }
        if let Some(course_id) = filters.course_id {
            query.push(" AND r.course_id = ").push_bind(course_id);
        }
        if let Some(module_id) = filters.module_id {
            query.push(" AND r.module_id = ").push_bind(module_id);
        }
        if let Some(search) = &filters.search {
            query
                .push(" AND r.feedback ILIKE ")
                .push_bind(format!("%{}%", search));
        }
    }

    /// Recomputes the module's stored average rating from its non-deleted
    /// reviews. A failure here must not fail the review operation that
    /// triggered it; it is logged and swallowed.
    async fn refresh_module_rating(db: &PgPool, course_id: Uuid, module_id: Uuid) {
        let result = sqlx::query(
            r#"UPDATE course_modules
               SET average_rating = COALESCE(
                     (SELECT AVG(rating)::DOUBLE PRECISION FROM module_reviews
                      WHERE module_id = $1 AND course_id = $2 AND is_deleted = FALSE),
                     0),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(module_id)
        .bind(course_id)
        .execute(db)
        .await;

        if let Err(e) = result {
            tracing::warn!(%module_id, error = %e, "failed to refresh module average rating");
        }
    }
}

fn zero_filled(counts: &[(i32, i64)]) -> Vec<RatingBucket> {
    (1..=5)
        .map(|rating| RatingBucket {
            rating,
            count: counts
                .iter()
                .find(|(r, _)| *r == rating)
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::courses::service::CourseService;
    use axum::http::StatusCode;

    fn input(rating: i32, feedback: &str) -> ReviewInput {
        ReviewInput {
            rating,
            feedback: feedback.to_string(),
        }
    }

    fn page(page: i64, limit: i64) -> PageParams {
        PageParams {
            page: Some(page),
            limit: Some(limit),
        }
    }

    async fn seed_user(pool: &PgPool, first_name: &str, last_name: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO users (first_name, last_name, email, password)
               VALUES ($1, $2, $3, 'hashed') RETURNING id"#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(format!("test-{}@test.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_course_module(pool: &PgPool) -> (Uuid, Uuid) {
        let course_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO courses (title) VALUES ('Rust Basics') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let module_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO course_modules (course_id, title) VALUES ($1, 'Ownership') RETURNING id",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (course_id, module_id)
    }

    async fn count_rows(pool: &PgPool, user_id: Uuid, course_id: Uuid, module_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM module_reviews
             WHERE user_id = $1 AND course_id = $2 AND module_id = $3",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(module_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_submit_twice_is_idempotent_upsert(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        let first = ReviewService::submit(&pool, user_id, course_id, module_id, input(3, "ok"))
            .await
            .unwrap();
        let second =
            ReviewService::submit(&pool, user_id, course_id, module_id, input(5, "great"))
                .await
                .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.rating, 5);
        assert_eq!(second.feedback, "great");
        assert_eq!(count_rows(&pool, user_id, course_id, module_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_resubmit_after_soft_delete_revives_review(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        ReviewService::submit(&pool, user_id, course_id, module_id, input(2, "meh"))
            .await
            .unwrap();
        let deleted = ReviewService::soft_delete(&pool, user_id, course_id, module_id)
            .await
            .unwrap();
        assert!(deleted.is_deleted);

        let revived =
            ReviewService::submit(&pool, user_id, course_id, module_id, input(4, "better"))
                .await
                .unwrap();

        assert_eq!(revived.id, deleted.id);
        assert!(!revived.is_deleted);
        assert_eq!(revived.rating, 4);
        assert_eq!(count_rows(&pool, user_id, course_id, module_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_fetch_own_absent_is_none_not_error(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        let review = ReviewService::fetch_own(&pool, user_id, course_id, module_id)
            .await
            .unwrap();
        assert!(review.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_fetch_own_hides_soft_deleted(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        ReviewService::submit(&pool, user_id, course_id, module_id, input(4, ""))
            .await
            .unwrap();
        assert!(
            ReviewService::fetch_own(&pool, user_id, course_id, module_id)
                .await
                .unwrap()
                .is_some()
        );

        ReviewService::soft_delete(&pool, user_id, course_id, module_id)
            .await
            .unwrap();
        assert!(
            ReviewService::fetch_own(&pool, user_id, course_id, module_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_delete_without_review_is_not_found(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        let result = ReviewService::soft_delete(&pool, user_id, course_id, module_id).await;
        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_delete_twice_is_not_found(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;

        ReviewService::submit(&pool, user_id, course_id, module_id, input(4, ""))
            .await
            .unwrap();
        ReviewService::soft_delete(&pool, user_id, course_id, module_id)
            .await
            .unwrap();

        let result = ReviewService::soft_delete(&pool, user_id, course_id, module_id).await;
        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_delete_by_id_is_scoped_to_module(pool: PgPool) {
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        let (course_id, module_id) = seed_course_module(&pool).await;
        let other_module_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO course_modules (course_id, title) VALUES ($1, 'Borrowing') RETURNING id",
        )
        .bind(course_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        let review = ReviewService::submit(&pool, user_id, course_id, module_id, input(4, ""))
            .await
            .unwrap();

        // id guessing through another module's URL must not delete the row
        let result =
            ReviewService::soft_delete_by_id(&pool, review.id, course_id, other_module_id).await;
        assert_eq!(result.unwrap_err().status, StatusCode::NOT_FOUND);

        let deleted = ReviewService::soft_delete_by_id(&pool, review.id, course_id, module_id)
            .await
            .unwrap();
        assert!(deleted.is_deleted);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rating_distribution_zero_fills_buckets(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        for rating in [5, 5, 3, 1] {
            let user_id = seed_user(&pool, "Reviewer", "User").await;
            ReviewService::submit(&pool, user_id, course_id, module_id, input(rating, ""))
                .await
                .unwrap();
        }

        let distribution = ReviewService::rating_distribution(&pool, course_id, module_id)
            .await
            .unwrap();

        assert_eq!(
            distribution,
            vec![
                RatingBucket { rating: 1, count: 1 },
                RatingBucket { rating: 2, count: 0 },
                RatingBucket { rating: 3, count: 1 },
                RatingBucket { rating: 4, count: 0 },
                RatingBucket { rating: 5, count: 2 },
            ]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_public_excludes_deleted_and_redacts_reviewer(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        let visible_user = seed_user(&pool, "Ada", "Lovelace").await;
        ReviewService::submit(&pool, visible_user, course_id, module_id, input(5, "great"))
            .await
            .unwrap();

        let deleted_user = seed_user(&pool, "Grace", "Hopper").await;
        ReviewService::submit(&pool, deleted_user, course_id, module_id, input(1, "bad"))
            .await
            .unwrap();
        ReviewService::soft_delete(&pool, deleted_user, course_id, module_id)
            .await
            .unwrap();

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();
        let response = ReviewService::list_public(&pool, &module, &page(1, 10))
            .await
            .unwrap();

        assert_eq!(response.reviews.len(), 1);
        assert_eq!(response.summary.total_reviews, 1);
        assert_eq!(response.reviews[0].user.name, "Ada");

        let serialized = serde_json::to_string(&response).unwrap();
        assert!(!serialized.contains("Lovelace"));
        assert!(!serialized.contains("@test.com"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_public_newest_first(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        let first_user = seed_user(&pool, "First", "User").await;
        let first = ReviewService::submit(&pool, first_user, course_id, module_id, input(3, ""))
            .await
            .unwrap();
        // force distinct created_at ordering
        sqlx::query(
            "UPDATE module_reviews SET created_at = created_at - INTERVAL '1 hour' WHERE id = $1",
        )
        .bind(first.id)
        .execute(&pool)
        .await
        .unwrap();

        let second_user = seed_user(&pool, "Second", "User").await;
        ReviewService::submit(&pool, second_user, course_id, module_id, input(4, ""))
            .await
            .unwrap();

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();
        let response = ReviewService::list_public(&pool, &module, &page(1, 10))
            .await
            .unwrap();

        assert_eq!(response.reviews[0].user.name, "Second");
        assert_eq!(response.reviews[1].user.name, "First");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_public_pagination_formulas(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        for _ in 0..25 {
            let user_id = seed_user(&pool, "Bulk", "Reviewer").await;
            ReviewService::submit(&pool, user_id, course_id, module_id, input(4, ""))
                .await
                .unwrap();
        }

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();

        let page1 = ReviewService::list_public(&pool, &module, &page(1, 10))
            .await
            .unwrap();
        assert_eq!(page1.reviews.len(), 10);
        assert_eq!(page1.pagination.total_reviews, 25);
        assert_eq!(page1.pagination.total_pages, 3);
        assert!(page1.pagination.has_next_page);
        assert!(!page1.pagination.has_prev_page);

        let page3 = ReviewService::list_public(&pool, &module, &page(3, 10))
            .await
            .unwrap();
        assert_eq!(page3.reviews.len(), 5);
        assert!(!page3.pagination.has_next_page);
        assert!(page3.pagination.has_prev_page);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_for_module_admin_exposes_full_identity(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        ReviewService::submit(&pool, user_id, course_id, module_id, input(5, "great"))
            .await
            .unwrap();

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();
        let response = ReviewService::list_for_module_admin(&pool, &module, &page(1, 10))
            .await
            .unwrap();

        assert_eq!(response.reviews.len(), 1);
        assert_eq!(response.reviews[0].user.id, user_id);
        assert_eq!(response.reviews[0].user.name, "Ada Lovelace");
        assert!(response.reviews[0].user.email.ends_with("@test.com"));
    }

    fn admin_filters(
        rating: Option<i64>,
        search: Option<&str>,
        show_deleted: bool,
    ) -> AdminReviewFilterParams {
        AdminReviewFilterParams {
            rating,
            course_id: None,
            module_id: None,
            search: search.map(str::to_string),
            show_deleted,
            pagination: page(1, 10),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_all_admin_filters_compose(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        let five_star = seed_user(&pool, "Five", "Star").await;
        ReviewService::submit(&pool, five_star, course_id, module_id, input(5, "Loved it"))
            .await
            .unwrap();

        let two_star = seed_user(&pool, "Two", "Star").await;
        ReviewService::submit(&pool, two_star, course_id, module_id, input(2, "too fast"))
            .await
            .unwrap();

        let by_rating = ReviewService::list_all_admin(&pool, &admin_filters(Some(5), None, false))
            .await
            .unwrap();
        assert_eq!(by_rating.reviews.len(), 1);
        assert_eq!(by_rating.reviews[0].rating, 5);
        assert_eq!(by_rating.filters.rating, Some(5));

        // substring match is case-insensitive
        let by_search =
            ReviewService::list_all_admin(&pool, &admin_filters(None, Some("LOVED"), false))
                .await
                .unwrap();
        assert_eq!(by_search.reviews.len(), 1);
        assert_eq!(by_search.reviews[0].feedback, "Loved it");

        let by_both =
            ReviewService::list_all_admin(&pool, &admin_filters(Some(2), Some("loved"), false))
                .await
                .unwrap();
        assert!(by_both.reviews.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_all_admin_show_deleted_flag(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;
        let user_id = seed_user(&pool, "Ada", "Lovelace").await;
        ReviewService::submit(&pool, user_id, course_id, module_id, input(3, ""))
            .await
            .unwrap();
        ReviewService::soft_delete(&pool, user_id, course_id, module_id)
            .await
            .unwrap();

        let hidden = ReviewService::list_all_admin(&pool, &admin_filters(None, None, false))
            .await
            .unwrap();
        assert!(hidden.reviews.is_empty());
        assert_eq!(hidden.pagination.total_reviews, 0);

        let shown = ReviewService::list_all_admin(&pool, &admin_filters(None, None, true))
            .await
            .unwrap();
        assert_eq!(shown.reviews.len(), 1);
        assert!(shown.reviews[0].is_deleted);
        assert_eq!(shown.reviews[0].module.title, "Ownership");
        assert_eq!(shown.reviews[0].course.title, "Rust Basics");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_average_rating_tracks_submissions_and_deletes(pool: PgPool) {
        let (course_id, module_id) = seed_course_module(&pool).await;

        let first_user = seed_user(&pool, "A", "B").await;
        ReviewService::submit(&pool, first_user, course_id, module_id, input(5, ""))
            .await
            .unwrap();
        let second_user = seed_user(&pool, "C", "D").await;
        ReviewService::submit(&pool, second_user, course_id, module_id, input(3, ""))
            .await
            .unwrap();

        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();
        assert_eq!(module.average_rating, 4.0);

        ReviewService::soft_delete(&pool, second_user, course_id, module_id)
            .await
            .unwrap();
        let module = CourseService::find_module(&pool, course_id, module_id)
            .await
            .unwrap();
        assert_eq!(module.average_rating, 5.0);
    }

    #[test]
    fn test_zero_filled_histogram() {
        let buckets = zero_filled(&[(1, 1), (3, 1), (5, 2)]);
        assert_eq!(
            buckets,
            vec![
                RatingBucket { rating: 1, count: 1 },
                RatingBucket { rating: 2, count: 0 },
                RatingBucket { rating: 3, count: 1 },
                RatingBucket { rating: 4, count: 0 },
                RatingBucket { rating: 5, count: 2 },
            ]
        );
    }

    #[test]
    fn test_zero_filled_empty_input() {
        let buckets = zero_filled(&[]);
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.count == 0));
        assert_eq!(buckets[0].rating, 1);
        assert_eq!(buckets[4].rating, 5);
    }
}
