use axum::routing::{get, patch, post};
use axum::Router;

use super::{
    auth, boards, comments, email, faqs, letters, likes, lookups, photos, profiles, reports,
    reviews, specs, AppState,
};

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health))
        // Auth
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signout", post(auth::signout))
        .route("/auth/password/change", post(auth::change_password))
        // Profiles
        .route("/profiles/:no", get(profiles::read_profile))
        .route("/profiles", patch(profiles::update_profile))
        // Photo upload
        .route("/photos/:folder", post(photos::upload))
        // Boards
        .route("/boards", get(boards::filter).post(boards::create))
        .route("/boards/search", get(boards::search))
        .route("/boards/hot", get(boards::hot))
        .route("/boards/category/:no", get(boards::by_category))
        .route("/boards/user/:no", get(boards::by_user))
        .route(
            "/boards/:no",
            get(boards::read).patch(boards::update).delete(boards::remove),
        )
        .route("/boards/:no/close", patch(boards::close))
        .route("/boards/:no/cancel", patch(boards::cancel_close))
        .route(
            "/boards/:no/comments",
            get(comments::list).post(comments::create),
        )
        // Comments & replies
        .route(
            "/comments/:no",
            patch(comments::update).delete(comments::remove),
        )
        .route("/comments/:no/replies", post(comments::create_reply))
        .route("/replies/:no", axum::routing::delete(comments::remove_reply))
        // Likes
        .route("/like/user", post(likes::like_user))
        .route("/like/board/:no", post(likes::like_board))
        // Reviews
        .route("/reviews", post(reviews::create))
        .route("/reviews/check/:board_no", get(reviews::check_duplicate))
        .route("/reviews/:target_user_no", get(reviews::list_for_user))
        // Reports
        .route("/reports", post(reports::create))
        .route("/reports/checkboxes", get(reports::list_checkboxes))
        .route("/reports/board/:no", get(reports::read_board_report))
        .route("/reports/user/:no", get(reports::read_user_report))
        // FAQs
        .route("/faqs", get(faqs::list).post(faqs::create))
        .route("/faqs/search", get(faqs::search))
        .route("/faqs/:no", patch(faqs::update).delete(faqs::remove))
        // Letters
        .route("/letters", post(letters::send))
        .route("/letters/:other_no", get(letters::conversation))
        // Specs
        .route("/specs", post(specs::create))
        .route("/specs/user/:no", get(specs::list_for_user))
        .route(
            "/specs/:no",
            get(specs::read).patch(specs::update).delete(specs::remove),
        )
        // Email
        .route("/email/forget-password", post(email::forget_password))
        .route("/email/question", post(email::question))
        // Lookups
        .route("/schools", get(lookups::schools))
        .route("/majors", get(lookups::majors))
        .route("/areas", get(lookups::areas))
        .route("/categories", get(lookups::categories))
        .route("/categories/hot", get(lookups::hot_categories))
}

async fn health() -> &'static str {
    "OK"
}
