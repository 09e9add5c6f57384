use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{admin, chats, feedback, notifications, swaps, users};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(auth::health))
        .route("/auth/signin", post(auth::sign_in));

    let protected_routes = Router::new()
        .route("/me", get(users::me))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user).put(users::update_profile))
        .route(
            "/swap-requests",
            get(swaps::list_swap_requests).post(swaps::create_swap_request),
        )
        .route("/swap-requests/{id}/status", post(swaps::update_status))
        .route("/swap-requests/{id}/complete", post(swaps::complete))
        .route(
            "/swap-requests/{id}/feedback",
            get(feedback::list_feedback).post(feedback::submit_feedback),
        )
        .route("/swap-requests/{id}/feedback/mine", get(feedback::my_feedback_exists))
        .route("/chats", get(chats::list_chats))
        .route("/chats/{id}", get(chats::get_chat))
        .route(
            "/chats/{id}/messages",
            get(chats::get_messages).post(chats::send_message),
        )
        .route("/chats/{id}/clear", post(chats::clear_chat))
        .route("/chats/{id}/complete", post(chats::mark_cleared))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/admin", put(admin::set_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
