use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use skillswap_engine::Actor;
use skillswap_types::api::SetAdminRequest;
use skillswap_types::models::{AdminStats, User};

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

pub async fn stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<AdminStats>, Response> {
    blocking(&state, move |engine| engine.get_admin_stats(&actor))
        .await
        .map_err(IntoResponse::into_response)?
        .map(Json)
        .map_err(|e| Reply(e.into_outcome("load admin stats", "Failed to load stats.")).into_response())
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<User>>, Response> {
    blocking(&state, move |engine| engine.get_all_users(&actor))
        .await
        .map_err(IntoResponse::into_response)?
        .map(Json)
        .map_err(|e| Reply(e.into_outcome("list all users", "Failed to load users.")).into_response())
}

pub async fn set_admin(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
    Json(req): Json<SetAdminRequest>,
) -> Result<Reply, Response> {
    let outcome = blocking(&state, move |engine| {
        engine.set_admin_status(&actor, &user_id, req.is_admin)
    })
    .await
    .map_err(IntoResponse::into_response)?;
    Ok(Reply(outcome))
}
