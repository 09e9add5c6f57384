use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use skillswap_engine::Actor;
use skillswap_types::api::{ProfileUpdate, UserSearchQuery};
use skillswap_types::models::User;

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<User>, StatusCode> {
    blocking(&state, move |engine| engine.get_user_by_id(&actor.user_id.to_string()))
        .await?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<User>>, StatusCode> {
    let users = blocking(&state, move |engine| engine.get_users(query.search.as_deref())).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, StatusCode> {
    blocking(&state, move |engine| engine.get_user_by_id(&user_id))
        .await?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.update_user_profile(&actor, &user_id, update)
    })
    .await?;
    Ok(Reply(outcome))
}
