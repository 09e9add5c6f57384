use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use skillswap_engine::Actor;
use skillswap_types::api::UnreadCountResponse;
use skillswap_types::models::Notification;

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Notification>>, StatusCode> {
    let notifications = blocking(&state, move |engine| {
        engine.get_notifications(&actor.user_id.to_string())
    })
    .await?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UnreadCountResponse>, StatusCode> {
    let count = blocking(&state, move |engine| {
        engine.unread_notification_count(&actor.user_id.to_string())
    })
    .await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<String>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.mark_notification_as_read(&actor, &notification_id)
    })
    .await?;
    Ok(Reply(outcome))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| engine.mark_all_notifications_read(&actor)).await?;
    Ok(Reply(outcome))
}
