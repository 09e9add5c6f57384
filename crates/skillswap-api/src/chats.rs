use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use skillswap_engine::Actor;
use skillswap_types::api::SendMessageRequest;
use skillswap_types::models::{ChatSummary, Message};

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

pub async fn list_chats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ChatSummary>>, StatusCode> {
    let chats = blocking(&state, move |engine| engine.get_chats(&actor.user_id.to_string())).await?;
    Ok(Json(chats))
}

pub async fn get_chat(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatSummary>, StatusCode> {
    blocking(&state, move |engine| engine.get_chat(&actor, &chat_id))
        .await?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Messages oldest first. Non-participants get 404, same as a missing chat.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    blocking(&state, move |engine| {
        engine
            .get_chat(&actor, &chat_id)
            .map(|_| engine.get_messages(&chat_id))
    })
    .await?
    .map(Json)
    .ok_or(StatusCode::NOT_FOUND)
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.send_message(&actor, &chat_id, &req.content)
    })
    .await?;
    Ok(Reply(outcome))
}

pub async fn clear_chat(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<String>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| engine.clear_chat(&actor, &chat_id)).await?;
    Ok(Reply(outcome))
}

pub async fn mark_cleared(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(chat_id): Path<String>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.mark_chat_as_cleared(&actor, &chat_id)
    })
    .await?;
    Ok(Reply(outcome))
}
