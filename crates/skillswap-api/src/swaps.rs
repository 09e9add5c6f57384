use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use skillswap_engine::Actor;
use skillswap_types::api::{CreateSwapRequest, UpdateStatusRequest};
use skillswap_types::models::SwapRequest;

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

/// Requests the caller sent or received.
pub async fn list_swap_requests(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<SwapRequest>>, StatusCode> {
    let requests = blocking(&state, move |engine| {
        engine.get_swap_requests(&actor.user_id.to_string())
    })
    .await?;
    Ok(Json(requests))
}

pub async fn create_swap_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateSwapRequest>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.create_swap_request(
            &actor,
            &req.to_user_id,
            &req.offered_skill,
            &req.wanted_skill,
            req.message.as_deref(),
        )
    })
    .await?;
    Ok(Reply(outcome))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.update_swap_request_status(&actor, &request_id, req.status)
    })
    .await?;
    Ok(Reply(outcome))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<String>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.mark_swap_as_completed(&actor, &request_id)
    })
    .await?;
    Ok(Reply(outcome))
}
