use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use skillswap_engine::Actor;
use skillswap_types::api::{FeedbackExistsResponse, SubmitFeedbackRequest};
use skillswap_types::models::Feedback;

use crate::auth::AppState;
use crate::reply::{Reply, blocking};

pub async fn list_feedback(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<Vec<Feedback>>, StatusCode> {
    let feedback = blocking(&state, move |engine| engine.get_feedback_for_swap(&request_id)).await?;
    Ok(Json(feedback))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<String>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<Reply, StatusCode> {
    let outcome = blocking(&state, move |engine| {
        engine.submit_feedback(&actor, &request_id, &req.to_user_id, req.rating, &req.comment)
    })
    .await?;
    Ok(Reply(outcome))
}

/// Whether the caller already rated this swap.
pub async fn my_feedback_exists(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<String>,
) -> Result<Json<FeedbackExistsResponse>, StatusCode> {
    let exists = blocking(&state, move |engine| {
        engine.check_feedback_exists(&request_id, &actor.user_id.to_string())
    })
    .await?;
    Ok(Json(FeedbackExistsResponse { exists }))
}
