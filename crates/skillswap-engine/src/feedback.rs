use tracing::{error, info};
use uuid::Uuid;

use skillswap_db::models::FeedbackRow;
use skillswap_db::now_timestamp;
use skillswap_types::api::ActionOutcome;
use skillswap_types::models::{Feedback, SwapStatus, User};

use crate::error::{Done, EngineError, or_empty, settle};
use crate::{Actor, Engine};

/// A user's aggregated rating: mean of all received ratings, one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub rating: f64,
    pub reviews: u32,
}

/// Averages ratings and rounds to one decimal place. No ratings yields 0.
pub fn aggregate_rating(ratings: &[i64]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::default();
    }
    let sum: i64 = ratings.iter().sum();
    let mean = sum as f64 / ratings.len() as f64;
    RatingSummary {
        rating: (mean * 10.0).round() / 10.0,
        reviews: u32::try_from(ratings.len()).unwrap_or(u32::MAX),
    }
}

impl Engine {
    /// Rates the other participant of a completed swap, once per author.
    pub fn submit_feedback(
        &self,
        actor: &Actor,
        swap_request_id: &str,
        to_user_id: &str,
        rating: i64,
        comment: &str,
    ) -> ActionOutcome {
        settle(
            "submit feedback",
            "Failed to submit feedback. Please try again.",
            self.try_submit_feedback(actor, swap_request_id, to_user_id, rating, comment),
        )
    }

    fn try_submit_feedback(
        &self,
        actor: &Actor,
        swap_request_id: &str,
        to_user_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<Done, EngineError> {
        let (Ok(request_id), Ok(to_id)) = (
            swap_request_id.trim().parse::<Uuid>(),
            to_user_id.trim().parse::<Uuid>(),
        ) else {
            return Err(EngineError::invalid("Invalid request or user ID."));
        };

        let request = match self.load_swap_request(request_id) {
            Ok(r) if r.status == SwapStatus::Completed => r,
            Ok(_) | Err(EngineError::NotFound(_)) => {
                return Err(EngineError::not_found("Swap request not found or not completed."));
            }
            Err(e) => return Err(e),
        };

        if !request.involves(actor.user_id) {
            return Err(EngineError::forbidden("You are not a participant in this swap."));
        }
        if request.counterpart_of(actor.user_id).map(|u| u.id) != Some(to_id) {
            return Err(EngineError::invalid("You can only rate the other participant in this swap."));
        }

        let request_key = request_id.to_string();
        if self.db.feedback_exists(&request_key, &actor.key())? {
            return Err(EngineError::conflict("You have already submitted feedback for this swap."));
        }

        let from_user = self.db.get_user_by_id(&actor.key())?.map(User::from);
        let to_user = self.db.get_user_by_id(&to_id.to_string())?.map(User::from);
        let (Some(from_user), Some(to_user)) = (from_user, to_user) else {
            return Err(EngineError::not_found("User not found."));
        };

        let id = Uuid::new_v4();
        let inserted = self.db.insert_feedback(&FeedbackRow {
            id: id.to_string(),
            swap_request_id: request_key,
            from_user_id: from_user.id.to_string(),
            to_user_id: to_user.id.to_string(),
            from_user_name: from_user.name,
            to_user_name: to_user.name,
            rating: rating.clamp(1, 5),
            comment: comment.trim().to_string(),
            created_at: now_timestamp(),
        })?;
        if !inserted {
            return Err(EngineError::conflict("You have already submitted feedback for this swap."));
        }

        // The feedback is stored; a failed recompute must not report failure.
        match self.update_user_rating(to_user.id) {
            Ok(summary) => info!(
                swap_request_id = %request_id,
                to = %to_user.id,
                rating = summary.rating,
                reviews = summary.reviews,
                "Feedback recorded"
            ),
            Err(e) => error!(
                "Feedback {} recorded but rating of user {} not updated: {}",
                id, to_user.id, e
            ),
        }

        Ok(Done::with_id("Feedback submitted successfully.", id))
    }

    /// Recomputes the user's rating from every feedback they received.
    pub fn update_user_rating(&self, user_id: Uuid) -> Result<RatingSummary, EngineError> {
        let key = user_id.to_string();
        let summary = aggregate_rating(&self.db.ratings_for_user(&key)?);
        if !self
            .db
            .set_user_rating(&key, summary.rating, i64::from(summary.reviews))?
        {
            return Err(EngineError::not_found("User not found."));
        }
        Ok(summary)
    }

    /// Whether `user_id` already rated the given swap.
    pub fn check_feedback_exists(&self, swap_request_id: &str, user_id: &str) -> bool {
        let (Ok(request_id), Ok(user_id)) = (
            swap_request_id.trim().parse::<Uuid>(),
            user_id.trim().parse::<Uuid>(),
        ) else {
            return false;
        };
        or_empty(
            "check feedback",
            self.db.feedback_exists(&request_id.to_string(), &user_id.to_string()),
        )
    }

    /// Feedback left on a swap, newest first.
    pub fn get_feedback_for_swap(&self, swap_request_id: &str) -> Vec<Feedback> {
        let Ok(id) = swap_request_id.trim().parse::<Uuid>() else {
            return Vec::new();
        };
        or_empty("load feedback", self.db.list_feedback_for_swap(&id.to_string()))
            .into_iter()
            .map(Feedback::from)
            .collect()
    }
}
