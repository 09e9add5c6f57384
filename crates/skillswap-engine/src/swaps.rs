use tracing::{info, warn};
use uuid::Uuid;

use skillswap_db::models::SwapRequestRow;
use skillswap_db::now_timestamp;
use skillswap_types::api::ActionOutcome;
use skillswap_types::models::{NotificationKind, SwapRequest, SwapStatus, User};

use crate::error::{Done, EngineError, or_empty, parse_id, settle};
use crate::notifications::Notice;
use crate::{Actor, Engine};

impl Engine {
    /// Opens a `pending` request from the actor to `to_user_id` and tells
    /// the recipient about it.
    pub fn create_swap_request(
        &self,
        actor: &Actor,
        to_user_id: &str,
        offered_skill: &str,
        wanted_skill: &str,
        message: Option<&str>,
    ) -> ActionOutcome {
        settle(
            "create swap request",
            "Failed to create swap request. Please try again.",
            self.try_create_swap_request(actor, to_user_id, offered_skill, wanted_skill, message),
        )
    }

    fn try_create_swap_request(
        &self,
        actor: &Actor,
        to_user_id: &str,
        offered_skill: &str,
        wanted_skill: &str,
        message: Option<&str>,
    ) -> Result<Done, EngineError> {
        let to_id = parse_id(to_user_id, "Invalid user ID format.")?;

        let offered_skill = offered_skill.trim();
        let wanted_skill = wanted_skill.trim();
        if offered_skill.is_empty() || wanted_skill.is_empty() {
            return Err(EngineError::invalid("Both an offered and a wanted skill are required."));
        }

        let from_user = self.db.get_user_by_id(&actor.key())?.map(User::from);
        let to_user = self.db.get_user_by_id(&to_id.to_string())?.map(User::from);
        let (Some(from_user), Some(to_user)) = (from_user, to_user) else {
            return Err(EngineError::not_found("One or both users not found."));
        };

        if from_user.id == to_user.id {
            return Err(EngineError::invalid("You cannot request a swap with yourself."));
        }

        if self
            .db
            .has_pending_swap_request(&from_user.id.to_string(), &to_user.id.to_string())?
        {
            return Err(EngineError::conflict("You already have a pending request with this user."));
        }

        let from = from_user.snapshot();
        let to = to_user.snapshot();
        let request_id = Uuid::new_v4();

        self.db.insert_swap_request(&SwapRequestRow {
            id: request_id.to_string(),
            from_user_id: from.id.to_string(),
            from_user_name: from.name.clone(),
            from_user_avatar: from.avatar.clone(),
            to_user_id: to.id.to_string(),
            to_user_name: to.name.clone(),
            to_user_avatar: to.avatar.clone(),
            offered_skill: offered_skill.to_string(),
            wanted_skill: wanted_skill.to_string(),
            status: SwapStatus::Pending.as_str().to_string(),
            message: message.map(str::trim).filter(|m| !m.is_empty()).map(String::from),
            created_at: now_timestamp(),
        })?;

        info!(%request_id, from = %from.id, to = %to.id, "Swap request created");

        self.notify(Notice {
            user_id: to.id,
            kind: NotificationKind::SwapRequest,
            title: "New Swap Request".into(),
            message: format!("{} wants to swap {} for {}", from.name, offered_skill, wanted_skill),
            swap_request_id: request_id,
            from: &from,
        });

        Ok(Done::with_id(
            format!("Swap request sent to {} successfully.", to.name),
            request_id,
        ))
    }

    /// Every request the user sent or received, newest first.
    pub fn get_swap_requests(&self, user_id: &str) -> Vec<SwapRequest> {
        let Ok(id) = parse_id(user_id, "Invalid user ID format.") else {
            return Vec::new();
        };
        or_empty("load swap requests", self.db.list_swap_requests_for_user(&id.to_string()))
            .into_iter()
            .map(SwapRequest::from)
            .collect()
    }

    /// The recipient's answer to a pending request. Accepting also opens the
    /// chat for the pair.
    pub fn update_swap_request_status(&self, actor: &Actor, request_id: &str, status: SwapStatus) -> ActionOutcome {
        settle(
            "update swap request status",
            "Failed to update swap request status.",
            self.try_update_swap_request_status(actor, request_id, status),
        )
    }

    fn try_update_swap_request_status(
        &self,
        actor: &Actor,
        request_id: &str,
        status: SwapStatus,
    ) -> Result<Done, EngineError> {
        let id = parse_id(request_id, "Invalid request ID format.")?;

        if !matches!(status, SwapStatus::Accepted | SwapStatus::Rejected) {
            return Err(EngineError::invalid("A swap request can only be accepted or rejected."));
        }

        let request = self.load_swap_request(id)?;

        if request.to_user.id != actor.user_id {
            return Err(EngineError::forbidden("You can only update requests sent to you."));
        }

        if !request.status.can_transition_to(status) {
            return Err(EngineError::conflict(format!(
                "This swap request has already been {}.",
                request.status
            )));
        }

        if !self
            .db
            .transition_swap_status(&id.to_string(), request.status.as_str(), status.as_str())?
        {
            return Err(EngineError::conflict("This swap request is no longer pending."));
        }

        info!(request_id = %id, %status, "Swap request answered");

        let message = match status {
            SwapStatus::Accepted => format!("{} accepted your swap request!", request.to_user.name),
            _ => format!("{} rejected your swap request.", request.to_user.name),
        };
        self.notify(Notice {
            user_id: request.from_user.id,
            kind: NotificationKind::SwapResponse,
            title: format!("Swap Request {}", capitalized(status.as_str())),
            message,
            swap_request_id: id,
            from: &request.to_user,
        });

        if status == SwapStatus::Accepted {
            let chat = self.create_chat_from_swap_request(&id.to_string());
            if !chat.success {
                warn!("Chat for accepted swap request {} not created: {}", id, chat.message);
            }
        }

        Ok(Done::message(format!("Swap request {} successfully.", status)))
    }

    /// Either participant may close out an accepted swap.
    pub fn mark_swap_as_completed(&self, actor: &Actor, request_id: &str) -> ActionOutcome {
        settle(
            "mark swap as completed",
            "Failed to mark swap as completed. Please try again.",
            self.try_mark_swap_as_completed(actor, request_id),
        )
    }

    fn try_mark_swap_as_completed(&self, actor: &Actor, request_id: &str) -> Result<Done, EngineError> {
        let id = parse_id(request_id, "Invalid swap request ID.")?;
        let request = self.load_swap_request(id)?;

        if !request.involves(actor.user_id) {
            return Err(EngineError::forbidden("You are not a participant in this swap."));
        }

        if request.status != SwapStatus::Accepted {
            return Err(EngineError::conflict("Can only mark accepted swaps as completed."));
        }

        if !self.db.transition_swap_status(
            &id.to_string(),
            SwapStatus::Accepted.as_str(),
            SwapStatus::Completed.as_str(),
        )? {
            return Err(EngineError::conflict("Can only mark accepted swaps as completed."));
        }

        info!(request_id = %id, by = %actor.user_id, "Swap completed");
        Ok(Done::message("Swap marked as completed successfully."))
    }

    pub(crate) fn load_swap_request(&self, id: Uuid) -> Result<SwapRequest, EngineError> {
        self.db
            .get_swap_request(&id.to_string())?
            .map(SwapRequest::from)
            .ok_or_else(|| EngineError::not_found("Swap request not found."))
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_ok, assert_refused, engine, sign_up};

    fn request(engine: &Engine, from: &Actor, to: &Actor) -> String {
        let outcome = engine.create_swap_request(from, &to.user_id.to_string(), "Guitar", "Python", None);
        assert_ok(&outcome);
        outcome.id.unwrap().to_string()
    }

    #[test]
    fn create_opens_pending_request_and_notifies_recipient() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");

        let outcome = engine.create_swap_request(
            &alice,
            &bob.user_id.to_string(),
            " Guitar ",
            "Python",
            Some("Tuesdays work for me"),
        );
        assert_ok(&outcome);
        assert_eq!(outcome.message, "Swap request sent to Bob successfully.");

        let requests = engine.get_swap_requests(&alice.user_id.to_string());
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(Some(req.id), outcome.id);
        assert_eq!(req.status, SwapStatus::Pending);
        assert_eq!(req.offered_skill, "Guitar");
        assert_eq!(req.from_user.name, "Alice");
        assert_eq!(req.to_user.id, bob.user_id);
        assert_eq!(req.message.as_deref(), Some("Tuesdays work for me"));

        let notes = engine.get_notifications(&bob.user_id.to_string());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::SwapRequest);
        assert_eq!(notes[0].title, "New Swap Request");
        assert_eq!(notes[0].message, "Alice wants to swap Guitar for Python");
        assert_eq!(notes[0].swap_request_id, Some(req.id));
    }

    #[test]
    fn duplicate_pending_request_is_refused() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");

        request(&engine, &alice, &bob);
        let second = engine.create_swap_request(&alice, &bob.user_id.to_string(), "Drums", "Go", None);
        assert_refused(&second, "You already have a pending request with this user.");

        // The reverse direction is a different pair.
        request(&engine, &bob, &alice);
    }

    #[test]
    fn create_validation() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");

        assert_refused(
            &engine.create_swap_request(&alice, &alice.user_id.to_string(), "Guitar", "Python", None),
            "You cannot request a swap with yourself.",
        );
        assert_refused(
            &engine.create_swap_request(&alice, "bob", "Guitar", "Python", None),
            "Invalid user ID format.",
        );
        assert_refused(
            &engine.create_swap_request(&alice, &Uuid::new_v4().to_string(), "Guitar", "Python", None),
            "One or both users not found.",
        );
        assert_refused(
            &engine.create_swap_request(&alice, &bob.user_id.to_string(), "  ", "Python", None),
            "Both an offered and a wanted skill are required.",
        );
        assert!(engine.get_swap_requests(&alice.user_id.to_string()).is_empty());
    }

    #[test]
    fn only_recipient_may_answer() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let carol = sign_up(&engine, "Carol");
        let id = request(&engine, &alice, &bob);

        for outsider in [&alice, &carol] {
            assert_refused(
                &engine.update_swap_request_status(outsider, &id, SwapStatus::Accepted),
                "You can only update requests sent to you.",
            );
        }
    }

    #[test]
    fn accept_notifies_requester_and_opens_chat() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let id = request(&engine, &alice, &bob);

        let outcome = engine.update_swap_request_status(&bob, &id, SwapStatus::Accepted);
        assert_ok(&outcome);
        assert_eq!(outcome.message, "Swap request accepted successfully.");

        let notes = engine.get_notifications(&alice.user_id.to_string());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::SwapResponse);
        assert_eq!(notes[0].title, "Swap Request Accepted");
        assert_eq!(notes[0].message, "Bob accepted your swap request!");

        let chats = engine.get_chats(&alice.user_id.to_string());
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].chat.swap_request_id.to_string(), id);
    }

    #[test]
    fn reject_notifies_without_chat() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let id = request(&engine, &alice, &bob);

        assert_ok(&engine.update_swap_request_status(&bob, &id, SwapStatus::Rejected));

        let notes = engine.get_notifications(&alice.user_id.to_string());
        assert_eq!(notes[0].title, "Swap Request Rejected");
        assert_eq!(notes[0].message, "Bob rejected your swap request.");
        assert!(engine.get_chats(&alice.user_id.to_string()).is_empty());

        // Rejection frees the pair for a new request.
        request(&engine, &alice, &bob);
    }

    #[test]
    fn answered_requests_cannot_be_answered_again() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let id = request(&engine, &alice, &bob);

        assert_ok(&engine.update_swap_request_status(&bob, &id, SwapStatus::Rejected));
        assert_refused(
            &engine.update_swap_request_status(&bob, &id, SwapStatus::Accepted),
            "This swap request has already been rejected.",
        );
    }

    #[test]
    fn recipient_cannot_jump_to_completed() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let id = request(&engine, &alice, &bob);

        assert_refused(
            &engine.update_swap_request_status(&bob, &id, SwapStatus::Completed),
            "A swap request can only be accepted or rejected.",
        );
    }

    #[test]
    fn completion_requires_accepted_and_participant() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        let carol = sign_up(&engine, "Carol");
        let id = request(&engine, &alice, &bob);

        assert_refused(
            &engine.mark_swap_as_completed(&alice, &id),
            "Can only mark accepted swaps as completed.",
        );

        assert_ok(&engine.update_swap_request_status(&bob, &id, SwapStatus::Accepted));
        assert_refused(
            &engine.mark_swap_as_completed(&carol, &id),
            "You are not a participant in this swap.",
        );

        // The requester may complete too.
        assert_ok(&engine.mark_swap_as_completed(&alice, &id));
        let req = &engine.get_swap_requests(&bob.user_id.to_string())[0];
        assert_eq!(req.status, SwapStatus::Completed);

        assert_refused(
            &engine.mark_swap_as_completed(&bob, &id),
            "Can only mark accepted swaps as completed.",
        );
    }

    #[test]
    fn snapshots_do_not_follow_profile_edits() {
        let engine = engine();
        let alice = sign_up(&engine, "Alice");
        let bob = sign_up(&engine, "Bob");
        request(&engine, &alice, &bob);

        assert_ok(&engine.update_user_profile(
            &alice,
            &alice.user_id.to_string(),
            skillswap_types::api::ProfileUpdate { name: Some("Alicia".into()), ..Default::default() },
        ));

        let req = &engine.get_swap_requests(&bob.user_id.to_string())[0];
        assert_eq!(req.from_user.name, "Alice");
    }

    #[test]
    fn capitalizes_status_titles() {
        assert_eq!(capitalized("accepted"), "Accepted");
        assert_eq!(capitalized(""), "");
    }
}
