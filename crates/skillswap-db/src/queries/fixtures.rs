use uuid::Uuid;

use crate::models::{ChatRow, SwapRequestRow, UserRow};
use crate::now_timestamp;

pub(crate) fn user(name: &str, email: &str) -> UserRow {
    UserRow {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: format!("https://example.com/{name}.png"),
        bio: String::new(),
        location: String::new(),
        is_public: true,
        is_admin: false,
        skills_offered: "[]".into(),
        skills_wanted: "[]".into(),
        availability: String::new(),
        rating: 0.0,
        reviews: 0,
        created_at: now_timestamp(),
    }
}

pub(crate) fn swap(from: &UserRow, to: &UserRow, status: &str) -> SwapRequestRow {
    SwapRequestRow {
        id: Uuid::new_v4().to_string(),
        from_user_id: from.id.clone(),
        from_user_name: from.name.clone(),
        from_user_avatar: from.avatar.clone(),
        to_user_id: to.id.clone(),
        to_user_name: to.name.clone(),
        to_user_avatar: to.avatar.clone(),
        offered_skill: "Guitar".into(),
        wanted_skill: "Python".into(),
        status: status.to_string(),
        message: None,
        created_at: now_timestamp(),
    }
}

pub(crate) fn chat(request: &SwapRequestRow) -> ChatRow {
    let now = now_timestamp();
    ChatRow {
        id: Uuid::new_v4().to_string(),
        swap_request_id: request.id.clone(),
        user_a_id: request.from_user_id.clone(),
        user_a_name: request.from_user_name.clone(),
        user_a_avatar: request.from_user_avatar.clone(),
        user_b_id: request.to_user_id.clone(),
        user_b_name: request.to_user_name.clone(),
        user_b_avatar: request.to_user_avatar.clone(),
        last_message_content: None,
        last_message_sender: None,
        last_message_at: None,
        is_cleared: false,
        created_at: now.clone(),
        updated_at: now,
    }
}
