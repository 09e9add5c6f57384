use skillswap_db::Database;
use skillswap_types::api::{ActionOutcome, SignInRequest};

use crate::{Actor, Engine};

pub(crate) fn engine() -> Engine {
    Engine::new(Database::open_in_memory().unwrap())
}

pub(crate) fn sign_up(engine: &Engine, name: &str) -> Actor {
    let signed_in = engine
        .sign_in(&SignInRequest {
            email: format!("{}@example.com", name.to_lowercase()),
            name: Some(name.to_string()),
            avatar: None,
        })
        .unwrap();
    Actor::new(signed_in.user_id)
}

pub(crate) fn make_admin(engine: &Engine, actor: &Actor) {
    assert!(engine.db().set_user_admin(&actor.key(), true).unwrap());
}

#[track_caller]
pub(crate) fn assert_ok(outcome: &ActionOutcome) {
    assert!(outcome.success, "expected success, got: {}", outcome.message);
}

#[track_caller]
pub(crate) fn assert_refused(outcome: &ActionOutcome, message: &str) {
    assert!(!outcome.success, "expected failure, got success: {}", outcome.message);
    assert_eq!(outcome.message, message);
}
