use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, warn};
use uuid::Uuid;

use skillswap_engine::Engine;
use skillswap_types::api::{Claims, SignInRequest, SignInResponse};

use crate::reply::{Reply, blocking};

/// Header the identity provider uses to vouch for a sign-in call.
pub const IDENTITY_SECRET_HEADER: &str = "x-identity-secret";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: Engine,
    pub jwt_secret: String,
    pub identity_secret: String,
    pub token_ttl_days: i64,
}

pub async fn health() -> &'static str {
    "ok"
}

/// Maps an identity-provider principal onto a local user and issues a token.
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, axum::response::Response> {
    let vouched = headers
        .get(IDENTITY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.identity_secret);
    if !vouched {
        warn!("Sign-in rejected: missing or wrong identity secret");
        return Err(StatusCode::UNAUTHORIZED.into_response());
    }

    let email = req.email.trim().to_string();
    let signed_in = blocking(&state, move |engine| engine.sign_in(&req))
        .await
        .map_err(IntoResponse::into_response)?
        .map_err(|e| Reply(e.into_outcome("sign in", "Failed to sign in.")).into_response())?;

    let token = create_token(&state.jwt_secret, signed_in.user_id, &email, state.token_ttl_days)
        .map_err(|e| {
            error!("Failed to sign token: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    Ok(Json(SignInResponse {
        user_id: signed_in.user_id,
        is_new_user: signed_in.is_new_user,
        is_admin: signed_in.is_admin,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, email: &str, ttl_days: i64) -> anyhow::Result<String> {
    let exp = chrono::Duration::try_days(ttl_days)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("token TTL of {ttl_days} days is out of range"))?;
    let exp = usize::try_from(exp.timestamp())?;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let user_id = Uuid::new_v4();
        let token = create_token("secret", user_id, "alice@example.com", 30).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.email, "alice@example.com");
    }

    #[test]
    fn out_of_range_ttl_is_an_error() {
        let user_id = Uuid::new_v4();
        assert!(create_token("secret", user_id, "a@example.com", i64::MAX).is_err());
        assert!(create_token("secret", user_id, "a@example.com", -1_000_000_000).is_err());
    }
}
