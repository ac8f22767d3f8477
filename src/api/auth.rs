//! Request principal resolved from `Authorization: Token <key>`.

use crate::{
    core::{access::Actor, user},
    entities,
    errors::Error,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AppState;

const SCHEME: &str = "Token ";

/// Who is making the request. Requests without the header are anonymous; a
/// header with an unknown token is rejected.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Role and id used for permission checks
    pub actor: Actor,
    /// The account, when authenticated
    pub account: Option<entities::user::Model>,
}

impl Principal {
    /// The account, or [`Error::Unauthenticated`].
    pub fn require_account(&self) -> Result<&entities::user::Model, Error> {
        self.account.as_ref().ok_or(Error::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self {
                actor: Actor::anonymous(),
                account: None,
            });
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix(SCHEME))
            .map(str::trim)
            .ok_or(Error::Unauthenticated)?;

        let account = user::find_by_token(&state.core.db, token)
            .await?
            .ok_or(Error::Unauthenticated)?;

        Ok(Self {
            actor: Actor::from_user(&account),
            account: Some(account),
        })
    }
}
