use axum::response::Response;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    api::{auth::Principal, response::success},
    core::access::Role,
    errors::Result,
    money,
};

#[derive(Serialize)]
struct AccountView<'a> {
    id: i64,
    username: &'a str,
    email: &'a str,
    role: Role,
    wallet: Decimal,
}

/// `GET /me`
pub async fn me(principal: Principal) -> Result<Response> {
    let account = principal.require_account()?;
    let view = AccountView {
        id: account.id,
        username: &account.username,
        email: &account.email,
        role: principal.actor.role,
        wallet: money::from_cents(account.wallet_cents),
    };
    Ok(success(view, "Current user"))
}
