use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::{
        AppState,
        auth::Principal,
        extract::ApiJson,
        response::{created, success},
    },
    core::{access::Action, purchase},
    errors::{Error, Result},
};

/// Request body for buying tickets.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Number of seats
    pub quantity: i32,
    /// Day of the run the tickets are for
    pub show_date: NaiveDate,
}

/// `POST /sessions/:id/purchases`
pub async fn create_purchase(
    State(state): State<AppState>,
    principal: Principal,
    Path(session_id): Path<i64>,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> Result<Response> {
    let receipt = purchase::purchase_tickets(
        &state.core,
        &principal.actor,
        session_id,
        request.quantity,
        request.show_date,
    )
    .await?;
    Ok(created(receipt, "Tickets purchased"))
}

/// `GET /purchases`
pub async fn my_purchases(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    principal.actor.require(Action::ViewOwnPurchases)?;
    let user_id = principal.actor.user_id.ok_or(Error::Unauthenticated)?;
    let history = purchase::purchases_for_user(&state.core.db, user_id).await?;
    Ok(success(history, "Purchases retrieved"))
}

/// `GET /users/:user_id/purchases/:purchase_id`
pub async fn get_purchase(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, purchase_id)): Path<(i64, i64)>,
) -> Result<Response> {
    let line = purchase::get_purchase(&state.core.db, &principal.actor, user_id, purchase_id).await?;
    Ok(success(line, "Purchase retrieved"))
}
