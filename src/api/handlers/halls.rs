//! Hall endpoints. Reading halls is staff-only, like every hall mutation.

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    api::{
        AppState,
        auth::Principal,
        extract::ApiJson,
        response::{created, empty_success, success},
    },
    core::{access::Action, hall},
    errors::{Error, Result},
};

/// Request body for create and update.
#[derive(Debug, Deserialize)]
pub struct HallPayload {
    /// Hall name
    pub name: String,
    /// Seat count
    pub seats: i32,
}

/// `GET /halls`
pub async fn list_halls(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    principal.actor.require(Action::ManageCatalog)?;
    let halls = hall::list_halls(&state.core.db).await?;
    Ok(success(halls, "Halls retrieved"))
}

/// `GET /halls/:id`
pub async fn get_hall(
    State(state): State<AppState>,
    principal: Principal,
    Path(hall_id): Path<i64>,
) -> Result<Response> {
    principal.actor.require(Action::ManageCatalog)?;
    let found = hall::get_hall(&state.core.db, hall_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Hall",
            id: hall_id,
        })?;
    Ok(success(found, "Hall retrieved"))
}

/// `POST /halls`
pub async fn create_hall(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(payload): ApiJson<HallPayload>,
) -> Result<Response> {
    let created_hall =
        hall::create_hall(&state.core, &principal.actor, &payload.name, payload.seats).await?;
    Ok(created(created_hall, "Hall created"))
}

/// `PUT /halls/:id`
pub async fn update_hall(
    State(state): State<AppState>,
    principal: Principal,
    Path(hall_id): Path<i64>,
    ApiJson(payload): ApiJson<HallPayload>,
) -> Result<Response> {
    let updated = hall::update_hall(
        &state.core,
        &principal.actor,
        hall_id,
        &payload.name,
        payload.seats,
    )
    .await?;
    Ok(success(updated, "Hall updated"))
}

/// `DELETE /halls/:id`
pub async fn delete_hall(
    State(state): State<AppState>,
    principal: Principal,
    Path(hall_id): Path<i64>,
) -> Result<Response> {
    hall::delete_hall(&state.core, &principal.actor, hall_id).await?;
    Ok(empty_success("Hall deleted"))
}
