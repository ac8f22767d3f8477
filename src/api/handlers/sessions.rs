//! Session endpoints, including today's schedule and seat availability.

use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        AppState,
        auth::Principal,
        extract::{ApiJson, ApiQuery},
        response::{created, empty_success, success},
    },
    core::{
        access::Action,
        ledger::{self, DayAvailability},
        session::{self, SessionDraft, TodayFilter},
    },
    entities,
    errors::{Error, Result},
    money,
};

/// A session with its price as a decimal amount.
#[derive(Debug, Serialize)]
pub struct SessionView {
    id: i64,
    hall_id: i64,
    movie_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    price: Decimal,
}

impl From<entities::session::Model> for SessionView {
    fn from(model: entities::session::Model) -> Self {
        Self {
            id: model.id,
            hall_id: model.hall_id,
            movie_id: model.movie_id,
            start_date: model.start_date,
            end_date: model.end_date,
            start_time: model.start_time,
            end_time: model.end_time,
            price: money::from_cents(model.price_cents),
        }
    }
}

fn views(models: Vec<entities::session::Model>) -> Vec<SessionView> {
    models.into_iter().map(SessionView::from).collect()
}

async fn find_session(state: &AppState, session_id: i64) -> Result<entities::session::Model> {
    session::get_session(&state.core.db, session_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Session",
            id: session_id,
        })
}

/// `GET /sessions`
pub async fn list_sessions(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let sessions = session::list_sessions(&state.core.db).await?;
    Ok(success(views(sessions), "Sessions retrieved"))
}

/// `GET /sessions/today?hall=&start_time=&end_time=`
pub async fn todays_sessions(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(filter): ApiQuery<TodayFilter>,
) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let today = state.core.clock().today();
    let sessions = session::todays_sessions(&state.core.db, today, &filter).await?;
    Ok(success(views(sessions), "Today's sessions retrieved"))
}

/// `GET /sessions/:id`
pub async fn get_session(
    State(state): State<AppState>,
    principal: Principal,
    Path(session_id): Path<i64>,
) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let found = find_session(&state, session_id).await?;
    Ok(success(SessionView::from(found), "Session retrieved"))
}

/// `POST /sessions`
pub async fn create_session(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(draft): ApiJson<SessionDraft>,
) -> Result<Response> {
    let created_session = session::create_session(&state.core, &principal.actor, &draft).await?;
    Ok(created(SessionView::from(created_session), "Session created"))
}

/// `PUT /sessions/:id`
pub async fn update_session(
    State(state): State<AppState>,
    principal: Principal,
    Path(session_id): Path<i64>,
    ApiJson(draft): ApiJson<SessionDraft>,
) -> Result<Response> {
    let updated = session::update_session(&state.core, &principal.actor, session_id, &draft).await?;
    Ok(success(SessionView::from(updated), "Session updated"))
}

/// `DELETE /sessions/:id`
pub async fn delete_session(
    State(state): State<AppState>,
    principal: Principal,
    Path(session_id): Path<i64>,
) -> Result<Response> {
    session::delete_session(&state.core, &principal.actor, session_id).await?;
    Ok(empty_success("Session deleted"))
}

/// Query of the seats endpoint.
#[derive(Debug, Deserialize)]
pub struct SeatsQuery {
    /// A single show date to report on
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct SeatsView {
    session_id: i64,
    capacity: i64,
    dates: Vec<NaiveDate>,
    availability: Vec<DayAvailability>,
}

/// `GET /sessions/:id/seats[?date=YYYY-MM-DD]`
///
/// Without a date, lists only the days that have sales. A date outside the
/// session's run is rejected.
pub async fn seats(
    State(state): State<AppState>,
    principal: Principal,
    Path(session_id): Path<i64>,
    ApiQuery(query): ApiQuery<SeatsQuery>,
) -> Result<Response> {
    principal.actor.require(Action::Browse)?;
    let showing = find_session(&state, session_id).await?;
    let db = &state.core.db;

    let availability = match query.date {
        Some(date) if date < showing.start_date || date > showing.end_date => {
            return Err(Error::validation(format!(
                "Session {session_id} does not run on {date}"
            )));
        }
        Some(date) => vec![DayAvailability {
            date,
            free_seats: ledger::free_seats(db, &showing, date).await?,
        }],
        None => ledger::free_seats_by_day(db, &showing).await?,
    };

    let view = SeatsView {
        session_id,
        capacity: ledger::hall_capacity(db, &showing).await?,
        dates: ledger::session_dates(&showing),
        availability,
    };
    Ok(success(view, "Seat availability retrieved"))
}
