//! Session business logic - scheduling screenings into halls.
//!
//! A hall can host many sessions, but no two of them may share both a day and a
//! stretch of the daily time window. Every schedule change holds the exclusive
//! lock of each hall it touches, so the overlap check and the write happen as
//! one unit per hall.

use crate::{
    core::{
        access::{Action, Actor},
        context::CoreContext,
        guard,
        schedule::{self, Slot},
    },
    entities::{Hall, Movie, Session, session},
    errors::{Error, Result},
    money,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tokio::sync::OwnedRwLockWriteGuard;
use tracing::{debug, info, instrument};

/// Highest ticket price, in cents (9999.99).
pub const MAX_PRICE_CENTS: i64 = 999_999;

/// Fields of a session as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDraft {
    /// Hall to screen in
    pub hall_id: i64,
    /// Movie to screen
    pub movie_id: i64,
    /// First day of the run
    pub start_date: NaiveDate,
    /// Last day of the run (inclusive)
    pub end_date: NaiveDate,
    /// Daily start time
    pub start_time: NaiveTime,
    /// Daily end time
    pub end_time: NaiveTime,
    /// Ticket price
    pub price: Decimal,
}

impl SessionDraft {
    /// The hall occupancy this draft asks for.
    #[must_use]
    pub const fn slot(&self) -> Slot {
        Slot {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Optional narrowing of today's schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TodayFilter {
    /// Only sessions in this hall
    #[serde(rename = "hall")]
    pub hall_id: Option<i64>,
    /// Earliest daily start time
    #[serde(rename = "start_time")]
    pub from: Option<NaiveTime>,
    /// Latest daily start time
    #[serde(rename = "end_time")]
    pub to: Option<NaiveTime>,
}

/// Checks a draft against `today` and returns the price in cents.
fn validate_draft(draft: &SessionDraft, today: NaiveDate) -> Result<i64> {
    if draft.start_date < today {
        return Err(Error::validation("Start date cannot be less than today"));
    }
    if draft.end_date < draft.start_date {
        return Err(Error::validation(
            "End date cannot be less than start date",
        ));
    }
    if draft.end_time <= draft.start_time {
        return Err(Error::validation("End time must be later than start time"));
    }

    let price_cents = money::to_cents(draft.price)?;
    if !(0..=MAX_PRICE_CENTS).contains(&price_cents) {
        return Err(Error::validation(format!(
            "Price must be between 0 and {}",
            money::from_cents(MAX_PRICE_CENTS)
        )));
    }
    Ok(price_cents)
}

async fn ensure_references<C>(db: &C, draft: &SessionDraft) -> Result<()>
where
    C: ConnectionTrait,
{
    if Hall::find_by_id(draft.hall_id).one(db).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Hall",
            id: draft.hall_id,
        });
    }
    if Movie::find_by_id(draft.movie_id).one(db).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Movie",
            id: draft.movie_id,
        });
    }
    Ok(())
}

async fn ensure_free_slot<C>(db: &C, draft: &SessionDraft, exclude: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(existing) = schedule::find_conflict(db, draft.hall_id, &draft.slot(), exclude).await? {
        debug!(
            hall_id = draft.hall_id,
            conflicting = existing.id,
            "Session overlaps an existing one"
        );
        return Err(Error::Conflict {
            hall_id: draft.hall_id,
            session_id: existing.id,
        });
    }
    Ok(())
}

async fn find_session<C>(db: &C, session_id: i64) -> Result<session::Model>
where
    C: ConnectionTrait,
{
    Session::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Session",
            id: session_id,
        })
}

/// Locks the hall a session currently sits in, plus `also` if given.
///
/// The session may be moved while we wait, so the hall is re-read under the
/// lock and the attempt repeated until it is stable.
async fn lock_session_halls(
    ctx: &CoreContext,
    session_id: i64,
    also: Option<i64>,
) -> Result<(Vec<OwnedRwLockWriteGuard<()>>, session::Model)> {
    loop {
        let seen = find_session(&ctx.db, session_id).await?;
        let mut halls = vec![seen.hall_id];
        halls.extend(also);
        let guards = ctx.locks().halls.exclusive_all(halls).await;

        let current = find_session(&ctx.db, session_id).await?;
        if current.hall_id == seen.hall_id {
            return Ok((guards, current));
        }
    }
}

/// Schedules a new session.
#[instrument(skip(ctx, draft), fields(hall_id = draft.hall_id))]
pub async fn create_session(
    ctx: &CoreContext,
    actor: &Actor,
    draft: &SessionDraft,
) -> Result<session::Model> {
    actor.require(Action::ManageSessions)?;
    let price_cents = validate_draft(draft, ctx.clock().today())?;

    let _hall_lock = ctx.locks().halls.exclusive(draft.hall_id).await;
    let _movie_lock = ctx.locks().movies.shared(draft.movie_id).await;
    let txn = ctx.db.begin().await?;

    ensure_references(&txn, draft).await?;
    ensure_free_slot(&txn, draft, None).await?;

    let created = session::ActiveModel {
        hall_id: Set(draft.hall_id),
        movie_id: Set(draft.movie_id),
        start_date: Set(draft.start_date),
        end_date: Set(draft.end_date),
        start_time: Set(draft.start_time),
        end_time: Set(draft.end_time),
        price_cents: Set(price_cents),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(session_id = created.id, "Session created");
    Ok(created)
}

/// Replaces a session's schedule, hall, movie and price.
///
/// The session itself is left out of the overlap search. Forbidden once any
/// ticket for it was sold.
#[instrument(skip(ctx, draft))]
pub async fn update_session(
    ctx: &CoreContext,
    actor: &Actor,
    session_id: i64,
    draft: &SessionDraft,
) -> Result<session::Model> {
    actor.require(Action::ManageSessions)?;
    let price_cents = validate_draft(draft, ctx.clock().today())?;

    let (_hall_locks, existing) = lock_session_halls(ctx, session_id, Some(draft.hall_id)).await?;
    let _movie_lock = ctx.locks().movies.shared(draft.movie_id).await;
    let txn = ctx.db.begin().await?;

    if guard::has_paid_tickets(&txn, session_id).await? {
        return Err(Error::forbidden(
            "You cannot update this session because some tickets have already been sold",
        ));
    }

    ensure_references(&txn, draft).await?;
    ensure_free_slot(&txn, draft, Some(session_id)).await?;

    let mut active_model: session::ActiveModel = existing.into();
    active_model.hall_id = Set(draft.hall_id);
    active_model.movie_id = Set(draft.movie_id);
    active_model.start_date = Set(draft.start_date);
    active_model.end_date = Set(draft.end_date);
    active_model.start_time = Set(draft.start_time);
    active_model.end_time = Set(draft.end_time);
    active_model.price_cents = Set(price_cents);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(session_id, "Session updated");
    Ok(updated)
}

/// Removes a session. Forbidden once any ticket for it was sold.
#[instrument(skip(ctx))]
pub async fn delete_session(ctx: &CoreContext, actor: &Actor, session_id: i64) -> Result<()> {
    actor.require(Action::ManageSessions)?;

    let (_hall_locks, existing) = lock_session_halls(ctx, session_id, None).await?;
    let txn = ctx.db.begin().await?;

    if guard::has_paid_tickets(&txn, session_id).await? {
        return Err(Error::forbidden(
            "You cannot delete this session because some tickets have already been sold",
        ));
    }

    existing.delete(&txn).await?;
    txn.commit().await?;
    info!(session_id, "Session deleted");
    Ok(())
}

/// Finds a session by id.
pub async fn get_session<C>(db: &C, session_id: i64) -> Result<Option<session::Model>>
where
    C: ConnectionTrait,
{
    Session::find_by_id(session_id).one(db).await.map_err(Into::into)
}

/// Every session, by daily start time then price.
pub async fn list_sessions<C>(db: &C) -> Result<Vec<session::Model>>
where
    C: ConnectionTrait,
{
    Session::find()
        .order_by_asc(session::Column::StartTime)
        .order_by_asc(session::Column::PriceCents)
        .order_by_asc(session::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sessions whose run includes `today`, by daily start time.
pub async fn todays_sessions<C>(
    db: &C,
    today: NaiveDate,
    filter: &TodayFilter,
) -> Result<Vec<session::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Session::find()
        .filter(session::Column::StartDate.lte(today))
        .filter(session::Column::EndDate.gte(today));

    if let Some(hall_id) = filter.hall_id {
        query = query.filter(session::Column::HallId.eq(hall_id));
    }
    if let Some(from) = filter.from {
        query = query.filter(session::Column::StartTime.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(session::Column::StartTime.lte(to));
    }

    query
        .order_by_asc(session::Column::StartTime)
        .order_by_asc(session::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
