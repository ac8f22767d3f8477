//! Capacity ledger - unsold seats per session and show date.
//!
//! Free seats are always derived from the purchase records, never cached, so a
//! committed purchase is visible to the next check immediately.

use crate::{
    core::schedule::Slot,
    entities::{Hall, Purchase, purchase, session},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use tracing::error;

/// Free seats on one show date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    /// Show date
    pub date: NaiveDate,
    /// Seats still unsold
    pub free_seats: i64,
}

/// Seats sold for the session on `date`.
pub async fn seats_sold<C>(db: &C, session_id: i64, date: NaiveDate) -> Result<i64>
where
    C: ConnectionTrait,
{
    let sold: Option<Option<i64>> = Purchase::find()
        .select_only()
        .column_as(purchase::Column::Quantity.sum(), "sold")
        .filter(purchase::Column::SessionId.eq(session_id))
        .filter(purchase::Column::ShowDate.eq(date))
        .filter(purchase::Column::Paid.eq(true))
        .into_tuple()
        .one(db)
        .await?;

    Ok(sold.flatten().unwrap_or(0))
}

/// Seat count of the session's hall.
pub async fn hall_capacity<C>(db: &C, session: &session::Model) -> Result<i64>
where
    C: ConnectionTrait,
{
    let hall = Hall::find_by_id(session.hall_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Hall",
            id: session.hall_id,
        })?;
    Ok(i64::from(hall.seats))
}

/// Unsold seats for the session on `date`.
///
/// A negative count means the capacity invariant was already broken; that is
/// logged and reported as [`Error::InvariantViolation`].
pub async fn free_seats<C>(db: &C, session: &session::Model, date: NaiveDate) -> Result<i64>
where
    C: ConnectionTrait,
{
    let capacity = hall_capacity(db, session).await?;
    let sold = seats_sold(db, session.id, date).await?;
    checked_remaining(session.id, date, capacity, sold)
}

/// Unsold seats for every show date that has at least one purchase.
///
/// Days without purchases are at full capacity and are omitted.
pub async fn free_seats_by_day<C>(db: &C, session: &session::Model) -> Result<Vec<DayAvailability>>
where
    C: ConnectionTrait,
{
    let capacity = hall_capacity(db, session).await?;

    let sold_by_day: Vec<(NaiveDate, i64)> = Purchase::find()
        .select_only()
        .column(purchase::Column::ShowDate)
        .column_as(purchase::Column::Quantity.sum(), "sold")
        .filter(purchase::Column::SessionId.eq(session.id))
        .filter(purchase::Column::Paid.eq(true))
        .group_by(purchase::Column::ShowDate)
        .order_by_asc(purchase::Column::ShowDate)
        .into_tuple()
        .all(db)
        .await?;

    sold_by_day
        .into_iter()
        .map(|(date, sold)| {
            Ok(DayAvailability {
                date,
                free_seats: checked_remaining(session.id, date, capacity, sold)?,
            })
        })
        .collect()
}

/// Every show date of the session's run, in order.
#[must_use]
pub fn session_dates(session: &session::Model) -> Vec<NaiveDate> {
    Slot::from(session).dates()
}

fn checked_remaining(session_id: i64, date: NaiveDate, capacity: i64, sold: i64) -> Result<i64> {
    let remaining = capacity - sold;
    if remaining < 0 {
        error!(
            session_id,
            %date,
            capacity,
            sold,
            "Session oversold: capacity invariant violated"
        );
        return Err(Error::InvariantViolation {
            message: format!(
                "Session {session_id} has {sold} seats sold on {date} but only {capacity} seats"
            ),
        });
    }
    Ok(remaining)
}
