//! Overlap rules for sessions sharing a hall.
//!
//! Two sessions in one hall conflict only when their date ranges overlap AND their
//! daily time windows overlap. Ranges are closed, so touching boundaries overlap.

use crate::{
    entities::{Session, session},
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, prelude::*};

/// Closed-interval overlap test: `[a_start, a_end]` and `[b_start, b_end]`
/// overlap iff `a_start <= b_end && b_start <= a_end`.
pub fn ranges_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// The days and daily hours a session occupies its hall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// First day of the run
    pub start_date: NaiveDate,
    /// Last day of the run (inclusive)
    pub end_date: NaiveDate,
    /// Daily start time
    pub start_time: NaiveTime,
    /// Daily end time
    pub end_time: NaiveTime,
}

impl Slot {
    /// Whether both the date ranges and the time windows overlap.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        ranges_overlap(
            self.start_date,
            self.end_date,
            other.start_date,
            other.end_date,
        ) && ranges_overlap(
            self.start_time,
            self.end_time,
            other.start_time,
            other.end_time,
        )
    }

    /// Every day of the run, in order.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start_date
            .iter_days()
            .take_while(|day| *day <= self.end_date)
            .collect()
    }

    /// Whether `day` falls within the run.
    #[must_use]
    pub fn runs_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

impl From<&session::Model> for Slot {
    fn from(session: &session::Model) -> Self {
        Self {
            start_date: session.start_date,
            end_date: session.end_date,
            start_time: session.start_time,
            end_time: session.end_time,
        }
    }
}

/// Finds the first session in `hall_id` that conflicts with `slot`, skipping
/// `exclude` (the session being edited).
pub async fn find_conflict<C>(
    db: &C,
    hall_id: i64,
    slot: &Slot,
    exclude: Option<i64>,
) -> Result<Option<session::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Session::find()
        .filter(session::Column::HallId.eq(hall_id))
        .filter(session::Column::StartDate.lte(slot.end_date))
        .filter(session::Column::EndDate.gte(slot.start_date));
    if let Some(session_id) = exclude {
        query = query.filter(session::Column::Id.ne(session_id));
    }

    let candidates = query.order_by_asc(session::Column::Id).all(db).await?;

    Ok(candidates
        .into_iter()
        .find(|candidate| Slot::from(candidate).conflicts_with(slot)))
}
