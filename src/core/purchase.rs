//! Purchase processor - turns a ticket request into a paid purchase.
//!
//! A purchase holds its hall's shared lock and the exclusive lock of its
//! `(session, show date)` pair. Inside one transaction it checks the schedule,
//! counts free seats, checks the wallet, records the purchase and debits the
//! wallet. Any failure drops the transaction, which rolls everything back.

use crate::{
    clock::Clock,
    core::{
        access::{Action, Actor},
        context::CoreContext,
        ledger, user,
    },
    entities::{Purchase, Session, purchase, session},
    errors::{Error, PurchaseRejection, Result},
    money,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};
use tracing::{error, info, instrument};

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// The stored purchase
    pub purchase: purchase::Model,
    /// Price times quantity
    pub total: Decimal,
    /// Buyer's balance after the debit
    pub wallet_balance: Decimal,
}

/// One purchase with its derived amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseLine {
    /// The stored purchase
    #[serde(flatten)]
    pub purchase: purchase::Model,
    /// Ticket price of the session
    pub price: Decimal,
    /// Price times quantity
    pub total: Decimal,
}

/// A buyer's purchases, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseHistory {
    /// Individual purchases
    pub purchases: Vec<PurchaseLine>,
    /// Sum of all line totals
    pub total: Decimal,
}

fn line(purchase: purchase::Model, session: &session::Model) -> Result<PurchaseLine> {
    let total = money::total_cents(session.price_cents, purchase.quantity)?;
    Ok(PurchaseLine {
        purchase,
        price: money::from_cents(session.price_cents),
        total: money::from_cents(total),
    })
}

/// Schedule rules for a show date, checked in order: not in the past, not
/// already started today, within the run.
pub fn check_show_date(
    session: &session::Model,
    show_date: NaiveDate,
    today: NaiveDate,
    now: NaiveTime,
) -> std::result::Result<(), PurchaseRejection> {
    if show_date < today {
        return Err(PurchaseRejection::DateInPast { show_date });
    }
    if show_date == today && now > session.start_time {
        return Err(PurchaseRejection::SessionStarted {
            start_time: session.start_time,
        });
    }
    if show_date < session.start_date || show_date > session.end_date {
        return Err(PurchaseRejection::OutsideRun {
            show_date,
            start_date: session.start_date,
            end_date: session.end_date,
        });
    }
    Ok(())
}

/// Takes the hall (shared) and seat (exclusive) locks for a purchase.
///
/// The session's hall is re-read under the hall lock in case the session was
/// moved while we waited.
async fn lock_for_purchase(
    ctx: &CoreContext,
    session_id: i64,
    show_date: NaiveDate,
) -> Result<(OwnedRwLockReadGuard<()>, OwnedRwLockWriteGuard<()>)> {
    let find = || async {
        Session::find_by_id(session_id)
            .one(&ctx.db)
            .await?
            .ok_or(Error::NotFound {
                entity: "Session",
                id: session_id,
            })
    };

    loop {
        let seen = find().await?;
        let hall_guard = ctx.locks().halls.shared(seen.hall_id).await;
        if find().await?.hall_id == seen.hall_id {
            let seat_guard = ctx.locks().seats.exclusive((session_id, show_date)).await;
            return Ok((hall_guard, seat_guard));
        }
    }
}

/// Buys `quantity` tickets for `show_date` and pays for them from the actor's wallet.
#[instrument(skip(ctx))]
pub async fn purchase_tickets(
    ctx: &CoreContext,
    actor: &Actor,
    session_id: i64,
    quantity: i32,
    show_date: NaiveDate,
) -> Result<Receipt> {
    actor.require(Action::Purchase)?;
    let user_id = actor.user_id.ok_or(Error::Unauthenticated)?;
    if quantity < 1 {
        return Err(Error::validation("Quantity must be at least 1"));
    }

    let (_hall_lock, _seat_lock) = lock_for_purchase(ctx, session_id, show_date).await?;
    let txn = ctx.db.begin().await?;

    let session = Session::find_by_id(session_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Session",
            id: session_id,
        })?;

    let clock: &dyn Clock = ctx.clock();
    check_show_date(&session, show_date, clock.today(), clock.time_of_day())?;

    let available = ledger::free_seats(&txn, &session, show_date).await?;
    if available < i64::from(quantity) {
        return Err(PurchaseRejection::InsufficientCapacity {
            available,
            requested: quantity,
        }
        .into());
    }

    let total_cents = money::total_cents(session.price_cents, quantity)?;
    let buyer = user::get_user(&txn, user_id).await?.ok_or(Error::NotFound {
        entity: "User",
        id: user_id,
    })?;
    if buyer.wallet_cents < total_cents {
        return Err(PurchaseRejection::InsufficientFunds {
            balance: money::from_cents(buyer.wallet_cents),
            required: money::from_cents(total_cents),
        }
        .into());
    }

    let purchase = purchase::ActiveModel {
        user_id: Set(user_id),
        session_id: Set(session_id),
        quantity: Set(quantity),
        show_date: Set(show_date),
        timestamp: Set(clock.now()),
        paid: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let buyer = match user::debit(&txn, user_id, total_cents).await {
        Ok(buyer) => buyer,
        Err(Error::Rejected(rejection)) => {
            error!(user_id, total_cents, %rejection, "Debit failed after funds check");
            return Err(Error::InvariantViolation {
                message: format!("Debit of user {user_id} failed after funds check: {rejection}"),
            });
        }
        Err(e) => return Err(e),
    };

    txn.commit().await?;
    info!(purchase_id = purchase.id, user_id, total_cents, "Tickets purchased");

    Ok(Receipt {
        purchase,
        total: money::from_cents(total_cents),
        wallet_balance: money::from_cents(buyer.wallet_cents),
    })
}

/// All purchases of a user with per-line and grand totals.
pub async fn purchases_for_user<C>(db: &C, user_id: i64) -> Result<PurchaseHistory>
where
    C: ConnectionTrait,
{
    let rows = Purchase::find()
        .find_also_related(Session)
        .filter(purchase::Column::UserId.eq(user_id))
        .order_by_desc(purchase::Column::Timestamp)
        .order_by_desc(purchase::Column::Id)
        .all(db)
        .await?;

    let mut purchases = Vec::with_capacity(rows.len());
    for (purchase, session) in rows {
        let session = session.ok_or_else(|| Error::InvariantViolation {
            message: format!("Purchase {} references a missing session", purchase.id),
        })?;
        purchases.push(line(purchase, &session)?);
    }

    let total = purchases.iter().map(|l| l.total).sum();
    Ok(PurchaseHistory { purchases, total })
}

/// One purchase of `user_id`, visible to its owner and to staff.
pub async fn get_purchase<C>(
    db: &C,
    actor: &Actor,
    user_id: i64,
    purchase_id: i64,
) -> Result<PurchaseLine>
where
    C: ConnectionTrait,
{
    actor.require(Action::ViewOwnPurchases)?;
    if !actor.can_view_purchases_of(user_id) {
        return Err(Error::PermissionDenied {
            action: Action::ViewAllPurchases,
        });
    }

    let not_found = || Error::NotFound {
        entity: "Purchase",
        id: purchase_id,
    };
    let (purchase, session) = Purchase::find_by_id(purchase_id)
        .find_also_related(Session)
        .filter(purchase::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(not_found)?;
    let session = session.ok_or_else(not_found)?;

    line(purchase, &session)
}
