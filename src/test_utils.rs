//! Shared test utilities for the box office.
//!
//! This module provides common helper functions for setting up test databases
//! and creating halls, movies, sessions and accounts with sensible defaults.

use crate::{
    clock::FixedClock,
    core::{
        access::{Actor, Role},
        context::CoreContext,
        hall, movie,
        purchase::{self, Receipt},
        session::{self, SessionDraft},
        user::{self, NewUser},
    },
    entities,
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database inside `dir`.
///
/// Unlike the in-memory database this one is served by a pool of several
/// connections, so concurrent transactions really do interleave.
pub async fn setup_file_db(dir: &TempDir) -> Result<DatabaseConnection> {
    let path = dir.path().join("box_office.sqlite");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = crate::config::database::create_connection(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a regular account with the default wallet.
pub fn new_user(username: &str, token: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        token: token.to_string(),
        is_staff: false,
        is_superuser: false,
        wallet: None,
    }
}

/// Creates a regular account holding `wallet`. The token is `<username>-token`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    wallet: Decimal,
) -> Result<entities::user::Model> {
    let mut account = new_user(username, &format!("{username}-token"));
    account.wallet = Some(wallet);
    user::create_user(db, account).await
}

/// Time of day from hours and minutes.
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// A day in January 2025, the month every scenario is set in.
pub fn scenario_day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap_or_default()
}

/// A draft priced at 10.00 running from `days.0` to `days.1` of January 2025.
pub fn session_draft(
    hall_id: i64,
    movie_id: i64,
    days: (u32, u32),
    window: (NaiveTime, NaiveTime),
) -> SessionDraft {
    SessionDraft {
        hall_id,
        movie_id,
        start_date: scenario_day(days.0),
        end_date: scenario_day(days.1),
        start_time: window.0,
        end_time: window.1,
        price: Decimal::from(10),
    }
}

/// A database with one staff member and one customer, and a clock frozen at
/// noon on 2025-01-01.
pub struct BoxOfficeFixture {
    /// Core handles
    pub ctx: CoreContext,
    /// A staff actor
    pub staff: Actor,
    /// The customer's actor
    pub customer: Actor,
    /// The customer's account id (wallet 10000.00)
    pub customer_id: i64,
    /// Holds the database file of [`BoxOfficeFixture::on_disk`] fixtures
    _dir: Option<TempDir>,
}

impl BoxOfficeFixture {
    /// Sets up an in-memory database and both accounts.
    pub async fn new() -> Result<Self> {
        Self::with_db(setup_test_db().await?, None).await
    }

    /// Like [`BoxOfficeFixture::new`], but over a multi-connection database
    /// file in a temporary directory.
    pub async fn on_disk() -> Result<Self> {
        let dir = TempDir::new()?;
        let db = setup_file_db(&dir).await?;
        Self::with_db(db, Some(dir)).await
    }

    async fn with_db(db: DatabaseConnection, dir: Option<TempDir>) -> Result<Self> {

        let mut staff = new_user("staff", "staff-token");
        staff.is_staff = true;
        let staff = user::create_user(&db, staff).await?;
        let customer = user::create_user(&db, new_user("customer", "customer-token")).await?;

        let clock = FixedClock::new(scenario_day(1), hm(12, 0));
        Ok(Self {
            ctx: CoreContext::new(db, Arc::new(clock)),
            staff: Actor {
                user_id: Some(staff.id),
                role: Role::Staff,
            },
            customer: Actor::from_user(&customer),
            customer_id: customer.id,
            _dir: dir,
        })
    }

    /// The same data seen from a clock frozen at `date` `time`.
    #[must_use]
    pub fn at(self, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            ctx: CoreContext::new(self.ctx.db, Arc::new(FixedClock::new(date, time))),
            ..self
        }
    }

    /// Creates a hall as staff.
    pub async fn hall(&self, name: &str, seats: i32) -> Result<entities::hall::Model> {
        hall::create_hall(&self.ctx, &self.staff, name, seats).await
    }

    /// Creates a movie as staff.
    pub async fn movie(&self, title: &str) -> Result<entities::movie::Model> {
        let draft = movie::MovieDraft {
            title: title.to_string(),
            description: String::new(),
            year: 2024,
        };
        movie::create_movie(&self.ctx, &self.staff, &draft).await
    }

    /// Schedules a session as staff.
    pub async fn session(&self, draft: SessionDraft) -> Result<entities::session::Model> {
        session::create_session(&self.ctx, &self.staff, &draft).await
    }

    /// "Red Hall" with 50 seats showing one movie at 10.00, 18:00 to 20:00,
    /// 2025-01-01 through 2025-01-10.
    pub async fn scenario_session(&self) -> Result<entities::session::Model> {
        let red = self.hall("Red Hall", 50).await?;
        let movie = self.movie("The Matinee").await?;
        self.session(session_draft(red.id, movie.id, (1, 10), (hm(18, 0), hm(20, 0))))
            .await
    }

    /// Buys tickets as the customer.
    pub async fn buy(
        &self,
        showing: &entities::session::Model,
        quantity: i32,
        show_date: NaiveDate,
    ) -> Result<Receipt> {
        purchase::purchase_tickets(&self.ctx, &self.customer, showing.id, quantity, show_date)
            .await
    }
}
