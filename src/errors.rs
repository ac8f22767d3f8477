//! Unified error types for the box office.
//!
//! Every core operation returns [`Result`]. Purchase rejections are a separate
//! enum so callers can tell them apart without matching on message strings.

use crate::core::access::Action;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a ticket purchase is turned down. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseRejection {
    /// The requested show date lies before today.
    #[error("Show date {show_date} cannot be less than today")]
    DateInPast {
        /// Requested show date
        show_date: NaiveDate,
    },

    /// The show date is today and the daily screening has already begun.
    #[error("The session has already started at {start_time}. Please choose another session or day")]
    SessionStarted {
        /// Daily start time of the session
        start_time: NaiveTime,
    },

    /// The show date is not one of the days the session runs.
    #[error("You can only select dates between {start_date} and {end_date}")]
    OutsideRun {
        /// Requested show date
        show_date: NaiveDate,
        /// First day of the run
        start_date: NaiveDate,
        /// Last day of the run
        end_date: NaiveDate,
    },

    /// Not enough unsold seats left for that day.
    #[error("Only {available} tickets available for purchase")]
    InsufficientCapacity {
        /// Seats still unsold for the show date
        available: i64,
        /// Seats requested
        requested: i32,
    },

    /// The wallet cannot cover the total.
    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Wallet balance at the time of the check
        balance: Decimal,
        /// Total price of the purchase
        required: Decimal,
    },
}

impl PurchaseRejection {
    /// Stable machine-readable code for the rejection.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DateInPast { .. } => "DATE_IN_PAST",
            Self::SessionStarted { .. } => "SESSION_STARTED",
            Self::OutsideRun { .. } => "OUTSIDE_RUN",
            Self::InsufficientCapacity { .. } => "INSUFFICIENT_CAPACITY",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
        }
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A session would overlap an existing one in the same hall.
    #[error("Hall {hall_id} is already reserved at this time or date by session {session_id}")]
    Conflict {
        /// Hall in which the overlap was found
        hall_id: i64,
        /// The existing session that overlaps
        session_id: i64,
    },

    /// Structural change blocked by existing records.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why the change is blocked
        message: String,
    },

    /// The caller is not authenticated.
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller's role does not allow the action.
    #[error("Permission denied: {action}")]
    PermissionDenied {
        /// The action that was refused
        action: Action,
    },

    /// No entity with that id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// A purchase was turned down.
    #[error(transparent)]
    Rejected(#[from] PurchaseRejection),

    /// Stored data contradicts an invariant the core maintains.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Description of the broken invariant
        message: String,
    },

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "SCHEDULE_CONFLICT",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Unauthenticated => "AUTH_ERROR",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Rejected(rejection) => rejection.code(),
            Self::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config { .. } | Self::Io(_) | Self::EnvVar(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
