//! Role-based capability checks.
//!
//! Every mutating core operation asks the [`Actor`] whether it may perform an
//! [`Action`] before touching the store.

use crate::{
    entities::user,
    errors::{Error, Result},
};
use serde::Serialize;
use std::fmt;

/// Role of the caller, derived from the account flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// No credentials presented
    Anonymous,
    /// Regular authenticated account
    Customer,
    /// Cinema staff
    Staff,
    /// Administrator
    Superuser,
}

impl Role {
    /// Picks the highest role the account flags grant.
    #[must_use]
    pub const fn from_flags(is_staff: bool, is_superuser: bool) -> Self {
        if is_superuser {
            Self::Superuser
        } else if is_staff {
            Self::Staff
        } else {
            Self::Customer
        }
    }
}

/// Things an actor may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the public catalog and schedule
    Browse,
    /// Create, edit or delete halls and movies
    ManageCatalog,
    /// Create, edit or delete sessions
    ManageSessions,
    /// Buy tickets
    Purchase,
    /// Read one's own purchases
    ViewOwnPurchases,
    /// Read anybody's purchases
    ViewAllPurchases,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browse => "browse",
            Self::ManageCatalog => "manage catalog",
            Self::ManageSessions => "manage sessions",
            Self::Purchase => "purchase tickets",
            Self::ViewOwnPurchases => "view own purchases",
            Self::ViewAllPurchases => "view all purchases",
        };
        f.write_str(name)
    }
}

/// The principal on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Account id, `None` when anonymous
    pub user_id: Option<i64>,
    /// Effective role
    pub role: Role,
}

impl Actor {
    /// An unauthenticated caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::Anonymous,
        }
    }

    /// The actor for a stored account.
    #[must_use]
    pub const fn from_user(user: &user::Model) -> Self {
        Self {
            user_id: Some(user.id),
            role: Role::from_flags(user.is_staff, user.is_superuser),
        }
    }

    /// Whether the role grants `action`.
    #[must_use]
    pub const fn can(&self, action: Action) -> bool {
        match action {
            Action::Browse => true,
            Action::Purchase | Action::ViewOwnPurchases => !matches!(self.role, Role::Anonymous),
            Action::ManageCatalog | Action::ManageSessions | Action::ViewAllPurchases => {
                matches!(self.role, Role::Staff | Role::Superuser)
            }
        }
    }

    /// Fails with [`Error::Unauthenticated`] or [`Error::PermissionDenied`]
    /// unless the role grants `action`.
    pub fn require(&self, action: Action) -> Result<()> {
        if self.can(action) {
            Ok(())
        } else if self.role == Role::Anonymous {
            Err(Error::Unauthenticated)
        } else {
            Err(Error::PermissionDenied { action })
        }
    }

    /// Owners see their own purchases; staff see everyone's.
    #[must_use]
    pub fn can_view_purchases_of(&self, owner_id: i64) -> bool {
        self.can(Action::ViewAllPurchases)
            || (self.can(Action::ViewOwnPurchases) && self.user_id == Some(owner_id))
    }
}
