//! Identity and wallet logic.
//!
//! Accounts are looked up by API token to build the request principal. The wallet
//! is only ever debited here, through a conditional update that cannot take the
//! balance below zero.

use crate::{
    entities::{User, user},
    errors::{Error, PurchaseRejection, Result},
    money,
};
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Starting balance for accounts created without an explicit wallet.
pub const DEFAULT_WALLET_CENTS: i64 = 1_000_000;

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name, unique
    pub username: String,
    /// Contact email
    pub email: String,
    /// API token, unique
    pub token: String,
    /// Staff flag
    pub is_staff: bool,
    /// Superuser flag
    pub is_superuser: bool,
    /// Opening balance, defaults to 10000.00
    pub wallet: Option<Decimal>,
}

/// Creates an account after validating the username, token and opening balance.
pub async fn create_user<C>(db: &C, new_user: NewUser) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let username = new_user.username.trim().to_string();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    if new_user.token.trim().is_empty() {
        return Err(Error::validation("Token cannot be empty"));
    }

    let wallet_cents = match new_user.wallet {
        Some(amount) => money::to_cents(amount)?,
        None => DEFAULT_WALLET_CENTS,
    };
    if wallet_cents < 0 {
        return Err(Error::validation("Wallet balance cannot be negative"));
    }

    let account = user::ActiveModel {
        username: Set(username),
        email: Set(new_user.email),
        token: Set(new_user.token.trim().to_string()),
        is_staff: Set(new_user.is_staff),
        is_superuser: Set(new_user.is_superuser),
        wallet_cents: Set(wallet_cents),
        ..Default::default()
    };

    account.insert(db).await.map_err(Into::into)
}

/// Finds an account by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds an account by username.
pub async fn get_user_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves an API token to its account.
pub async fn find_by_token<C>(db: &C, token: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    if token.is_empty() {
        return Ok(None);
    }

    User::find()
        .filter(user::Column::Token.eq(token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Takes `amount_cents` out of the wallet.
///
/// Runs as one conditional statement,
/// `UPDATE users SET wallet_cents = wallet_cents - ? WHERE id = ? AND wallet_cents >= ?`,
/// so a concurrent debit can never overdraw the account. Call it on the same
/// transaction that records what is being paid for.
#[instrument(skip(db))]
pub async fn debit<C>(db: &C, user_id: i64, amount_cents: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if amount_cents < 0 {
        return Err(Error::validation("Debit amount cannot be negative"));
    }

    let outcome = User::update_many()
        .col_expr(
            user::Column::WalletCents,
            Expr::col(user::Column::WalletCents).sub(amount_cents),
        )
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::WalletCents.gte(amount_cents))
        .exec(db)
        .await?;

    let account = get_user(db, user_id).await?.ok_or(Error::NotFound {
        entity: "User",
        id: user_id,
    })?;

    if outcome.rows_affected == 0 {
        debug!(balance = account.wallet_cents, "Debit refused");
        return Err(PurchaseRejection::InsufficientFunds {
            balance: money::from_cents(account.wallet_cents),
            required: money::from_cents(amount_cents),
        }
        .into());
    }

    Ok(account)
}
