//! User entity - An account with a role and a wallet balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Contact email
    pub email: String,
    /// Opaque API token presented as `Authorization: Token <token>`
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    /// Staff may manage the catalog and schedule
    pub is_staff: bool,
    /// Superusers have every capability
    pub is_superuser: bool,
    /// Wallet balance in cents, never negative
    pub wallet_cents: i64,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
