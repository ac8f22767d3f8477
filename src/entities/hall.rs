//! Hall entity - A screening room with a fixed number of seats.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hall database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "halls")]
pub struct Model {
    /// Unique identifier for the hall
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across halls
    #[sea_orm(unique)]
    pub name: String,
    /// Seats available for every screening in this hall
    pub seats: i32,
}

/// Defines relationships between Hall and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One hall hosts many sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
