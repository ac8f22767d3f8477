//! Movie entity - A film that can be scheduled into sessions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movie database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    /// Unique identifier for the movie
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Movie title
    pub title: String,
    /// Free-form description, may be empty
    pub description: String,
    /// Release year
    pub year: i32,
}

/// Defines relationships between Movie and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One movie is shown in many sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
