//! Feature entity - a restaurant's highlighted feature (e.g., "جلسات خارجية", "واي فاي مجاني").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "features")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Title, unique within the restaurant (case-insensitive)
    pub title: String,
    /// Optional longer text
    pub description: Option<String>,
    /// Icon name understood by the front end
    pub icon: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Feature and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each feature belongs to one restaurant
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_delete = "Cascade"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
