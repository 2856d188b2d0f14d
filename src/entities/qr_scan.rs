//! QR scan entity - one row per recorded scan, used for daily counts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// QR scan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qr_scans")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Scanned restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// When the scan happened
    pub scanned_at: DateTimeUtc,
}

/// Defines relationships between `QrScan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each scan belongs to one restaurant
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
