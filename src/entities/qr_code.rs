//! QR code entity - the scan counter for a restaurant's printed QR code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// QR code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Restaurant the code points at; one code per restaurant
    #[sea_orm(unique)]
    pub restaurant_id: i64,
    /// Total number of scans
    pub scan_count: i64,
    /// Time of the most recent scan
    pub last_scanned_at: Option<DateTimeUtc>,
    /// When the counter was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `QrCode` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each code belongs to one restaurant
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
