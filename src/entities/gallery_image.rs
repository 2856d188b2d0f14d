//! Gallery image entity - an ordered photo on a restaurant's page.
//!
//! `sort_order` is stored in the `order` column and is 0-based and contiguous
//! within a restaurant after every add/remove/reorder.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gallery image database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_images")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Hosted image URL
    pub image_url: String,
    /// Optional caption
    pub caption: Option<String>,
    /// Display position
    #[sea_orm(column_name = "order")]
    pub sort_order: i32,
    /// When the image was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `GalleryImage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each image belongs to one restaurant
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
