//! Video entity - an ordered YouTube video on a restaurant's page.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Video database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Title shown under the embed
    pub title: String,
    /// URL as submitted by the owner
    pub url: String,
    /// 11-character YouTube video id parsed from `url`
    pub youtube_id: String,
    /// Display position
    #[sea_orm(column_name = "order")]
    pub sort_order: i32,
    /// When the video was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Video and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each video belongs to one restaurant
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
