//! Blog post entity - restaurant news and articles written in the portal.
//!
//! `content` is HTML produced by the portal's editor and stored verbatim.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Blog post database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_posts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning restaurant
    #[sea_orm(indexed)]
    pub restaurant_id: i64,
    /// Headline
    pub title: String,
    /// URL slug, unique within the restaurant
    pub slug: String,
    /// Plain-text summary derived from the content
    pub excerpt: String,
    /// HTML body
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Hosted cover image URL
    pub cover_image_url: Option<String>,
    /// Drafts are only visible in the portal
    pub is_published: bool,
    /// Set the first time the post is published
    pub published_at: Option<DateTimeUtc>,
    /// When the post was created
    pub created_at: DateTimeUtc,
    /// When the post was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `BlogPost` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each post belongs to one restaurant
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
