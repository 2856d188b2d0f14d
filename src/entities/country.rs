//! Country entity - the cuisine a restaurant belongs to.
//!
//! Countries are the primary browse taxonomy ("Syrian", "Italian", ...). Each
//! restaurant references exactly one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cuisine/country database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "المطبخ السوري")
    #[sea_orm(unique)]
    pub name: String,
    /// URL slug, unique across cuisines
    #[sea_orm(unique)]
    pub slug: String,
    /// Optional blurb shown on the cuisine page
    pub description: Option<String>,
    /// Hosted image or flag URL
    pub image_url: Option<String>,
    /// When the cuisine was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Country and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One cuisine has many restaurants
    #[sea_orm(has_many = "super::restaurant::Entity")]
    Restaurants,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
