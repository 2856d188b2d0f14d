//! Restaurant entity - a listed restaurant and its public profile.
//!
//! The `status` column holds a [`RestaurantStatus`] as text; only `ACTIVE`
//! restaurants are visible to the public. `rating` and `rating_count` are
//! denormalized from restaurant reviews and recomputed on every review change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Restaurant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL slug, unique across restaurants
    #[sea_orm(unique)]
    pub slug: String,
    /// Cuisine this restaurant is listed under
    pub country_id: i64,
    /// Auth-provider user id of the owner who manages it through the portal
    #[sea_orm(indexed)]
    pub owner_id: String,
    /// `ACTIVE`, `SUSPENDED` or `INACTIVE`
    pub status: String,
    /// Free-text description
    pub description: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Phone number as entered
    pub phone: Option<String>,
    /// WhatsApp number used for click-to-chat links
    pub whatsapp: Option<String>,
    /// Google Maps link or place query
    pub map_url: Option<String>,
    /// Hosted logo URL
    pub logo_url: Option<String>,
    /// Hosted cover image URL
    pub cover_url: Option<String>,
    /// Facebook page
    pub facebook_url: Option<String>,
    /// Instagram profile
    pub instagram_url: Option<String>,
    /// Opening hours as free text (e.g., "يومياً 10ص - 12م")
    pub opening_hours: Option<String>,
    /// Average review rating rounded to one decimal
    pub rating: f64,
    /// Number of reviews the rating is computed from
    pub rating_count: i32,
    /// When the restaurant was created
    pub created_at: DateTimeUtc,
    /// When the restaurant was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Restaurant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each restaurant belongs to one cuisine
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id"
    )]
    Country,
    /// One restaurant has many dishes
    #[sea_orm(has_many = "super::dish::Entity")]
    Dishes,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dishes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Listing status of a restaurant, set directly by the dashboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestaurantStatus {
    /// Visible to the public
    Active,
    /// Hidden by an administrator
    Suspended,
    /// Hidden, e.g. closed or not yet launched
    Inactive,
}

impl RestaurantStatus {
    /// Value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestaurantStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            "INACTIVE" => Ok(Self::Inactive),
            other => Err(crate::errors::Error::validation(
                "status",
                format!("حالة المطعم غير معروفة: {other}"),
            )),
        }
    }
}
