//! Cuisine business logic - the country/cuisine taxonomy restaurants are browsed by.
//!
//! Cuisines are managed from the dashboard. Names and slugs are unique, and a
//! cuisine cannot be deleted while any restaurant is still listed under it.

use crate::{
    config::settings::CuisineSeed,
    core::{slug, text},
    entities::{Country, Restaurant, RestaurantStatus, country, restaurant},
    errors::{Error, Result},
};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Dashboard form for creating or editing a cuisine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CuisineInput {
    /// Display name
    pub name: String,
    /// Slug; derived from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional image URL
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A cuisine with the number of restaurants visible under it.
#[derive(Debug, Clone, Serialize)]
pub struct CuisineSummary {
    /// The cuisine
    #[serde(flatten)]
    pub cuisine: country::Model,
    /// Active restaurants listed under the cuisine
    pub restaurant_count: u64,
}

struct ValidCuisine {
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
}

fn validate(input: &CuisineInput) -> Result<ValidCuisine> {
    let name = text::required("name", &input.name, 100)?;
    let slug = slug::slug_or_derive(input.slug.as_deref(), &name);
    if slug.is_empty() {
        return Err(Error::validation("slug", "الرابط المختصر غير صالح"));
    }
    Ok(ValidCuisine {
        name,
        slug,
        description: text::optional("description", input.description.as_deref(), 2000)?,
        image_url: text::optional_url("image_url", input.image_url.as_deref())?,
    })
}

async fn ensure_unique(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = Country::find().filter(
        Condition::any()
            .add(country::Column::Name.eq(name))
            .add(country::Column::Slug.eq(slug)),
    );
    if let Some(id) = exclude_id {
        query = query.filter(country::Column::Id.ne(id));
    }
    if let Some(existing) = query.one(db).await? {
        let key = if existing.name == name { name } else { slug };
        return Err(Error::duplicate("cuisine", key));
    }
    Ok(())
}

/// Retrieves all cuisines ordered alphabetically by name.
pub async fn list_cuisines(db: &DatabaseConnection) -> Result<Vec<country::Model>> {
    Country::find()
        .order_by_asc(country::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all cuisines with the count of active restaurants under each.
pub async fn list_cuisines_with_counts(db: &DatabaseConnection) -> Result<Vec<CuisineSummary>> {
    let cuisines = list_cuisines(db).await?;
    let country_ids: Vec<i64> = Restaurant::find()
        .select_only()
        .column(restaurant::Column::CountryId)
        .filter(restaurant::Column::Status.eq(RestaurantStatus::Active.as_str()))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<i64, u64> = HashMap::new();
    for id in country_ids {
        *counts.entry(id).or_default() += 1;
    }

    Ok(cuisines
        .into_iter()
        .map(|cuisine| CuisineSummary {
            restaurant_count: counts.get(&cuisine.id).copied().unwrap_or(0),
            cuisine,
        })
        .collect())
}

/// Finds a cuisine by its slug.
pub async fn get_cuisine_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<country::Model>> {
    Country::find()
        .filter(country::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a cuisine by its id.
pub async fn get_cuisine_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<country::Model>> {
    Country::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Creates a cuisine after validating it and checking name/slug uniqueness.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name, [`Error::Duplicate`] when
/// the name or slug is taken, or a database error.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_cuisine(db: &DatabaseConnection, input: CuisineInput) -> Result<country::Model> {
    let valid = validate(&input)?;
    ensure_unique(db, &valid.name, &valid.slug, None).await?;

    let cuisine = country::ActiveModel {
        name: Set(valid.name),
        slug: Set(valid.slug),
        description: Set(valid.description),
        image_url: Set(valid.image_url),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = cuisine.insert(db).await?;
    info!(cuisine_id = created.id, "cuisine created");
    Ok(created)
}

/// Updates a cuisine; the uniqueness check ignores the cuisine itself.
#[instrument(skip(db, input))]
pub async fn update_cuisine(
    db: &DatabaseConnection,
    id: i64,
    input: CuisineInput,
) -> Result<country::Model> {
    let valid = validate(&input)?;
    let mut cuisine: country::ActiveModel = get_cuisine_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("cuisine", id))?
        .into();
    ensure_unique(db, &valid.name, &valid.slug, Some(id)).await?;

    cuisine.name = Set(valid.name);
    cuisine.slug = Set(valid.slug);
    cuisine.description = Set(valid.description);
    cuisine.image_url = Set(valid.image_url);
    cuisine.update(db).await.map_err(Into::into)
}

/// Deletes a cuisine that no restaurant references.
///
/// # Errors
/// Returns [`Error::InUse`] when restaurants are listed under the cuisine,
/// regardless of their status.
#[instrument(skip(db))]
pub async fn delete_cuisine(db: &DatabaseConnection, id: i64) -> Result<()> {
    let cuisine = get_cuisine_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("cuisine", id))?;

    let dependents = Restaurant::find()
        .filter(restaurant::Column::CountryId.eq(id))
        .count(db)
        .await?;
    if dependents > 0 {
        return Err(Error::InUse {
            entity: "cuisine",
            key: cuisine.slug,
            dependents,
        });
    }

    Country::delete_by_id(id).exec(db).await?;
    info!(cuisine_id = id, "cuisine deleted");
    Ok(())
}

/// Inserts every configured cuisine whose slug is not present yet.
///
/// Returns the number of cuisines inserted; running it twice inserts nothing
/// the second time.
pub async fn seed_cuisines(db: &DatabaseConnection, seeds: &[CuisineSeed]) -> Result<usize> {
    let mut inserted = 0;
    for seed in seeds {
        let input = CuisineInput {
            name: seed.name.clone(),
            slug: seed.slug.clone(),
            description: seed.description.clone(),
            image_url: seed.image_url.clone(),
        };
        let valid = validate(&input)?;
        if get_cuisine_by_slug(db, &valid.slug).await?.is_some() {
            continue;
        }
        create_cuisine(db, input).await?;
        inserted += 1;
    }
    if inserted > 0 {
        info!("Seeded {inserted} cuisine(s)");
    }
    Ok(inserted)
}
