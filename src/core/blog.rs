//! Blog business logic - restaurant posts written in the portal.
//!
//! Post bodies are HTML and stored as submitted. The excerpt shown in lists is
//! derived from the body on every save. `published_at` is stamped the first
//! time a post is published and kept if the post is later unpublished and
//! published again.

use crate::{
    core::{slug, text},
    entities::{BlogPost, blog_post},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Characters kept in a derived excerpt.
pub const EXCERPT_CHARS: usize = 200;

/// Portal form for a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostInput {
    /// Headline
    pub title: String,
    /// Slug; derived from the title when absent
    #[serde(default)]
    pub slug: Option<String>,
    /// HTML body
    pub content: String,
    /// Hosted cover image
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Visible on the public page
    #[serde(default)]
    pub is_published: bool,
}

struct ValidPost {
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    cover_image_url: Option<String>,
}

fn validate(input: &BlogPostInput) -> Result<ValidPost> {
    let title = text::required("title", &input.title, 200)?;
    let slug = slug::slug_or_derive(input.slug.as_deref(), &title);
    if slug.is_empty() {
        return Err(Error::validation("slug", "الرابط المختصر غير صالح"));
    }
    if input.content.trim().is_empty() {
        return Err(Error::validation("content", "هذا الحقل مطلوب"));
    }
    Ok(ValidPost {
        title,
        slug,
        excerpt: text::excerpt(&input.content, EXCERPT_CHARS),
        content: input.content.clone(),
        cover_image_url: text::optional_url("cover_image_url", input.cover_image_url.as_deref())?,
    })
}

async fn ensure_unique_slug(
    db: &DatabaseConnection,
    restaurant_id: i64,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = BlogPost::find()
        .filter(blog_post::Column::RestaurantId.eq(restaurant_id))
        .filter(blog_post::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(blog_post::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::duplicate("blog post", slug));
    }
    Ok(())
}

async fn get_restaurant_post(
    db: &DatabaseConnection,
    restaurant_id: i64,
    post_id: i64,
) -> Result<blog_post::Model> {
    BlogPost::find_by_id(post_id)
        .filter(blog_post::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("blog post", post_id))
}

/// Every post of a restaurant, drafts included, newest first.
pub async fn list_posts(db: &DatabaseConnection, restaurant_id: i64) -> Result<Vec<blog_post::Model>> {
    BlogPost::find()
        .filter(blog_post::Column::RestaurantId.eq(restaurant_id))
        .order_by_desc(blog_post::Column::CreatedAt)
        .order_by_desc(blog_post::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Published posts, most recently published first.
pub async fn list_published_posts(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<blog_post::Model>> {
    BlogPost::find()
        .filter(blog_post::Column::RestaurantId.eq(restaurant_id))
        .filter(blog_post::Column::IsPublished.eq(true))
        .order_by_desc(blog_post::Column::PublishedAt)
        .order_by_desc(blog_post::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A published post by slug; drafts are reported as missing.
pub async fn get_published_post(
    db: &DatabaseConnection,
    restaurant_id: i64,
    slug: &str,
) -> Result<blog_post::Model> {
    BlogPost::find()
        .filter(blog_post::Column::RestaurantId.eq(restaurant_id))
        .filter(blog_post::Column::Slug.eq(slug))
        .filter(blog_post::Column::IsPublished.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("blog post", slug))
}

/// Writes a new post.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank title or body and
/// [`Error::Duplicate`] when the slug is taken within the restaurant.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_post(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: BlogPostInput,
) -> Result<blog_post::Model> {
    let valid = validate(&input)?;
    ensure_unique_slug(db, restaurant_id, &valid.slug, None).await?;

    let now = chrono::Utc::now();
    let post = blog_post::ActiveModel {
        restaurant_id: Set(restaurant_id),
        title: Set(valid.title),
        slug: Set(valid.slug),
        excerpt: Set(valid.excerpt),
        content: Set(valid.content),
        cover_image_url: Set(valid.cover_image_url),
        is_published: Set(input.is_published),
        published_at: Set(input.is_published.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(post_id = post.id, restaurant_id, published = post.is_published, "blog post created");
    Ok(post)
}

/// Rewrites a post.
#[instrument(skip(db, input))]
pub async fn update_post(
    db: &DatabaseConnection,
    restaurant_id: i64,
    post_id: i64,
    input: BlogPostInput,
) -> Result<blog_post::Model> {
    let valid = validate(&input)?;
    let existing = get_restaurant_post(db, restaurant_id, post_id).await?;
    ensure_unique_slug(db, restaurant_id, &valid.slug, Some(post_id)).await?;

    let now = chrono::Utc::now();
    let published_at = match existing.published_at {
        None if input.is_published => Some(now),
        kept => kept,
    };

    let mut post: blog_post::ActiveModel = existing.into();
    post.title = Set(valid.title);
    post.slug = Set(valid.slug);
    post.excerpt = Set(valid.excerpt);
    post.content = Set(valid.content);
    post.cover_image_url = Set(valid.cover_image_url);
    post.is_published = Set(input.is_published);
    post.published_at = Set(published_at);
    post.updated_at = Set(now);
    post.update(db).await.map_err(Into::into)
}

/// Deletes a post.
#[instrument(skip(db))]
pub async fn delete_post(db: &DatabaseConnection, restaurant_id: i64, post_id: i64) -> Result<()> {
    let post = get_restaurant_post(db, restaurant_id, post_id).await?;
    post.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn post(title: &str, published: bool) -> BlogPostInput {
        BlogPostInput {
            title: title.to_string(),
            content: "<p>Our <b>new</b> menu&nbsp;is here</p>".to_string(),
            is_published: published,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_post_derives_slug_and_excerpt() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let created = create_post(&db, restaurant.id, post("Summer Menu", true)).await?;

        assert_eq!(created.slug, "summer-menu");
        assert_eq!(created.excerpt, "Our new menu is here");
        assert_eq!(created.content, "<p>Our <b>new</b> menu&nbsp;is here</p>");
        assert!(created.published_at.is_some());

        let result = create_post(&db, restaurant.id, post("Summer menu!", false)).await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_public() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let draft = create_post(&db, restaurant.id, post("Coming Soon", false)).await?;
        create_post(&db, restaurant.id, post("Opening Day", true)).await?;

        assert_eq!(list_posts(&db, restaurant.id).await?.len(), 2);
        let public = list_published_posts(&db, restaurant.id).await?;
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].slug, "opening-day");

        let result = get_published_post(&db, restaurant.id, &draft.slug).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_published_at_set_once() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let draft = create_post(&db, restaurant.id, post("News", false)).await?;
        assert!(draft.published_at.is_none());

        let published = update_post(&db, restaurant.id, draft.id, post("News", true)).await?;
        let first_published = published.published_at;
        assert!(first_published.is_some());

        let hidden = update_post(&db, restaurant.id, draft.id, post("News", false)).await?;
        assert!(!hidden.is_published);
        assert_eq!(hidden.published_at, first_published);

        let again = update_post(&db, restaurant.id, draft.id, post("News", true)).await?;
        assert_eq!(again.published_at, first_published);
        Ok(())
    }

    #[tokio::test]
    async fn test_post_requires_content() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let mut input = post("Empty", true);
        input.content = "   ".to_string();
        let result = create_post(&db, restaurant.id, input).await;
        assert!(matches!(result, Err(Error::Validation { field: "content", .. })));

        delete_post(&db, restaurant.id, 42).await.unwrap_err();
        Ok(())
    }
}
