//! Video business logic - ordered YouTube embeds on a restaurant page.
//!
//! Only YouTube links are accepted. The 11-character video id is parsed once
//! when the video is added and stored next to the submitted URL.

use crate::{
    core::{gallery, text},
    entities::{Video, video},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

/// Portal form for a video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInput {
    /// Title shown under the embed
    pub title: String,
    /// Any YouTube watch, short or share link
    pub url: String,
}

/// Extracts the video id from a YouTube URL.
///
/// Accepts `youtube.com/watch?v=`, `/embed/`, `/shorts/`, `/live/` and
/// `youtu.be/` links. Returns `None` for anything else.
#[must_use]
pub fn parse_youtube_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Videos of a restaurant in display order.
pub async fn list_videos<C>(conn: &C, restaurant_id: i64) -> Result<Vec<video::Model>>
where
    C: ConnectionTrait,
{
    Video::find()
        .filter(video::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(video::Column::SortOrder)
        .order_by_asc(video::Column::Id)
        .all(conn)
        .await
        .map_err(Into::into)
}

/// Appends a video at the end of the list.
///
/// # Errors
/// - [`Error::Validation`] for a missing title or a non-YouTube URL
/// - [`Error::LimitReached`] when the restaurant already has `max_videos`
#[instrument(skip(db, input))]
pub async fn add_video(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: VideoInput,
    max_videos: u64,
) -> Result<video::Model> {
    let title = text::required("title", &input.title, 150)?;
    let url = text::required("url", &input.url, 2048)?;
    let youtube_id = parse_youtube_id(&url)
        .ok_or_else(|| Error::validation("url", "يرجى إدخال رابط يوتيوب صالح"))?;

    let txn = db.begin().await?;
    let count = Video::find()
        .filter(video::Column::RestaurantId.eq(restaurant_id))
        .count(&txn)
        .await?;
    if count >= max_videos {
        return Err(Error::LimitReached {
            entity: "video",
            limit: max_videos,
        });
    }

    let video = video::ActiveModel {
        restaurant_id: Set(restaurant_id),
        title: Set(title),
        url: Set(url),
        youtube_id: Set(youtube_id),
        sort_order: Set(i32::try_from(count).unwrap_or(i32::MAX)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(restaurant_id, video_id = video.id, "video added");
    Ok(video)
}

/// Removes a video and renumbers the rest.
#[instrument(skip(db))]
pub async fn remove_video(db: &DatabaseConnection, restaurant_id: i64, video_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let video = Video::find_by_id(video_id)
        .filter(video::Column::RestaurantId.eq(restaurant_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("video", video_id))?;
    video.delete(&txn).await?;

    let remaining: Vec<i64> = list_videos(&txn, restaurant_id)
        .await?
        .into_iter()
        .map(|v| v.id)
        .collect();
    write_positions(&txn, &remaining).await?;
    txn.commit().await?;
    Ok(())
}

/// Persists a new display order; `ordered_ids` must list every video once.
#[instrument(skip(db, ordered_ids))]
pub async fn reorder_videos(
    db: &DatabaseConnection,
    restaurant_id: i64,
    ordered_ids: &[i64],
) -> Result<Vec<video::Model>> {
    let txn = db.begin().await?;
    let current: Vec<i64> = list_videos(&txn, restaurant_id)
        .await?
        .into_iter()
        .map(|v| v.id)
        .collect();
    gallery::ensure_same_items(&current, ordered_ids)?;

    write_positions(&txn, ordered_ids).await?;
    let videos = list_videos(&txn, restaurant_id).await?;
    txn.commit().await?;
    Ok(videos)
}

async fn write_positions<C>(conn: &C, ordered_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    for (position, id) in ordered_ids.iter().enumerate() {
        Video::update_many()
            .col_expr(
                video::Column::SortOrder,
                Expr::value(i32::try_from(position).unwrap_or(i32::MAX)),
            )
            .filter(video::Column::Id.eq(*id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn clip(id: &str) -> VideoInput {
        VideoInput {
            title: "Kitchen tour".to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    #[test]
    fn test_parse_youtube_id() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(parse_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(
            parse_youtube_id("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"),
            id
        );
        assert_eq!(parse_youtube_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(parse_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(parse_youtube_id("https://m.youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(parse_youtube_id(" https://www.youtube.com/live/dQw4w9WgXcQ "), id);

        assert_eq!(parse_youtube_id("https://vimeo.com/123456789"), None);
        assert_eq!(parse_youtube_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(parse_youtube_id("https://www.youtube.com/channel/UC123"), None);
        assert_eq!(parse_youtube_id("not a url"), None);
        assert_eq!(parse_youtube_id("ftp://youtu.be/dQw4w9WgXcQ"), None);
    }

    #[tokio::test]
    async fn test_videos_capped() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let limit = test_limits().max_videos;

        let ids = ["aaaaaaaaaa1", "aaaaaaaaaa2", "aaaaaaaaaa3", "aaaaaaaaaa4", "aaaaaaaaaa5"];
        for id in ids {
            let added = add_video(&db, restaurant.id, clip(id), limit).await?;
            assert_eq!(added.youtube_id, id);
        }
        let result = add_video(&db, restaurant.id, clip("aaaaaaaaaa6"), limit).await;
        assert!(matches!(
            result,
            Err(Error::LimitReached { entity: "video", limit: 5 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_youtube_rejected() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let input = VideoInput {
            title: "Promo".to_string(),
            url: "https://vimeo.com/123".to_string(),
        };
        let result = add_video(&db, restaurant.id, input, 5).await;
        assert!(matches!(result, Err(Error::Validation { field: "url", .. })));
        assert!(list_videos(&db, restaurant.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_and_remove_videos() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let a = add_video(&db, restaurant.id, clip("aaaaaaaaaa1"), 5).await?;
        let b = add_video(&db, restaurant.id, clip("aaaaaaaaaa2"), 5).await?;
        let c = add_video(&db, restaurant.id, clip("aaaaaaaaaa3"), 5).await?;

        let videos = reorder_videos(&db, restaurant.id, &[b.id, c.id, a.id]).await?;
        let ids: Vec<i64> = videos.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);

        remove_video(&db, restaurant.id, c.id).await?;
        let videos = list_videos(&db, restaurant.id).await?;
        let order: Vec<(i64, i32)> = videos.iter().map(|v| (v.id, v.sort_order)).collect();
        assert_eq!(order, vec![(b.id, 0), (a.id, 1)]);

        let result = remove_video(&db, restaurant.id, c.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
