//! QR code business logic - scan tracking and statistics.
//!
//! The printed code encodes [`scan_url`], which points at the tracking
//! endpoint rather than the restaurant page. Each hit bumps the restaurant's
//! counter and appends a row to `qr_scans` so daily counts can be derived.
//! Days are UTC calendar days.

use crate::{
    core::restaurant,
    entities::{QrCode, QrScan, qr_code, qr_scan},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Default window for [`get_stats`].
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// Scan statistics shown in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrStats {
    /// All-time scan count
    pub total_scans: i64,
    /// Most recent scan, if any
    pub last_scanned_at: Option<DateTime<Utc>>,
    /// Scans since midnight UTC
    pub scans_today: u64,
    /// One entry per day of the window, oldest first, zero days included
    pub daily: Vec<DailyScans>,
}

/// Scan count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyScans {
    /// UTC day
    pub date: NaiveDate,
    /// Scans on that day
    pub count: u64,
}

/// The URL encoded in a restaurant's QR code.
#[must_use]
pub fn scan_url(public_base_url: &str, slug: &str) -> String {
    format!("{}/qr/{slug}", public_base_url.trim_end_matches('/'))
}

/// The public page a scan redirects to.
#[must_use]
pub fn restaurant_url(public_base_url: &str, slug: &str) -> String {
    format!("{}/restaurants/{slug}", public_base_url.trim_end_matches('/'))
}

/// Records one scan of a restaurant's code.
///
/// The counter row is created on the first scan.
#[instrument(skip(db))]
pub async fn record_scan(db: &DatabaseConnection, restaurant_id: i64) -> Result<qr_code::Model> {
    record_scan_at(db, restaurant_id, Utc::now()).await
}

/// [`record_scan`] with an explicit clock.
pub async fn record_scan_at(
    db: &DatabaseConnection,
    restaurant_id: i64,
    now: DateTime<Utc>,
) -> Result<qr_code::Model> {
    let txn = db.begin().await?;

    let existing = QrCode::find()
        .filter(qr_code::Column::RestaurantId.eq(restaurant_id))
        .one(&txn)
        .await?;
    let code = match existing {
        Some(code) => {
            let count = code.scan_count;
            let mut active: qr_code::ActiveModel = code.into();
            active.scan_count = Set(count + 1);
            active.last_scanned_at = Set(Some(now));
            active.update(&txn).await?
        }
        None => {
            qr_code::ActiveModel {
                restaurant_id: Set(restaurant_id),
                scan_count: Set(1),
                last_scanned_at: Set(Some(now)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    qr_scan::ActiveModel {
        restaurant_id: Set(restaurant_id),
        scanned_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    debug!(restaurant_id, scan_count = code.scan_count, "qr scan recorded");
    Ok(code)
}

/// Records a scan for the active restaurant with `slug` and returns the
/// restaurant so the caller can redirect.
pub async fn record_scan_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<crate::entities::restaurant::Model> {
    let restaurant = restaurant::get_public_restaurant(db, slug)
        .await?
        .ok_or_else(|| Error::not_found("restaurant", slug))?;
    record_scan(db, restaurant.id).await?;
    Ok(restaurant)
}

/// Statistics over the last `days` days, including today.
pub async fn get_stats(db: &DatabaseConnection, restaurant_id: i64, days: u32) -> Result<QrStats> {
    get_stats_at(db, restaurant_id, days, Utc::now()).await
}

/// [`get_stats`] with an explicit clock.
pub async fn get_stats_at(
    db: &DatabaseConnection,
    restaurant_id: i64,
    days: u32,
    now: DateTime<Utc>,
) -> Result<QrStats> {
    let days = days.clamp(1, 365);
    let today = now.date_naive();
    let first_day = today - Duration::days(i64::from(days) - 1);
    let window_start = first_day.and_time(chrono::NaiveTime::MIN).and_utc();
    let today_start = today.and_time(chrono::NaiveTime::MIN).and_utc();

    let code = QrCode::find()
        .filter(qr_code::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?;

    let scans_today = QrScan::find()
        .filter(qr_scan::Column::RestaurantId.eq(restaurant_id))
        .filter(qr_scan::Column::ScannedAt.gte(today_start))
        .count(db)
        .await?;

    let scans = QrScan::find()
        .filter(qr_scan::Column::RestaurantId.eq(restaurant_id))
        .filter(qr_scan::Column::ScannedAt.gte(window_start))
        .order_by_asc(qr_scan::Column::ScannedAt)
        .all(db)
        .await?;

    let mut per_day: BTreeMap<NaiveDate, u64> = first_day
        .iter_days()
        .take(days as usize)
        .map(|d| (d, 0))
        .collect();
    for scan in scans {
        if let Some(count) = per_day.get_mut(&scan.scanned_at.date_naive()) {
            *count += 1;
        }
    }

    Ok(QrStats {
        total_scans: code.as_ref().map_or(0, |c| c.scan_count),
        last_scanned_at: code.and_then(|c| c.last_scanned_at),
        scans_today,
        daily: per_day
            .into_iter()
            .map(|(date, count)| DailyScans { date, count })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[test]
    fn test_urls() {
        assert_eq!(
            scan_url("https://menu.example/", "damascus-grill"),
            "https://menu.example/qr/damascus-grill"
        );
        assert_eq!(
            restaurant_url("https://menu.example", "damascus-grill"),
            "https://menu.example/restaurants/damascus-grill"
        );
    }

    #[tokio::test]
    async fn test_record_scan_counts() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;

        let first = record_scan(&db, restaurant.id).await?;
        assert_eq!(first.scan_count, 1);
        let second = record_scan(&db, restaurant.id).await?;
        assert_eq!(second.scan_count, 2);
        assert_eq!(second.id, first.id);
        assert!(second.last_scanned_at >= first.last_scanned_at);

        assert_eq!(QrScan::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_window() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        record_scan_at(&db, restaurant.id, now - Duration::days(10)).await?;
        record_scan_at(&db, restaurant.id, now - Duration::days(2)).await?;
        record_scan_at(&db, restaurant.id, now - Duration::hours(3)).await?;
        record_scan_at(&db, restaurant.id, now).await?;

        let stats = get_stats_at(&db, restaurant.id, 7, now).await?;
        assert_eq!(stats.total_scans, 4);
        assert_eq!(stats.last_scanned_at, Some(now));
        assert_eq!(stats.scans_today, 2);
        assert_eq!(stats.daily.len(), 7);
        assert_eq!(
            stats.daily.first().map(|d| d.date),
            NaiveDate::from_ymd_opt(2024, 5, 4)
        );
        let counts: Vec<u64> = stats.daily.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 1, 0, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_without_scans() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let stats = get_stats(&db, restaurant.id, 3).await?;
        assert_eq!(stats.total_scans, 0);
        assert_eq!(stats.last_scanned_at, None);
        assert_eq!(stats.daily.iter().map(|d| d.count).sum::<u64>(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_scan_unknown_slug() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_scan_by_slug(&db, "nowhere").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
