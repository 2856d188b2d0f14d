//! Rating rules shared by dish and restaurant reviews.

use crate::errors::{Error, Result};

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i32 = 5;

/// Rejects ratings outside `1..=5`.
pub fn validate(rating: i32) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(Error::validation(
            "rating",
            format!("التقييم يجب أن يكون بين {MIN_RATING} و {MAX_RATING}"),
        ))
    }
}

/// Mean of `ratings` rounded to one decimal; `0.0` when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_validate_bounds() {
        assert!(validate(1).is_ok());
        assert!(validate(5).is_ok());
        assert!(matches!(
            validate(0),
            Err(Error::Validation { field: "rating", .. })
        ));
        assert!(validate(6).is_err());
        assert!(validate(-3).is_err());
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[5, 4, 3]), 4.0);
        assert_eq!(average(&[5, 4, 3, 2]), 3.5);
        assert_eq!(average(&[5, 4, 4]), 4.3);
        assert_eq!(average(&[]), 0.0);
    }
}
