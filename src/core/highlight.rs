//! Shared shape of the short titled items a restaurant page lists: services
//! (delivery, catering) and features (outdoor seating, wifi).
//!
//! Both kinds take the same form and keep titles unique per restaurant,
//! compared case-insensitively.

use crate::{
    core::text,
    errors::{Error, Result},
};
use serde::Deserialize;

/// Portal form for a service or a feature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightInput {
    /// Title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional icon name
    #[serde(default)]
    pub icon: Option<String>,
}

/// A validated [`HighlightInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Trimmed title
    pub title: String,
    /// Description, `None` when blank
    pub description: Option<String>,
    /// Icon name, `None` when blank
    pub icon: Option<String>,
}

impl HighlightInput {
    /// Trims every field and enforces the length limits.
    pub fn validate(&self) -> Result<Highlight> {
        Ok(Highlight {
            title: text::required("title", &self.title, 80)?,
            description: text::optional("description", self.description.as_deref(), 500)?,
            icon: text::optional("icon", self.icon.as_deref(), 60)?,
        })
    }
}

/// Rejects `title` when another item (other than `exclude_id`) already uses
/// it, ignoring case. `existing` yields `(id, title)` pairs.
pub fn ensure_unique_title<'a>(
    entity: &'static str,
    existing: impl IntoIterator<Item = (i64, &'a str)>,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let wanted = title.to_lowercase();
    let clash = existing
        .into_iter()
        .any(|(id, other)| Some(id) != exclude_id && other.to_lowercase() == wanted);
    if clash {
        return Err(Error::duplicate(entity, title));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_validate_trims_and_limits() {
        let input = HighlightInput {
            title: "  Delivery ".to_string(),
            description: Some("   ".to_string()),
            icon: Some("truck".to_string()),
        };
        let valid = input.validate().unwrap();
        assert_eq!(valid.title, "Delivery");
        assert_eq!(valid.description, None);
        assert_eq!(valid.icon.as_deref(), Some("truck"));

        let blank = HighlightInput::default().validate();
        assert!(matches!(blank, Err(Error::Validation { field: "title", .. })));

        let long = HighlightInput {
            title: "x".repeat(81),
            ..Default::default()
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_unique_title_ignores_case_and_self() {
        let existing = [(1, "Delivery"), (2, "Catering")];
        let result = ensure_unique_title("service", existing, "DELIVERY", None);
        assert!(matches!(result, Err(Error::Duplicate { entity: "service", .. })));

        ensure_unique_title("service", existing, "delivery", Some(1)).unwrap();
        ensure_unique_title("service", existing, "Parking", None).unwrap();
    }
}
