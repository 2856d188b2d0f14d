//! Unified error type for the restaurant directory.
//!
//! Core operations return [`Error`]; the HTTP layer turns each variant into a
//! status code and the Arabic message shown to the visitor.

use thiserror::Error;

/// Message shown for any failure the visitor cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "حدث خطأ غير متوقع، يرجى المحاولة مرة أخرى";

/// All errors produced by the service.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before touching the database
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Form field the message belongs to
        field: &'static str,
        /// Field-level message, shown as-is
        message: String,
    },

    /// Lookup missed
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind, e.g. `"restaurant"`
        entity: &'static str,
        /// Id or slug that was looked up
        key: String,
    },

    /// A row with the same unique name/slug/title already exists
    #[error("{entity} already exists: {key}")]
    Duplicate {
        /// Entity kind
        entity: &'static str,
        /// Conflicting value
        key: String,
    },

    /// Row cannot be deleted while other rows reference it
    #[error("{entity} '{key}' is still referenced by {dependents} record(s)")]
    InUse {
        /// Entity kind
        entity: &'static str,
        /// Id or slug of the referenced row
        key: String,
        /// Number of referencing rows
        dependents: u64,
    },

    /// Per-restaurant cap reached
    #[error("{entity} limit of {limit} reached")]
    LimitReached {
        /// Entity kind
        entity: &'static str,
        /// Configured cap
        limit: u64,
    },

    /// No signed-in user
    #[error("Sign-in required")]
    Unauthorized,

    /// Signed in, but not allowed to touch this resource
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason, for the logs
        message: String,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable problem
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Malformed TOML configuration
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Response body could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for a [`Error::Duplicate`].
    pub fn duplicate(entity: &'static str, key: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether this error comes from infrastructure rather than from the request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::Io(_)
                | Self::EnvVar(_)
                | Self::Toml(_)
                | Self::Json(_)
        )
    }

    /// Arabic message for the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::NotFound { entity, .. } => format!("{} غير موجود", entity_label(entity)),
            Self::Duplicate { entity, key } => {
                format!("{} بنفس الاسم موجود بالفعل: {key}", entity_label(entity))
            }
            Self::InUse { entity, .. } => format!(
                "لا يمكن حذف {} لوجود بيانات مرتبطة به",
                entity_label(entity)
            ),
            Self::LimitReached { entity, limit } => format!(
                "تم الوصول إلى الحد الأقصى ({limit}) من {}",
                entity_label(entity)
            ),
            Self::Unauthorized => "يجب تسجيل الدخول أولاً".to_string(),
            Self::Forbidden { .. } => "ليس لديك صلاحية للقيام بهذا الإجراء".to_string(),
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Toml(_)
            | Self::Json(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

fn entity_label(entity: &str) -> &'static str {
    match entity {
        "cuisine" => "المطبخ",
        "restaurant" => "المطعم",
        "dish" => "الطبق",
        "review" => "التقييم",
        "favorite" => "المفضلة",
        "service" => "الخدمة",
        "feature" => "الميزة",
        "gallery image" => "صور المعرض",
        "video" => "الفيديوهات",
        "table" => "الطاولة",
        "blog post" => "المقال",
        "order" => "الطلب",
        _ => "العنصر",
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_hide_details() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        assert!(err.is_internal());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = Error::validation("rating", "التقييم يجب أن يكون بين 1 و 5");
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "التقييم يجب أن يكون بين 1 و 5");
        assert_eq!(
            err.to_string(),
            "Invalid rating: التقييم يجب أن يكون بين 1 و 5"
        );
    }

    #[test]
    fn test_limit_message_mentions_cap() {
        let err = Error::LimitReached {
            entity: "video",
            limit: 5,
        };
        assert!(err.user_message().contains('5'));
    }
}
