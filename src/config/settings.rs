//! Application settings loaded from config.toml
//!
//! Every section is optional; a missing file yields the defaults. The seed
//! cuisines listed under `[[cuisines]]` are inserted on startup when absent.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default settings file, overridable through `APP_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Order pricing settings
    pub orders: OrderConfig,
    /// Per-restaurant caps
    pub limits: LimitsConfig,
    /// Cuisines to seed on startup
    pub cuisines: Vec<CuisineSeed>,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_address: String,
    /// Public origin used when building QR and share links
    pub public_base_url: String,
    /// Most rendered pages kept in memory at once
    pub page_cache_entries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            page_cache_entries: crate::cache::DEFAULT_CAPACITY,
        }
    }
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `DATABASE_URL` takes precedence
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/restaurants.sqlite?mode=rwc".to_string(),
        }
    }
}

/// `[orders]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Tax rate applied to the subtotal, e.g. `0.15` for 15%
    pub tax_rate: f64,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { tax_rate: 0.15 }
    }
}

/// `[limits]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum gallery images per restaurant
    pub max_gallery_images: u64,
    /// Maximum videos per restaurant
    pub max_videos: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_gallery_images: 20,
            max_videos: 5,
        }
    }
}

/// Configuration for a single seeded cuisine
#[derive(Debug, Clone, Deserialize)]
pub struct CuisineSeed {
    /// Display name
    pub name: String,
    /// Slug; derived from the name when omitted
    #[serde(default)]
    pub slug: Option<String>,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional image URL
    #[serde(default)]
    pub image_url: Option<String>,
}

impl AppConfig {
    /// Checks values serde cannot.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the tax rate is outside `0..1` or a cap is zero.
    pub fn validate(&self) -> Result<()> {
        let rate = self.orders.tax_rate;
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(Error::Config {
                message: format!("orders.tax_rate must be in [0, 1), got {rate}"),
            });
        }
        if self.limits.max_gallery_images == 0
            || self.limits.max_videos == 0
            || self.server.page_cache_entries == 0
        {
            return Err(Error::Config {
                message: "limits and server.page_cache_entries must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails [`AppConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Parses and validates settings from TOML text.
///
/// # Errors
/// Returns an error if the TOML is invalid or a value fails validation.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Loads settings from `APP_CONFIG` or `./config.toml`, falling back to defaults
/// when the file does not exist.
///
/// # Errors
/// Returns an error if `APP_CONFIG` is not valid unicode or the file exists
/// but cannot be parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = match std::env::var("APP_CONFIG") {
        Ok(path) => path,
        Err(std::env::VarError::NotPresent) => DEFAULT_CONFIG_PATH.to_string(),
        Err(e) => return Err(e.into()),
    };
    let mut config = if Path::new(&path).exists() {
        tracing::info!("Loading configuration from {path}");
        load_config(&path)?
    } else {
        tracing::warn!("Config file {path} not found, using defaults");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind_address = "127.0.0.1:3000"
            public_base_url = "https://food.example"

            [orders]
            tax_rate = 0.05

            [limits]
            max_gallery_images = 10
            max_videos = 3

            [[cuisines]]
            name = "Syrian"
            description = "Levantine classics"

            [[cuisines]]
            name = "Italian"
            slug = "italy"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.server.public_base_url, "https://food.example");
        assert_eq!(config.orders.tax_rate, 0.05);
        assert_eq!(config.limits.max_gallery_images, 10);
        assert_eq!(config.cuisines.len(), 2);
        assert_eq!(config.cuisines[1].slug.as_deref(), Some("italy"));
        assert!(config.cuisines[0].slug.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.limits.max_gallery_images, 20);
        assert_eq!(config.limits.max_videos, 5);
        assert_eq!(config.orders.tax_rate, 0.15);
        assert_eq!(config.server.page_cache_entries, 1024);
        assert!(config.cuisines.is_empty());
    }

    #[test]
    fn test_invalid_tax_rate_rejected() {
        let result = parse_config("[orders]\ntax_rate = 1.5\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_zero_page_cache_rejected() {
        let result = parse_config("[server]\npage_cache_entries = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse_config("[orders\ntax_rate = ");
        assert!(matches!(result, Err(Error::Toml(_))));
    }
}
