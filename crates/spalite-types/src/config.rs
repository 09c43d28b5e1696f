//! Navigation layer configuration.
//!
//! Every field has a default matching the deployed site, so an empty TOML
//! document or JSON object yields [`NavConfig::default`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpaError};

/// Default number of fetched pages kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 15;

/// Default minimum gap between two accepted link clicks.
pub const DEFAULT_CLICK_THROTTLE_MS: u32 = 180;

/// Tunables and DOM contract identifiers for the navigation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// `id` of the swappable content region, present on every page.
    pub content_region_id: String,
    /// Extension carried by fetchable page resources (without the dot).
    pub page_extension: String,
    /// File stem of the directory index page.
    pub index_stem: String,
    /// Maximum number of cached page payloads.
    pub cache_capacity: usize,
    /// Clicks closer than this to the previous accepted click are dropped.
    pub click_throttle_ms: u32,
    /// Header marking requests issued by this layer.
    pub request_marker_header: String,
    pub request_marker_value: String,
    /// Name of the event broadcast after every swap.
    pub page_event: String,
    /// Attribute toggled on the document element while a navigation runs.
    pub busy_attribute: String,
    /// Attribute marking the link to the current page.
    pub current_marker_attribute: String,
    pub current_marker_value: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            content_region_id: "main-content".to_string(),
            page_extension: "html".to_string(),
            index_stem: "index".to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            click_throttle_ms: DEFAULT_CLICK_THROTTLE_MS,
            request_marker_header: "X-Requested-With".to_string(),
            request_marker_value: "np-spa".to_string(),
            page_event: "np:page".to_string(),
            busy_attribute: "data-spa-busy".to_string(),
            current_marker_attribute: "aria-current".to_string(),
            current_marker_value: "page".to_string(),
        }
    }
}

impl NavConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(source)?;
        config.validate()?;
        log::debug!("Loaded navigation config: {config:?}");
        Ok(config)
    }

    /// Parse and validate a JSON object (inline `<script>` config).
    pub fn from_json(source: &str) -> Result<Self> {
        let config: NavConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(SpaError::Config(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        let required = [
            ("content_region_id", &self.content_region_id),
            ("page_extension", &self.page_extension),
            ("index_stem", &self.index_stem),
            ("page_event", &self.page_event),
            ("current_marker_attribute", &self.current_marker_attribute),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SpaError::Config(format!("{name} must not be empty")));
            }
        }
        if self.page_extension.starts_with('.') {
            return Err(SpaError::Config(
                "page_extension is given without the leading dot".to_string(),
            ));
        }
        Ok(())
    }

    /// Page file name of the root path, e.g. `/index.html`.
    pub fn index_path(&self) -> String {
        format!("/{}.{}", self.index_stem, self.page_extension)
    }
}
