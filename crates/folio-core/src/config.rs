//! Reading-surface configuration.

use serde::Deserialize;
use smol_str::SmolStr;

use crate::assets::{CdnImageResolver, DirectOnly, ImageParams, ImageUrlResolver};
use crate::error::{FolioError, Result};

/// Tunables for one reading surface. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FolioConfig {
    /// Viewports at or below this width use inline notes.
    pub breakpoint_px: u32,
    /// Minimum gap between carousel advances.
    pub carousel_cooldown_ms: u32,
    /// Opacity transition applied to carousel slots.
    pub crossfade_ms: u32,
    pub inline_image_width: u32,
    pub carousel_image_width: u32,
    pub image_quality: u8,
    /// Document event that signals a soft navigation is about to swap pages.
    pub navigation_start_event: SmolStr,
    /// Block the page's context menu while a document is mounted.
    pub suppress_context_menu: bool,
    pub cdn: Option<CdnConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnConfig {
    pub project_id: String,
    pub dataset: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: 768,
            carousel_cooldown_ms: 100,
            crossfade_ms: 800,
            inline_image_width: 1800,
            carousel_image_width: 1920,
            image_quality: 85,
            navigation_start_event: SmolStr::new_static("astro:before-swap"),
            suppress_context_menu: false,
            cdn: None,
        }
    }
}

impl FolioConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(FolioError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.breakpoint_px == 0 {
            return Err(FolioError::InvalidConfig("breakpointPx must be non-zero".into()));
        }
        if self.inline_image_width == 0 || self.carousel_image_width == 0 {
            return Err(FolioError::InvalidConfig("image widths must be non-zero".into()));
        }
        if !(1..=100).contains(&self.image_quality) {
            return Err(FolioError::InvalidConfig(format!(
                "imageQuality must be within 1..=100, got {}",
                self.image_quality
            )));
        }
        if self.navigation_start_event.trim().is_empty() {
            return Err(FolioError::InvalidConfig(
                "navigationStartEvent must not be empty".into(),
            ));
        }
        if let Some(cdn) = &self.cdn {
            if cdn.project_id.is_empty() || cdn.dataset.is_empty() {
                return Err(FolioError::InvalidConfig(
                    "cdn needs both projectId and dataset".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn inline_image_params(&self) -> ImageParams {
        ImageParams::new(self.inline_image_width, self.image_quality)
    }

    pub fn carousel_image_params(&self) -> ImageParams {
        ImageParams::new(self.carousel_image_width, self.image_quality)
    }

    /// The asset resolver this config describes.
    pub fn resolver(&self) -> Box<dyn ImageUrlResolver> {
        match &self.cdn {
            Some(cdn) => Box::new(CdnImageResolver::new(&cdn.project_id, &cdn.dataset)),
            None => Box::new(DirectOnly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = FolioConfig::from_json("{}").unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.navigation_start_event, "astro:before-swap");
    }

    #[test]
    fn test_partial_override() {
        let config = FolioConfig::from_json(
            r#"{"breakpointPx": 900, "suppressContextMenu": true,
                "cdn": {"projectId": "p1", "dataset": "production"}}"#,
        )
        .unwrap();
        assert_eq!(config.breakpoint_px, 900);
        assert!(config.suppress_context_menu);
        assert_eq!(config.carousel_cooldown_ms, 100);
        assert_eq!(config.cdn.unwrap().project_id, "p1");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            FolioConfig::from_json(r#"{"imageQuality": 0}"#),
            Err(FolioError::InvalidConfig(_))
        ));
        assert!(matches!(
            FolioConfig::from_json(r#"{"navigationStartEvent": "  "}"#),
            Err(FolioError::InvalidConfig(_))
        ));
        assert!(matches!(
            FolioConfig::from_json("[1, 2]"),
            Err(FolioError::ConfigParse(_))
        ));
    }
}
