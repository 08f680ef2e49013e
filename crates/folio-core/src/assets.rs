//! Image URL resolution.
//!
//! Asset references are opaque ids owned by the content store. Turning one
//! into a URL is a policy of the host, so the renderer and carousel only see
//! the [`ImageUrlResolver`] trait.

use std::fmt::Write;

use crate::model::AssetRef;

/// Output format requested from the image service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Auto,
}

/// Size and quality requested for a resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageParams {
    pub width: u32,
    pub format: ImageFormat,
    pub quality: u8,
}

impl ImageParams {
    pub fn new(width: u32, quality: u8) -> Self {
        Self {
            width,
            format: ImageFormat::Auto,
            quality,
        }
    }
}

/// Turns an asset reference into a fetchable URL.
///
/// Returning `None` means the asset can't be shown; callers drop it quietly.
pub trait ImageUrlResolver {
    fn resolve(&self, asset: &AssetRef, params: &ImageParams) -> Option<String>;
}

impl<F> ImageUrlResolver for F
where
    F: Fn(&AssetRef, &ImageParams) -> Option<String>,
{
    fn resolve(&self, asset: &AssetRef, params: &ImageParams) -> Option<String> {
        self(asset, params)
    }
}

/// Resolver used when no image service is configured: only direct URLs work.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectOnly;

impl ImageUrlResolver for DirectOnly {
    fn resolve(&self, asset: &AssetRef, _params: &ImageParams) -> Option<String> {
        tracing::debug!(asset = %asset.id, "no image service configured, dropping asset");
        None
    }
}

/// Resolver for Sanity-style asset ids (`image-<hash>-<w>x<h>-<ext>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnImageResolver {
    pub project_id: String,
    pub dataset: String,
    pub base_url: String,
}

impl CdnImageResolver {
    pub const DEFAULT_BASE_URL: &'static str = "https://cdn.sanity.io/images";

    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ImageUrlResolver for CdnImageResolver {
    fn resolve(&self, asset: &AssetRef, params: &ImageParams) -> Option<String> {
        let rest = asset.id.strip_prefix("image-")?;
        let (stem, ext) = rest.rsplit_once('-')?;
        let (hash, dims) = stem.rsplit_once('-')?;
        let (w, h) = dims.split_once('x')?;
        if hash.is_empty()
            || ext.is_empty()
            || w.parse::<u32>().is_err()
            || h.parse::<u32>().is_err()
        {
            return None;
        }

        let mut url = String::with_capacity(128);
        let _ = write!(
            url,
            "{}/{}/{}/{hash}-{dims}.{ext}?w={}&q={}",
            self.base_url, self.project_id, self.dataset, params.width, params.quality
        );
        match params.format {
            ImageFormat::Auto => url.push_str("&auto=format"),
        }
        Some(url)
    }
}
