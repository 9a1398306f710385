//! Upstream base URLs.

use reqwest::Url;

use crate::error::ScraperError;

pub const DEFAULT_SHOP_BASE: &str = "https://www.daiso.co.kr";
pub const DEFAULT_SEARCH_BASE: &str = "https://prdm.daisomall.co.kr";
pub const DEFAULT_MALL_API_BASE: &str = "https://mapi.daisomall.co.kr";
pub const DEFAULT_IMAGE_BASE: &str = "https://img.daisomall.co.kr";

/// Base URLs of the retailer services the client talks to.
///
/// Production code uses [`DaisoEndpoints::default`]; tests point every base
/// at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaisoEndpoints {
    /// Corporate site hosting the store-search and region lookups.
    pub shop_base: String,
    /// Online mall search index.
    pub search_base: String,
    /// Online mall stock APIs.
    pub mall_api_base: String,
    /// Image CDN; used only to build product image URLs.
    pub image_base: String,
}

impl Default for DaisoEndpoints {
    fn default() -> Self {
        Self {
            shop_base: DEFAULT_SHOP_BASE.to_string(),
            search_base: DEFAULT_SEARCH_BASE.to_string(),
            mall_api_base: DEFAULT_MALL_API_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
        }
    }
}

impl DaisoEndpoints {
    /// Points the three API bases at one server, keeping the image CDN.
    #[must_use]
    pub fn single_host(base: &str) -> Self {
        Self {
            shop_base: base.to_string(),
            search_base: base.to_string(),
            mall_api_base: base.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
        }
    }
}

/// The parsed form of [`DaisoEndpoints`], each base ending in exactly one `/`.
#[derive(Debug, Clone)]
pub(super) struct ResolvedEndpoints {
    pub(super) shop: Url,
    pub(super) search: Url,
    pub(super) mall_api: Url,
    pub(super) image_base: String,
}

impl ResolvedEndpoints {
    pub(super) fn resolve(endpoints: &DaisoEndpoints) -> Result<Self, ScraperError> {
        Ok(Self {
            shop: parse_base(&endpoints.shop_base)?,
            search: parse_base(&endpoints.search_base)?,
            mall_api: parse_base(&endpoints.mall_api_base)?,
            image_base: endpoints.image_base.trim_end_matches('/').to_string(),
        })
    }
}

/// Parses `base` so that `Url::join` appends to its path instead of
/// replacing the last segment.
fn parse_base(base: &str) -> Result<Url, ScraperError> {
    let normalised = format!("{}/", base.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ScraperError::InvalidBaseUrl {
            url: base.to_owned(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Joins a relative endpoint path onto a resolved base.
pub(super) fn join(base: &Url, path: &str) -> Result<Url, ScraperError> {
    base.join(path).map_err(|e| ScraperError::InvalidBaseUrl {
        url: base.to_string(),
        reason: format!("cannot join \"{path}\": {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_base_path_prefix() {
        let base = parse_base("http://127.0.0.1:9999/proxy").unwrap();
        let url = join(&base, "cs/ajax/shop_search").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/proxy/cs/ajax/shop_search");
    }

    #[test]
    fn resolve_rejects_unparseable_base() {
        let endpoints = DaisoEndpoints {
            search_base: "not a url".to_string(),
            ..DaisoEndpoints::default()
        };
        let err = ResolvedEndpoints::resolve(&endpoints).unwrap_err();
        assert!(matches!(err, ScraperError::InvalidBaseUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn image_base_is_stored_without_trailing_slash() {
        let endpoints = DaisoEndpoints {
            image_base: "https://img.example.com/".to_string(),
            ..DaisoEndpoints::default()
        };
        let resolved = ResolvedEndpoints::resolve(&endpoints).unwrap();
        assert_eq!(resolved.image_base, "https://img.example.com");
    }
}
