//! Store extraction from the store-search HTML fragment.
//!
//! The upstream returns one `<div class="bx-store" …>` container per store.
//! Geometry and opening hours live in `data-*` attributes on the opening
//! tag; the name, phone and address live in child elements; facility flags
//! live in an entity-escaped JSON object in `data-info`.
//!
//! The markup is not reliably balanced, so instead of building a DOM the
//! extractor slices the document between consecutive markers and runs
//! independent pattern lookups on each slice. When no later marker exists
//! the slice is a fixed-length window (see [`StoreMarkupExtractor::new`]).

use std::sync::LazyLock;

use daiso_core::{Store, StoreOptions};
use regex::Regex;
use serde_json::{Map, Value};

/// Default block window, in characters, used when no later marker exists.
pub const DEFAULT_FALLBACK_WINDOW: usize = 2000;

static STORE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div[^>]*class="bx-store"[^>]*>"#).expect("valid store marker regex")
});
static START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-start="([0-9]+)""#).expect("valid regex"));
static END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-end="([0-9]+)""#).expect("valid regex"));
static LAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-lat="([^"]+)""#).expect("valid regex"));
static LNG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-lng="([^"]+)""#).expect("valid regex"));
static INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data-info='([^']*)'").expect("valid regex"));
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<h4[^>]*class="place"[^>]*>([^<]+)</h4>"#).expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<em[^>]*class="phone"[^>]*>([^<]*)</em>"#).expect("valid regex")
});
static ADDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<p[^>]*class="addr"[^>]*>([^<]+)</p>"#).expect("valid regex")
});

/// Why a store block produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A required `data-*` attribute is absent from the opening tag.
    MissingAttribute(&'static str),
    /// `data-lat` / `data-lng` is present but not a finite number.
    InvalidCoordinate(&'static str),
    /// No non-empty `<h4 class="place">` in the block.
    MissingName,
}

/// Result of extracting a single store block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Skip(SkipReason),
    Parsed(Store),
}

/// The slice of the document belonging to one store marker.
#[derive(Debug, Clone, Copy)]
struct RawStoreBlock<'a> {
    /// The opening `<div class="bx-store" …>` tag.
    tag: &'a str,
    /// From the start of the tag up to the next marker or the fallback window.
    body: &'a str,
}

/// Extracts [`Store`] records from store-search markup.
///
/// Pure and stateless apart from its window setting; one instance can be
/// shared freely across tasks.
#[derive(Debug, Clone, Copy)]
pub struct StoreMarkupExtractor {
    fallback_window: usize,
}

impl Default for StoreMarkupExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_WINDOW)
    }
}

impl StoreMarkupExtractor {
    /// Creates an extractor whose last block spans `fallback_window`
    /// characters from its marker (clamped to the end of the document).
    ///
    /// The window is a guess at an upper bound for one store's markup and
    /// has not been checked against the upstream's longest listing.
    #[must_use]
    pub fn new(fallback_window: usize) -> Self {
        Self { fallback_window }
    }

    #[must_use]
    pub fn fallback_window(&self) -> usize {
        self.fallback_window
    }

    /// Lazily yields one [`Store`] per usable marker, in document order.
    pub fn stores<'a>(&self, html: &'a str) -> impl Iterator<Item = Store> + 'a {
        self.outcomes(html).filter_map(|outcome| match outcome {
            BlockOutcome::Parsed(store) => Some(store),
            BlockOutcome::Skip(reason) => {
                tracing::debug!(?reason, "skipping store block");
                None
            }
        })
    }

    /// Collects every extractable store in document order.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<Store> {
        self.stores(html).collect()
    }

    /// Yields the per-block outcome for every marker, including skipped ones.
    pub fn outcomes<'a>(&self, html: &'a str) -> impl Iterator<Item = BlockOutcome> + 'a {
        StoreBlocks {
            html,
            cursor: 0,
            fallback_window: self.fallback_window,
        }
        .map(|block| extract_block(&block))
    }
}

/// Iterator over marker-delimited blocks of a document.
struct StoreBlocks<'a> {
    html: &'a str,
    cursor: usize,
    fallback_window: usize,
}

impl<'a> Iterator for StoreBlocks<'a> {
    type Item = RawStoreBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let html = self.html;
        if self.cursor > html.len() {
            return None;
        }
        let marker = STORE_MARKER_RE.find_at(html, self.cursor)?;
        let start = marker.start();
        self.cursor = marker.end();

        // `start` is the ASCII '<', so `start + 1` is a char boundary.
        let end = STORE_MARKER_RE.find_at(html, start + 1).map_or_else(
            || window_end(html, start, self.fallback_window),
            |next| next.start(),
        );

        Some(RawStoreBlock {
            tag: marker.as_str(),
            body: &html[start..end],
        })
    }
}

/// Byte offset `window` characters past `start`, or the end of `html`.
fn window_end(html: &str, start: usize, window: usize) -> usize {
    html[start..]
        .char_indices()
        .nth(window)
        .map_or(html.len(), |(offset, _)| start + offset)
}

fn extract_block(block: &RawStoreBlock<'_>) -> BlockOutcome {
    let Some(start) = capture(&START_RE, block.tag) else {
        return BlockOutcome::Skip(SkipReason::MissingAttribute("data-start"));
    };
    let Some(end) = capture(&END_RE, block.tag) else {
        return BlockOutcome::Skip(SkipReason::MissingAttribute("data-end"));
    };
    let Some(lat) = capture(&LAT_RE, block.tag) else {
        return BlockOutcome::Skip(SkipReason::MissingAttribute("data-lat"));
    };
    let Some(lng) = capture(&LNG_RE, block.tag) else {
        return BlockOutcome::Skip(SkipReason::MissingAttribute("data-lng"));
    };

    let Some(lat) = parse_coordinate(lat) else {
        return BlockOutcome::Skip(SkipReason::InvalidCoordinate("data-lat"));
    };
    let Some(lng) = parse_coordinate(lng) else {
        return BlockOutcome::Skip(SkipReason::InvalidCoordinate("data-lng"));
    };

    let Some(name) = capture(&NAME_RE, block.body).map(str::trim) else {
        return BlockOutcome::Skip(SkipReason::MissingName);
    };

    let phone = capture(&PHONE_RE, block.body).map_or_else(String::new, normalize_phone);
    let address = capture(&ADDR_RE, block.body)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let info = capture(&INFO_RE, block.tag)
        .map(parse_store_info)
        .unwrap_or_default();

    BlockOutcome::Parsed(Store {
        name: name.to_string(),
        phone,
        address,
        lat,
        lng,
        open_time: format_time_code(start),
        close_time: format_time_code(end),
        options: store_options(&info),
    })
}

fn capture<'h>(re: &Regex, haystack: &'h str) -> Option<&'h str> {
    Some(re.captures(haystack)?.get(1)?.as_str())
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix("T.").unwrap_or(trimmed).trim().to_string()
}

/// Decodes the `data-info` attribute into a key/value map.
///
/// Any decoding failure yields an empty map: the store is still emitted,
/// just with every facility flag off.
fn parse_store_info(raw: &str) -> Map<String, Value> {
    let unescaped = raw.replace("&quot;", "\"").replace("&amp;", "&");
    match serde_json::from_str::<Map<String, Value>>(&unescaped) {
        Ok(map) => map,
        Err(error) => {
            tracing::debug!(%error, "store data-info is not a JSON object; using empty flags");
            Map::new()
        }
    }
}

fn store_options(info: &Map<String, Value>) -> StoreOptions {
    let flag = |key: &str| info.get(key).and_then(Value::as_str) == Some("Y");

    StoreOptions {
        parking: flag("shp_pak"),
        ramp: flag("entrramp"),
        elevator: flag("elvtor"),
        cashless: flag("ptcard"),
        photo_sticker: flag("ptstk"),
        name_sticker: flag("nmstk"),
        sim_card: flag("usim_yn"),
        tax_free: flag("tax_free"),
        // The upstream emits either spelling depending on the store record.
        group_order: flag("ext.group_yn") || flag("group_yn"),
        pickup: flag("online_yn"),
    }
}

/// Formats a four-character time code as `HH:MM`; anything else is returned
/// unchanged.
#[must_use]
pub fn format_time_code(code: &str) -> String {
    if code.chars().count() == 4 {
        let split = code
            .char_indices()
            .nth(2)
            .map_or(code.len(), |(offset, _)| offset);
        format!("{}:{}", &code[..split], &code[split..])
    } else {
        code.to_string()
    }
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
