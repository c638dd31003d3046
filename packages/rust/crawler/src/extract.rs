//! Field extraction for franchise pages.
//!
//! Turns one page into a [`DetailRecord`] plus the outgoing franchise links.
//! Extraction never fails: a missing field becomes the [`UNKNOWN`] sentinel.
//! Only the "parts of the franchise" and "see also" blocks contribute links,
//! which keeps the crawl on franchise neighbours.

use std::collections::HashSet;
use std::sync::LazyLock;

use franchise_shared::{DetailRecord, UNKNOWN};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.b-post__origtitle").expect("valid selector"));
static INFO_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.b-post__info").expect("valid selector"));
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid selector"));
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".b-post__partcontent_item a[href], .b-post__see_also_item a[href]")
        .expect("valid selector")
});
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}(?:-\d{4})?").expect("valid regex"));

/// Row labels that mark the release-date row of the info table.
const YEAR_LABELS: [&str; 2] = ["Год", "Дата выхода"];

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Output of extracting one page.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// Structured fields of the page.
    pub record: DetailRecord,
    /// Absolute franchise links, first occurrence order, no duplicates.
    pub links: Vec<Url>,
}

/// Pure page → (record, links) extraction used by the crawl engine.
pub trait FieldExtractor: Send + Sync {
    /// Extract fields and outgoing links from raw page HTML.
    fn extract(&self, html: &str) -> Extracted;
}

// ---------------------------------------------------------------------------
// Franchise page extractor
// ---------------------------------------------------------------------------

/// Extractor for the upstream site's title pages.
#[derive(Debug, Clone)]
pub struct FranchisePageExtractor {
    base: Url,
}

impl FranchisePageExtractor {
    /// Relative links are resolved against `base`.
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl FieldExtractor for FranchisePageExtractor {
    fn extract(&self, html: &str) -> Extracted {
        let doc = Html::parse_document(html);

        let record = DetailRecord {
            english_title: extract_title(&doc).unwrap_or_else(|| UNKNOWN.to_string()),
            year: extract_year(&doc).unwrap_or_else(|| UNKNOWN.to_string()),
        };

        Extracted {
            record,
            links: extract_links(&doc, &self.base),
        }
    }
}

/// Original title, text nodes trimmed and joined.
fn extract_title(doc: &Html) -> Option<String> {
    let el = doc.select(&TITLE_SEL).next()?;
    let title = stripped_text(el);
    (!title.is_empty()).then_some(title)
}

/// Year (or year range) from the release row of the info table.
fn extract_year(doc: &Html) -> Option<String> {
    let table = doc.select(&INFO_TABLE_SEL).next()?;
    let row = table.select(&ROW_SEL).find(|row| {
        let text = row.text().collect::<String>();
        YEAR_LABELS.iter().any(|label| text.contains(label))
    })?;
    let cell = row.select(&CELL_SEL).last()?;
    let text = cell.text().collect::<String>();
    YEAR_RE.find(&text).map(|m| m.as_str().to_string())
}

/// Links from the franchise zones, resolved against `base`.
fn extract_links(doc: &Html, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&LINK_SEL) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if seen.insert(resolved.as_str().to_string()) {
            links.push(resolved);
        }
    }

    links
}

fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}
