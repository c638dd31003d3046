//! Search results page parser.
//!
//! The first result link is the seed title page; everything else on the page
//! is ignored.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

/// First-result link inside the inline results grid.
static RESULT_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.b-content__inline_item-link a[href]").expect("result link selector")
});

/// Return the first search result, resolved against `base`.
pub fn first_result(html: &str, base: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    doc.select(&RESULT_LINK_SEL)
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| base.join(href.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://rezka.example").unwrap()
    }

    #[test]
    fn picks_first_result_link() {
        let html = std::fs::read_to_string("../../../fixtures/html/search_results.html")
            .expect("read search fixture");
        let seed = first_result(&html, &base()).expect("result present");
        assert_eq!(
            seed.as_str(),
            "https://rezka.example/films/fiction/2-matrix-reloaded-2003.html"
        );
    }

    #[test]
    fn empty_results_page() {
        let html = std::fs::read_to_string("../../../fixtures/html/search_empty.html")
            .expect("read empty search fixture");
        assert!(first_result(&html, &base()).is_none());
    }

    #[test]
    fn absolute_href_kept() {
        let html = r#"<div class="b-content__inline_item-link"><a href="https://mirror.example/films/x.html">X</a></div>"#;
        let seed = first_result(html, &base()).unwrap();
        assert_eq!(seed.as_str(), "https://mirror.example/films/x.html");
    }

    #[test]
    fn cover_links_are_not_results() {
        let html = r#"<div class="b-content__inline_item-cover"><a href="/films/cover.html">c</a></div>"#;
        assert!(first_result(html, &base()).is_none());
    }
}
