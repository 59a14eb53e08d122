//! HTML extraction helpers shared by the enrichment engine and the RSS
//! check-in scraper.
//!
//! Every field is read through an ordered chain of strategies so a page
//! redesign degrades one strategy at a time instead of blanking the
//! field.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid extraction regex"))
}

/// Parseable JSON-LD blocks embedded in the page, in document order.
#[must_use]
pub fn json_ld_blocks(html: &str) -> Vec<Value> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &RE,
        r#"(?s)<script type="application/ld\+json">(.*?)</script>"#,
    );

    re.captures_iter(html)
        .filter_map(|caps| serde_json::from_str(caps[1].trim()).ok())
        .collect()
}

/// The numeric beer id on a check-in page.
///
/// Strategies: the beer link's trailing path segment, then an explicit
/// `data-bid` attribute, then a `"bid"` key in inline JSON.
#[must_use]
pub fn checkin_beer_id(html: &str) -> Option<i64> {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    static BID_ATTR_RE: OnceLock<Regex> = OnceLock::new();
    static BID_JSON_RE: OnceLock<Regex> = OnceLock::new();

    let strategies = [
        regex(&LINK_RE, r#"href="/b/[^"/]+/(\d+)""#),
        regex(&BID_ATTR_RE, r#"data-bid="(\d+)""#),
        regex(&BID_JSON_RE, r#""bid"\s*:\s*(\d+)"#),
    ];

    strategies
        .iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps[1].parse().ok())
}

/// The check-in's star rating, when the page shows one.
///
/// Strategies: a `data-rating` attribute, then the parenthesised value
/// next to the rating caps.
#[must_use]
pub fn checkin_rating(html: &str) -> Option<f64> {
    static ATTR_RE: OnceLock<Regex> = OnceLock::new();
    static CAPS_RE: OnceLock<Regex> = OnceLock::new();

    let strategies = [
        regex(&ATTR_RE, r#"data-rating="(\d+(?:\.\d+)?)""#),
        regex(&CAPS_RE, r#"class="caps[^"]*"[^>]*>\s*\((\d+(?:\.\d+)?)\)"#),
    ];

    strategies
        .iter()
        .find_map(|re| re.captures(html))
        .and_then(|caps| caps[1].parse().ok())
}

/// String at a dotted path into a JSON-LD value.
#[must_use]
pub fn ld_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    ld_get(value, path).and_then(Value::as_str)
}

/// Number at a dotted path into a JSON-LD value; numeric strings count.
#[must_use]
pub fn ld_f64(value: &Value, path: &[&str]) -> Option<f64> {
    let node = ld_get(value, path)?;
    node.as_f64()
        .or_else(|| node.as_str().and_then(|s| s.trim().parse().ok()))
}

fn ld_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |node, key| node.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKIN_PAGE: &str = r#"
        <div class="checkin">
          <a href="/b/lervig-supersonic/2716064" class="label">Supersonic</a>
          <span class="caps small" data-rating="4.25"></span>
        </div>
    "#;

    const CHECKIN_PAGE_ALT: &str = r#"
        <div data-bid="42068">
          <span class="caps">(3.5)</span>
        </div>
    "#;

    #[test]
    fn beer_id_prefers_the_beer_link() {
        assert_eq!(checkin_beer_id(CHECKIN_PAGE), Some(2716064));
    }

    #[test]
    fn beer_id_falls_back_to_bid_attribute() {
        assert_eq!(checkin_beer_id(CHECKIN_PAGE_ALT), Some(42068));
        assert_eq!(checkin_beer_id(r#"{"bid": 77}"#), Some(77));
    }

    #[test]
    fn rating_reads_attribute_then_caps_text() {
        assert_eq!(checkin_rating(CHECKIN_PAGE), Some(4.25));
        assert_eq!(checkin_rating(CHECKIN_PAGE_ALT), Some(3.5));
        assert_eq!(checkin_rating("<div>no rating here</div>"), None);
    }

    #[test]
    fn json_ld_blocks_skip_malformed_scripts() {
        let html = r#"
            <script type="application/ld+json">{"@type": "Product", "sku": 1}</script>
            <script type="application/ld+json">not json</script>
        "#;
        let blocks = json_ld_blocks(html);
        assert_eq!(blocks.len(), 1);
        assert_eq!(ld_f64(&blocks[0], &["sku"]), Some(1.0));
    }

    #[test]
    fn ld_paths_descend_and_coerce() {
        let value: Value = serde_json::json!({
            "brand": { "name": "Lervig" },
            "aggregateRating": { "ratingValue": "4.1" }
        });
        assert_eq!(ld_str(&value, &["brand", "name"]), Some("Lervig"));
        assert_eq!(ld_f64(&value, &["aggregateRating", "ratingValue"]), Some(4.1));
    }
}
