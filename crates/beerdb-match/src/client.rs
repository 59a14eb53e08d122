//! HTTP client for the community service's public HTML pages.
//!
//! The community service has no open API; search results and beer pages
//! are plain HTML, extracted with regexes the same way the page refresh
//! engine does it.

use std::sync::OnceLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;

use crate::error::MatchError;

/// One search result: the beer's display name and its site-absolute page
/// url. The numeric beer id is the url's trailing path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub url: String,
}

/// Client for the community site's search and beer pages. Redirects are
/// followed, which is also how shortlinks get resolved.
pub struct CommunityClient {
    client: Client,
    base_url: String,
}

impl CommunityClient {
    /// # Errors
    ///
    /// Returns [`MatchError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, MatchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Searches the beer index and returns the result candidates in page
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] on HTTP failure or non-2xx status.
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>, MatchError> {
        let url = format!(
            "{}/search?q={}&type=beer",
            self.base_url,
            encode_query(query)
        );
        let html = self.get_text(&url).await?;

        Ok(parse_search_results(&html, &self.base_url))
    }

    /// Fetches one page as HTML; relative paths resolve against the
    /// configured base.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] on HTTP failure, 404, or non-2xx status.
    pub async fn fetch_page(&self, url: &str) -> Result<String, MatchError> {
        let absolute = self.absolutize(url);
        self.get_text(&absolute).await
    }

    /// Resolves a possibly shortened url to the final beer-page url by
    /// following redirects. A url that fails to resolve is returned
    /// unchanged; correction review can still decide on the raw value.
    pub async fn resolve_url(&self, url: &str) -> String {
        let absolute = self.absolutize(url);
        match self.client.get(&absolute).send().await {
            Ok(response) => response.url().to_string(),
            Err(_) => absolute,
        }
    }

    fn absolutize(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, MatchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MatchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MatchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Beer names and page paths from a search-result page. Each result item
/// carries its name link as `<p class="name"><a href="/b/...">`.
fn parse_search_results(html: &str, base_url: &str) -> Vec<Candidate> {
    static RESULT_RE: OnceLock<Regex> = OnceLock::new();
    let re = RESULT_RE.get_or_init(|| {
        Regex::new(r#"(?s)<p class="name">\s*<a href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("valid search-result regex")
    });

    re.captures_iter(html)
        .map(|caps| {
            let path = caps[1].trim();
            let url = if path.starts_with("http") {
                path.to_string()
            } else {
                format!("{base_url}{path}")
            };
            Candidate {
                name: decode_entities(caps[2].trim()),
                url,
            }
        })
        .collect()
}

/// Minimal entity decoding for the handful the site emits in names.
fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
}

/// Unreserved characters pass through; everything else is percent-encoded.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, QUERY_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_HTML: &str = r#"
        <div class="beer-item">
          <p class="name"><a href="/b/lervig-supersonic/2716064">Lervig Supersonic</a></p>
          <p class="brewery"><a href="/lervig">Lervig</a></p>
        </div>
        <div class="beer-item">
          <p class="name"><a href="/b/lervig-lucky-jack/42068">Lucky Jack &amp; Friends</a></p>
        </div>
    "#;

    #[test]
    fn search_results_are_parsed_in_page_order() {
        let results = parse_search_results(SEARCH_HTML, "https://community.example");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Lervig Supersonic");
        assert_eq!(
            results[0].url,
            "https://community.example/b/lervig-supersonic/2716064"
        );
        assert_eq!(results[1].name, "Lucky Jack & Friends");
    }

    #[test]
    fn empty_page_yields_no_candidates() {
        assert!(parse_search_results("<html></html>", "https://community.example").is_empty());
    }

    #[test]
    fn query_encoding_handles_spaces_and_non_ascii() {
        assert_eq!(encode_query("Nøgne Ø"), "N%C3%B8gne%20%C3%98");
        assert_eq!(encode_query("plain"), "plain");
    }
}
