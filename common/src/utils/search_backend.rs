use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    error::AppError, storage::types::search_result::SearchResultItem, utils::config::AppConfig,
};

/// Public web search.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResultItem>, AppError>;
}

/// Scrapes the DuckDuckGo HTML endpoint, which needs no API key.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    http: reqwest::Client,
    base_url: Url,
}

impl DuckDuckGoSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("invalid search base url '{base_url}': {e}"))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("neural-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.search_base_url,
            Duration::from_secs(config.search_timeout_secs),
        )
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResultItem>, AppError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("search request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Backend(format!(
                "search failed with status {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Backend(format!("reading search response failed: {e}")))?;

        parse_results(&html, max_results)
    }
}

/// Pulls title, link and snippet out of DuckDuckGo's result markup.
pub fn parse_results(html: &str, max: usize) -> Result<Vec<SearchResultItem>, AppError> {
    let result_selector = selector(".result")?;
    let title_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for result in document.select(&result_selector) {
        if results.len() >= max {
            break;
        }

        let Some(anchor) = result.select(&title_selector).next() else {
            continue;
        };
        let title = element_text(anchor);
        if title.is_empty() {
            continue;
        }

        let link = anchor
            .value()
            .attr("href")
            .map(resolve_link)
            .unwrap_or_default();

        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        results.push(SearchResultItem {
            title,
            link,
            snippet,
        });
    }

    Ok(results)
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|e| AppError::InternalError(format!("invalid selector '{css}': {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// DuckDuckGo wraps targets in a redirect (`//duckduckgo.com/l/?uddg=<target>`);
/// unwrap it when present.
fn resolve_link(raw: &str) -> String {
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="result">
          <h2><a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">The <b>Rust</b> Programming Language</a></h2>
          <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">A language empowering everyone to build <b>reliable</b> &amp; efficient software.</a>
        </div>
        <div class="result">
          <h2><a rel="nofollow" class="result__a" href="https://doc.rust-lang.org/book/">The Book</a></h2>
        </div>
        <div class="result">
          <h2><a rel="nofollow" class="result__a" href="https://crates.io/">crates.io</a></h2>
          <a class="result__snippet" href="https://crates.io/">Rust&#x27;s package registry</a>
        </div>
    "#;

    #[test]
    fn test_parse_results_extracts_fields() {
        let results = parse_results(FIXTURE, 10).expect("parse");

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "The Rust Programming Language");
        assert_eq!(results[0].link, "https://www.rust-lang.org/");
        assert_eq!(
            results[0].snippet,
            "A language empowering everyone to build reliable & efficient software."
        );
        assert_eq!(results[1].title, "The Book");
        assert_eq!(results[1].link, "https://doc.rust-lang.org/book/");
        assert_eq!(results[2].snippet, "Rust's package registry");
    }

    #[test]
    fn test_missing_snippet_is_empty_string() {
        let results = parse_results(FIXTURE, 10).expect("parse");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(FIXTURE, 2).expect("parse").len(), 2);
        assert!(parse_results(FIXTURE, 0).expect("parse").is_empty());
        assert!(parse_results("<html>no hits</html>", 5)
            .expect("parse")
            .is_empty());
    }

    #[test]
    fn test_entities_in_titles_are_decoded() {
        let html = r#"<div class="result">
            <a class="result__a" href="https://x.test/">Rust&#8217;s &#x2F; guide &mdash; intro</a>
            <a class="result__snippet" href="https://x.test/">caf&eacute; &amp; more</a>
        </div>"#;

        let results = parse_results(html, 5).expect("parse");

        assert_eq!(results[0].title, "Rust\u{2019}s / guide \u{2014} intro");
        assert_eq!(results[0].snippet, "caf\u{e9} & more");
        assert_eq!(results[0].link, "https://x.test/");
    }
}
