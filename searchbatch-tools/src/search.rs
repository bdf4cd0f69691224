//! Web search over DuckDuckGo's HTML endpoint (no API key needed).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use searchbatch_core::{Tool, ToolError, Value};
use url::Url;

const DUCKDUCKGO_BASE_URL: &str = "https://html.duckduckgo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; searchbatch/0.1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    #[default]
    Strict,
    Moderate,
    Off,
}

impl SafeSearch {
    /// Value of DuckDuckGo's `kp` query parameter.
    fn kp(self) -> &'static str {
        match self {
            SafeSearch::Strict => "1",
            SafeSearch::Moderate => "-1",
            SafeSearch::Off => "-2",
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafeSearch::Strict => "strict",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Off => "off",
        })
    }
}

impl FromStr for SafeSearch {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SafeSearch::Strict),
            "moderate" => Ok(SafeSearch::Moderate),
            "off" => Ok(SafeSearch::Off),
            other => Err(format!(
                "unknown safe search level '{other}' (expected strict, moderate or off)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    /// DuckDuckGo region code, e.g. `us-en`.
    pub region: String,
    /// Sent as `Accept-Language`.
    pub locale: String,
    pub safe_search: SafeSearch,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            region: "us-en".to_string(),
            locale: "en-us".to_string(),
            safe_search: SafeSearch::Strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchArgs {
    /// The search query
    query: String,
}

#[derive(Clone, Debug)]
pub struct DuckDuckGoSearch {
    base_url: String,
    options: SearchOptions,
    http: Client,
}

impl DuckDuckGoSearch {
    pub fn new(options: SearchOptions) -> Result<Self, ToolError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
        Ok(Self {
            base_url: DUCKDUCKGO_BASE_URL.to_string(),
            options,
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Runs one query and returns at most `max_results` results.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("empty search query".to_string()));
        }
        tracing::debug!(query, region = %self.options.region, "duckduckgo search");

        let url = format!("{}/html/", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(url)
            .query(&[
                ("q", query),
                ("kl", self.options.region.as_str()),
                ("kp", self.options.safe_search.kp()),
            ])
            .header(reqwest::header::ACCEPT_LANGUAGE, self.options.locale.as_str())
            .send()
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "duckduckgo returned {status}"
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let results = parse_results(&html, self.options.max_results);
        if results.is_empty() {
            tracing::warn!(query, "duckduckgo returned no results");
        }
        Ok(results)
    }
}

#[async_trait::async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo-search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Useful for current events and facts you are unsure about. Returns a JSON array of results with title, link and snippet."
    }

    fn schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(SearchArgs))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        // Some models pass the bare query string instead of an object.
        let query = match args {
            Value::String(query) => query,
            other => serde_json::from_value::<SearchArgs>(other)?.query,
        };
        let results = self.search(&query).await?;
        Ok(serde_json::to_value(results)?)
    }
}

/// Extracts organic results from a DuckDuckGo HTML page.
fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for chunk in html.split("result__body").skip(1) {
        if results.len() >= limit {
            break;
        }

        let title = element_text(chunk, "class=\"result__a\"").unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        let link = element_href(chunk, "class=\"result__a\"")
            .map(|href| resolve_link(&href))
            .or_else(|| {
                element_text(chunk, "class=\"result__url\"")
                    .filter(|url| !url.is_empty())
                    .map(|url| format!("https://{url}"))
            })
            .unwrap_or_default();
        let snippet = element_text(chunk, "class=\"result__snippet\"").unwrap_or_default();

        results.push(SearchResult {
            title,
            link,
            snippet,
        });
    }

    results
}

/// Text content of the first element carrying `marker`, tags stripped.
fn element_text(chunk: &str, marker: &str) -> Option<String> {
    let start = chunk.find(marker)?;
    let rest = &chunk[start..];
    let open_end = rest.find('>')?;
    let body = &rest[open_end + 1..];
    let close = body.find("</a>").or_else(|| body.find("</div>"))?;
    Some(html_decode(&strip_tags(&body[..close])))
}

fn element_href(chunk: &str, marker: &str) -> Option<String> {
    let start = chunk.find(marker)?;
    let tag_start = chunk[..start].rfind('<').unwrap_or(start);
    let tag_end = start + chunk[start..].find('>')?;
    let tag = &chunk[tag_start..tag_end];
    let href_start = tag.find("href=\"")? + "href=\"".len();
    let href_len = tag[href_start..].find('"')?;
    Some(html_decode(&tag[href_start..href_start + href_len]))
}

/// Unwraps DuckDuckGo's `/l/?uddg=<target>` redirect links.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or(absolute)
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FParis&amp;rut=abc">Paris - Wikipedia</a>
    </h2>
    <a class="result__url" href="//duckduckgo.com/l/?uddg=x">en.wikipedia.org/wiki/Paris</a>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x"><b>Paris</b> is the capital &amp; largest city of France.</a>
  </div>
</div>
<div class="result results_links results_links_deep web-result">
  <div class="links_main links_deep result__body">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="https://www.britannica.com/place/Paris">Paris | History</a>
    </h2>
    <a class="result__snippet" href="https://www.britannica.com/place/Paris">City on the Seine.</a>
  </div>
</div>
"#;

    #[test]
    fn parses_title_link_and_snippet() {
        let results = parse_results(PAGE, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Paris - Wikipedia");
        assert_eq!(results[0].link, "https://en.wikipedia.org/wiki/Paris");
        assert_eq!(
            results[0].snippet,
            "Paris is the capital & largest city of France."
        );
        assert_eq!(results[1].link, "https://www.britannica.com/place/Paris");
    }

    #[test]
    fn respects_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results(PAGE, 0).is_empty());
    }

    #[test]
    fn page_without_results_is_empty() {
        assert!(parse_results("<html><body>No results.</body></html>", 5).is_empty());
    }

    #[test]
    fn safe_search_parses_and_maps_to_kp() {
        assert_eq!("Moderate".parse::<SafeSearch>().unwrap(), SafeSearch::Moderate);
        assert_eq!(SafeSearch::Off.kp(), "-2");
        assert_eq!(SafeSearch::default().kp(), "1");
        assert!("none".parse::<SafeSearch>().is_err());
    }
}
