use httpmock::prelude::*;
use serde_json::json;
use searchbatch_core::{Tool, ToolError};
use searchbatch_tools::{DuckDuckGoSearch, SafeSearch, SearchOptions, SearchResult};

fn result_block(title: &str, link: &str, snippet: &str) -> String {
    format!(
        r#"<div class="result results_links web-result"><div class="links_main result__body">
<h2 class="result__title"><a rel="nofollow" class="result__a" href="{link}">{title}</a></h2>
<a class="result__snippet" href="{link}">{snippet}</a>
</div></div>"#
    )
}

fn page(count: usize) -> String {
    let blocks: Vec<String> = (1..=count)
        .map(|i| {
            result_block(
                &format!("Result {i}"),
                &format!("https://example.com/{i}"),
                &format!("Snippet {i}"),
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", blocks.join("\n"))
}

#[tokio::test]
async fn search_sends_options_and_truncates_results() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/html/")
            .query_param("q", "capital of France")
            .query_param("kl", "fr-fr")
            .query_param("kp", "-1")
            .header("accept-language", "fr-fr");
        then.status(200).body(page(4));
    });

    let search = DuckDuckGoSearch::new(SearchOptions {
        max_results: 2,
        region: "fr-fr".to_string(),
        locale: "fr-fr".to_string(),
        safe_search: SafeSearch::Moderate,
    })
    .unwrap()
    .with_base_url(server.url(""));

    let results = search.search("capital of France").await.unwrap();
    assert_eq!(
        results,
        vec![
            SearchResult {
                title: "Result 1".to_string(),
                link: "https://example.com/1".to_string(),
                snippet: "Snippet 1".to_string(),
            },
            SearchResult {
                title: "Result 2".to_string(),
                link: "https://example.com/2".to_string(),
                snippet: "Snippet 2".to_string(),
            },
        ]
    );
    mock.assert();
}

#[tokio::test]
async fn tool_invoke_returns_json_array() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/html/").query_param("q", "rust");
        then.status(200).body(page(1));
    });

    let search = DuckDuckGoSearch::new(SearchOptions::default())
        .unwrap()
        .with_base_url(server.url(""));

    let value = search.invoke(json!({"query": "rust"})).await.unwrap();
    assert_eq!(value[0]["title"], "Result 1");
    assert_eq!(value.as_array().map(Vec::len), Some(1));

    let bare = search.invoke(json!("rust")).await.unwrap();
    assert_eq!(bare, value);
}

#[tokio::test]
async fn tool_invoke_rejects_bad_arguments() {
    let search = DuckDuckGoSearch::new(SearchOptions::default()).unwrap();

    let missing = search.invoke(json!({"q": "rust"})).await.unwrap_err();
    assert!(matches!(missing, ToolError::Json(_)));

    let empty = search.invoke(json!({"query": "   "})).await.unwrap_err();
    assert!(matches!(empty, ToolError::InvalidInput(_)));
}

#[tokio::test]
async fn search_reports_http_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/html/");
        then.status(503);
    });

    let search = DuckDuckGoSearch::new(SearchOptions::default())
        .unwrap()
        .with_base_url(server.url(""));
    let err = search.search("rust").await.unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(_)));
}

#[test]
fn schema_requires_query() {
    let search = DuckDuckGoSearch::new(SearchOptions::default()).unwrap();
    let schema = search.schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["query"]));
    assert_eq!(search.name(), "duckduckgo-search");
}
