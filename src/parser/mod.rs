pub mod extract;

use reqwest::blocking::Client;
use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;

/// One scraped post, as persisted to `posts/<slug>.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub url: String,
    pub title: String,
    pub content_text: String,
    pub metadata: PostMetadata,
    pub code_snippets: Vec<CodeSnippet>,
    pub images: Vec<PostImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub index: usize,
    /// From a `language-*` class; `None` when the block carries no such class.
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    /// Position among all `<img>` tags in the article, before filtering.
    pub index: usize,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Single GET; anything but a 2xx is an error.
pub fn fetch_html(client: &Client, url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let response = client.get(parsed).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text()?)
}

/// Parse a post page. Never fails: each field falls back to its default on a miss.
pub fn parse_post(url: &str, html: &str) -> Post {
    let doc = Html::parse_document(html);
    extract::extract_all(url, &doc)
}

/// Fetch + parse one post.
pub fn extract_post(client: &Client, url: &str) -> Result<Post, FetchError> {
    let html = fetch_html(client, url)?;
    Ok(parse_post(url, &html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metadata_serializes_as_empty_object() {
        let post = Post {
            url: "https://blog.bytebytego.com/p/x".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&post).unwrap();
        assert_eq!(v["metadata"], serde_json::json!({}));
        assert_eq!(v["title"], "");
        assert!(v["code_snippets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn extract_post_fetches_and_parses() {
        let mut server = mockito::Server::new();
        let html = std::fs::read_to_string("tests/fixtures/ep194-evolution-of-http.html").unwrap();
        let mock = server
            .mock("GET", "/p/ep194-evolution-of-http")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .expect(1)
            .create();

        let url = format!("{}/p/ep194-evolution-of-http", server.url());
        let post = extract_post(&Client::new(), &url).unwrap();
        assert_eq!(post.url, url);
        assert_eq!(post.title, "EP194: Evolution of HTTP");
        mock.assert();
    }

    #[test]
    fn non_success_status_fails_whole_extraction() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/p/gone").with_status(404).create();

        let url = format!("{}/p/gone", server.url());
        let err = extract_post(&Client::new(), &url).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        mock.assert();
    }

    #[test]
    fn unparsable_url_is_invalid_not_http() {
        let err = extract_post(&Client::new(), "blog.bytebytego.com/p/no-scheme").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
