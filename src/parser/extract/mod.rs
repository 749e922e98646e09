pub mod code;
pub mod images;
pub mod metadata;
pub mod text;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::Post;

static ARTICLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.newsletter-post").unwrap());

pub fn extract_all(url: &str, doc: &Html) -> Post {
    Post {
        url: url.to_string(),
        title: text::title(doc),
        content_text: text::content(doc),
        metadata: metadata::extract(doc),
        code_snippets: code::extract(doc),
        images: images::extract(doc),
    }
}

/// The post article, or the whole document when the page has no article wrapper.
pub(crate) fn article_scope(doc: &Html) -> ElementRef<'_> {
    doc.select(&ARTICLE_SEL)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(fixture: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        Html::parse_document(&html)
    }

    const EP194: &str = "https://blog.bytebytego.com/p/ep194-evolution-of-http";

    #[test]
    fn ep194_full_record() {
        let post = extract_all(EP194, &parse("ep194-evolution-of-http"));
        assert_eq!(post.url, EP194);
        assert_eq!(post.title, "EP194: Evolution of HTTP");
        assert!(post.content_text.starts_with("This week’s system design refresher:"));
        assert_eq!(post.metadata.author.as_deref(), Some("Alex Xu"));
        assert_eq!(post.code_snippets.len(), 2);
        assert_eq!(post.images.len(), 2);
    }

    #[test]
    fn ep194_json_shape() {
        let post = extract_all(EP194, &parse("ep194-evolution-of-http"));
        let v = serde_json::to_value(&post).unwrap();
        for key in ["url", "title", "content_text", "metadata", "code_snippets", "images"] {
            assert!(v.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(v["metadata"]["date_published"], "2025-12-13T16:30:43+00:00");
        assert_eq!(v["code_snippets"][1]["language"], serde_json::Value::Null);
    }

    #[test]
    fn bare_page_degrades_every_field() {
        let post = extract_all(EP194, &parse("no-body"));
        assert_eq!(post.url, EP194);
        assert_eq!(post.content_text, "");
        assert_eq!(post.metadata, Default::default());
        assert!(post.code_snippets.is_empty());
    }

    #[test]
    fn missing_article_falls_back_to_document() {
        let doc = Html::parse_document(
            r#"<html><body><pre><code class="language-go">fmt.Println()</code></pre></body></html>"#,
        );
        let post = extract_all(EP194, &doc);
        assert_eq!(post.code_snippets.len(), 1);
        assert_eq!(post.code_snippets[0].language.as_deref(), Some("go"));
    }
}
