use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::parser::PostMetadata;

static LD_JSON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static LABELLED_BUTTON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button[aria-label]").unwrap());
static LIKES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Like \((\d+)\)").unwrap());
static COMMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"View comments \((\d+)\)").unwrap());

pub fn extract(doc: &Html) -> PostMetadata {
    let mut meta = doc
        .select(&LD_JSON_SEL)
        .find_map(|script| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(v @ Value::Object(_)) => Some(v),
                _ => None,
            }
        })
        .map(|ld| from_json_ld(&ld))
        .unwrap_or_default();

    meta.likes = button_count(doc, &LIKES_RE);
    meta.comments = button_count(doc, &COMMENTS_RE);
    meta
}

/// Map a schema.org `NewsArticle` object onto our fields. Missing keys stay `None`.
pub fn from_json_ld(ld: &Value) -> PostMetadata {
    let str_field = |key: &str| ld.get(key).and_then(Value::as_str).map(str::to_string);

    // `author` is an array on Substack, but a bare object is valid JSON-LD too
    let author = match ld.get("author") {
        Some(Value::Array(list)) => list.first(),
        Some(obj @ Value::Object(_)) => Some(obj),
        _ => None,
    };
    let author_field = |key: &str| {
        author
            .and_then(|a| a.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    PostMetadata {
        headline: str_field("headline"),
        description: str_field("description"),
        date_published: str_field("datePublished"),
        date_modified: str_field("dateModified"),
        author: author_field("name"),
        author_url: author_field("url"),
        tags: keywords(ld.get("keywords")),
        likes: None,
        comments: None,
    }
}

fn keywords(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => s.split(',').collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// First `N` out of a `<button aria-label="... (N)">` matching `re`.
fn button_count(doc: &Html, re: &Regex) -> Option<u64> {
    doc.select(&LABELLED_BUTTON_SEL).find_map(|b| {
        let label = b.value().attr("aria-label")?;
        re.captures(label)?.get(1)?.as_str().parse().ok()
    })
}
