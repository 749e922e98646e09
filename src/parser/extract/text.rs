use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1.post-title").unwrap());
static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.body.markup").unwrap());

/// Text of `h1.post-title`, whitespace-trimmed. Empty when the heading is missing.
pub fn title(doc: &Html) -> String {
    doc.select(&TITLE_SEL)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Plain text of the post body: one trimmed text node per line, blanks dropped.
pub fn content(doc: &Html) -> String {
    doc.select(&BODY_SEL)
        .next()
        .map(joined_text)
        .unwrap_or_default()
}

fn joined_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        let doc = Html::parse_document(r#"<h1 class="post-title unpublished">  Hello  </h1>"#);
        assert_eq!(title(&doc), "Hello");
    }

    #[test]
    fn missing_title_is_empty() {
        let doc = Html::parse_document("<h1>Not the post title</h1>");
        assert_eq!(title(&doc), "");
    }

    #[test]
    fn body_strips_markup_and_blank_nodes() {
        let doc = Html::parse_document(
            r#"<div class="available-content"><div class="body markup" dir="auto">
                <p>First <strong>bold</strong> line</p>
                <p>   </p>
                <ul><li>item</li></ul>
            </div></div>"#,
        );
        assert_eq!(content(&doc), "First\nbold\nline\nitem");
    }

    #[test]
    fn missing_body_container_is_empty() {
        let doc = Html::parse_document(r#"<div class="body">no markup class</div>"#);
        assert_eq!(content(&doc), "");
    }
}
