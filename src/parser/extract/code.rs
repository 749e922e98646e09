use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::article_scope;
use crate::parser::CodeSnippet;

static CODE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());

pub fn extract(doc: &Html) -> Vec<CodeSnippet> {
    article_scope(doc)
        .select(&CODE_SEL)
        .enumerate()
        .map(|(index, code)| CodeSnippet {
            index,
            language: code.value().classes().find_map(language_from_class),
            code: code.text().collect(),
        })
        .collect()
}

/// `language-rust` -> `rust`. Anything else is not a language hint.
fn language_from_class(class: &str) -> Option<String> {
    class
        .strip_prefix("language-")
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_class_prefix() {
        let doc = Html::parse_document(
            r#"<article class="newsletter-post">
                 <pre><code class="hljs language-python">print("hi")
</code></pre>
                 <p>Use <code>curl -I</code> to check.</p>
               </article>"#,
        );
        let snippets = extract(&doc);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].index, 0);
        assert_eq!(snippets[0].language.as_deref(), Some("python"));
        assert_eq!(snippets[0].code, "print(\"hi\")\n");
        assert_eq!(snippets[1].language, None);
        assert_eq!(snippets[1].code, "curl -I");
    }

    #[test]
    fn code_outside_article_is_ignored() {
        let doc = Html::parse_document(
            r#"<nav><code>nav</code></nav>
               <article class="newsletter-post"><code>inside</code></article>"#,
        );
        let snippets = extract(&doc);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].code, "inside");
    }

    #[test]
    fn unconventional_class_stays_unlabeled() {
        assert_eq!(language_from_class("lang-js"), None);
        assert_eq!(language_from_class("language-"), None);
        assert_eq!(language_from_class("language-ts").as_deref(), Some("ts"));
    }
}
