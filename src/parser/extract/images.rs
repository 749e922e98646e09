use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::article_scope;
use crate::parser::PostImage;

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Icons and avatars are declared smaller than this on either side.
pub const MIN_IMAGE_PX: u32 = 100;

pub fn extract(doc: &Html) -> Vec<PostImage> {
    article_scope(doc)
        .select(&IMG_SEL)
        .enumerate()
        .filter(|(_, img)| !is_decorative(*img))
        .map(|(index, img)| to_image(index, img))
        .collect()
}

fn to_image(index: usize, img: ElementRef<'_>) -> PostImage {
    let attr = |name: &str| img.value().attr(name).map(str::to_string);
    PostImage {
        index,
        src: attr("src"),
        alt: attr("alt"),
        title: attr("title"),
        width: dimension(img, "width"),
        height: dimension(img, "height"),
    }
}

fn dimension(img: ElementRef<'_>, name: &str) -> Option<u32> {
    img.value().attr(name)?.trim().parse().ok()
}

/// Only images declaring both dimensions can be ruled out.
fn is_decorative(img: ElementRef<'_>) -> bool {
    match (dimension(img, "width"), dimension(img, "height")) {
        (Some(w), Some(h)) => w < MIN_IMAGE_PX || h < MIN_IMAGE_PX,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(body: &str) -> Vec<PostImage> {
        let html = format!(r#"<article class="newsletter-post">{}</article>"#, body);
        extract(&Html::parse_document(&html))
    }

    #[test]
    fn small_images_are_dropped() {
        let got = images(
            r#"<img src="a.png" width="80" height="80">
               <img src="b.png" width="120" height="150" alt="diagram">"#,
        );
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].src.as_deref(), Some("b.png"));
        assert_eq!(got[0].alt.as_deref(), Some("diagram"));
        assert_eq!(got[0].index, 1);
        assert_eq!((got[0].width, got[0].height), (Some(120), Some(150)));
    }

    #[test]
    fn one_small_side_is_enough() {
        let got = images(r#"<img src="strip.png" width="1456" height="40">"#);
        assert!(got.is_empty());
    }

    #[test]
    fn undeclared_or_unparsable_sizes_are_kept() {
        let got = images(
            r#"<img src="a.png">
               <img src="b.png" width="auto" height="20">
               <img src="c.png" width="50">"#,
        );
        let srcs: Vec<_> = got.iter().filter_map(|i| i.src.as_deref()).collect();
        assert_eq!(srcs, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(got[1].width, None);
        assert_eq!(got[1].height, Some(20));
    }

    #[test]
    fn fixture_filters_avatar() {
        let html = std::fs::read_to_string("tests/fixtures/ep194-evolution-of-http.html").unwrap();
        let got = extract(&Html::parse_document(&html));
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|i| i.width.unwrap_or(MIN_IMAGE_PX) >= MIN_IMAGE_PX));
    }
}
