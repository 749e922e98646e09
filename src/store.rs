use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use crate::parser::Post;

pub const POSTS_DIR: &str = "posts";
pub const URLS_FILE: &str = "all_urls.json";
pub const SUMMARY_FILE: &str = "scraping_summary.json";
pub const LEDGER_FILE: &str = "scrape_ledger.sqlite";

/// Last non-empty path segment of a post URL.
///
/// `https://blog.bytebytego.com/p/ep194-evolution-of-http` -> `ep194-evolution-of-http`
pub fn slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let slug = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?
        .to_string();
    // Slugs become file names
    if slug == "." || slug == ".." || slug.contains(['\\', ':']) {
        return None;
    }
    Some(slug)
}

pub fn post_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(format!("{}.json", slug))
}

pub fn post_exists(output_dir: &Path, slug: &str) -> bool {
    post_path(output_dir, slug).is_file()
}

pub fn write_post(output_dir: &Path, slug: &str, post: &Post) -> Result<PathBuf> {
    let path = post_path(output_dir, slug);
    write_json(&path, post)?;
    Ok(path)
}

/// Pretty-print `value` to `path`, going through a sibling temp file so a
/// reader never sees a half-written record.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

/// Number of post records currently on disk.
pub fn count_posts(output_dir: &Path) -> Result<usize> {
    if !output_dir.exists() {
        return Ok(0);
    }
    let mut n = 0;
    for entry in fs::read_dir(output_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            n += 1;
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_trailing_segment() {
        assert_eq!(
            slug_from_url("https://blog.bytebytego.com/p/ep194-evolution-of-http").as_deref(),
            Some("ep194-evolution-of-http")
        );
        assert_eq!(
            slug_from_url("https://blog.bytebytego.com/p/some-post/?utm_source=x").as_deref(),
            Some("some-post")
        );
    }

    #[test]
    fn no_slug_for_bare_host_or_garbage() {
        assert_eq!(slug_from_url("https://blog.bytebytego.com/"), None);
        assert_eq!(slug_from_url("not a url"), None);
    }

    #[test]
    fn write_json_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("x.json");
        write_json(&path, &serde_json::json!({ "a": "ü" })).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"a\": \"ü\""));
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(count_posts(path.parent().unwrap()).unwrap(), 1);
    }

    #[test]
    fn count_posts_missing_dir_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_posts(&dir.path().join("nope")).unwrap(), 0);
    }
}
