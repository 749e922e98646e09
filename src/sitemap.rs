use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::parser::fetch_html;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

pub const POST_PATH_PREFIX: &str = "/p/";
pub const DEFAULT_YEARS: &[i32] = &[2021, 2022, 2023, 2024, 2025];

/// A post link as listed on a yearly sitemap page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub url: String,
    pub title: String,
    pub year: i32,
}

pub fn sitemap_url(base: &Url, year: i32) -> Result<Url> {
    base.join(&format!("/sitemap/{}", year))
        .with_context(|| format!("Bad sitemap URL for {} on {}", year, base))
}

/// Fetch one year's sitemap and return its post links in page order.
pub fn fetch_year(client: &Client, base: &Url, year: i32) -> Result<Vec<SitemapEntry>> {
    let page_url = sitemap_url(base, year)?;
    info!("Fetching sitemap: {}", page_url);
    let html = fetch_html(client, page_url.as_str())
        .with_context(|| format!("Failed to fetch sitemap for {}", year))?;
    Ok(parse_sitemap(&html, &page_url, year))
}

/// Fetch every year, concatenate and dedup by URL (first seen wins).
/// A year that fails to load contributes nothing.
pub fn collect_all(client: &Client, base: &Url, years: &[i32]) -> Vec<SitemapEntry> {
    let mut all = Vec::new();
    for &year in years {
        match fetch_year(client, base, year) {
            Ok(entries) => {
                info!("{}: {} posts", year, entries.len());
                all.extend(entries);
            }
            Err(e) => warn!("Skipping sitemap {}: {:#}", year, e),
        }
    }

    let total = all.len();
    let unique = dedup_by_url(all);
    info!("Unique posts: {} (of {} listed)", unique.len(), total);
    unique
}

pub fn dedup_by_url(entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.url.clone()))
        .collect()
}

/// Anchors pointing at `/p/<slug>` on the same host as the sitemap page.
pub fn parse_sitemap(html: &str, page_url: &Url, year: i32) -> Vec<SitemapEntry> {
    let doc = Html::parse_document(html);
    doc.select(&ANCHOR_SEL)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = post_url(page_url, href)?;
            Some(SitemapEntry {
                url,
                title: a.text().collect::<String>().trim().to_string(),
                year,
            })
        })
        .collect()
}

fn post_url(page_url: &Url, href: &str) -> Option<String> {
    let mut url = page_url.join(href).ok()?;
    if url.host_str() != page_url.host_str() {
        return None;
    }
    let slug = url.path().strip_prefix(POST_PATH_PREFIX)?;
    if slug.trim_matches('/').is_empty() {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}
