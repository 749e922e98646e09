use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::parser::extract_post;
use crate::sitemap::SitemapEntry;
use crate::store;

pub struct BatchOptions {
    /// Where `<slug>.json` files live; also the skip-if-exists lookup.
    pub output_dir: PathBuf,
    /// Pause after every attempted post, success or failure.
    pub rate_limit: Duration,
    /// Dry run when false: posts are extracted but nothing is written.
    pub save: bool,
    /// Stop after this many attempted (non-skipped) posts.
    pub limit: Option<usize>,
}

/// Totals for one batch invocation, written as `scraping_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub attempted: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub errors: Vec<FailedPost>,
}

impl RunSummary {
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.successful as f64 / self.attempted as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedPost {
    pub url: String,
    pub slug: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Saved,
    /// Extracted in a dry run; nothing written.
    Extracted,
    Failed(String),
}

/// One fetched (or unfetchable) post, kept for the ledger.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub slug: String,
    pub outcome: Outcome,
    pub latency_ms: Option<i64>,
}

pub struct BatchReport {
    pub summary: RunSummary,
    pub attempts: Vec<Attempt>,
}

/// Serial scrape loop: skip what is on disk, extract the rest one by one.
///
/// Per-post fetch failures are recorded and the loop moves on. Only a failure to
/// write a post file aborts the run.
pub fn scrape_posts(
    client: &Client,
    entries: &[SitemapEntry],
    opts: &BatchOptions,
) -> Result<BatchReport> {
    let started_at = Utc::now();
    let total = entries.len();
    let mut successful = 0usize;
    let mut skipped = 0usize;
    let mut errors = Vec::new();
    let mut attempts = Vec::new();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta}) {msg}")?
            .progress_chars("=> "),
    );

    for entry in entries {
        if opts.limit.is_some_and(|n| attempts.len() >= n) {
            info!("Reached limit of {} posts", attempts.len());
            break;
        }
        pb.inc(1);

        let Some(slug) = store::slug_from_url(&entry.url) else {
            let err = FetchError::MissingSlug(entry.url.clone());
            warn!("{}", err);
            errors.push(FailedPost {
                url: entry.url.clone(),
                slug: String::new(),
                error: err.to_string(),
            });
            attempts.push(Attempt {
                url: entry.url.clone(),
                slug: String::new(),
                outcome: Outcome::Failed(err.to_string()),
                latency_ms: None,
            });
            continue;
        };

        if store::post_exists(&opts.output_dir, &slug) {
            debug!("Skipped (already exists): {}", slug);
            skipped += 1;
            continue;
        }

        pb.set_message(slug.clone());
        let start = Instant::now();
        let result = extract_post(client, &entry.url);
        let latency_ms = Some(start.elapsed().as_millis() as i64);

        let outcome = match result {
            Ok(post) => {
                if opts.save {
                    store::write_post(&opts.output_dir, &slug, &post)
                        .with_context(|| format!("Failed to save post {}", slug))?;
                }
                successful += 1;
                info!(
                    "{} {} ({} chars, {} images, {} code)",
                    if opts.save { "Saved" } else { "Extracted" },
                    slug,
                    post.content_text.chars().count(),
                    post.images.len(),
                    post.code_snippets.len()
                );
                if opts.save {
                    Outcome::Saved
                } else {
                    Outcome::Extracted
                }
            }
            Err(e) => {
                warn!("Failed {}: {}", slug, e);
                errors.push(FailedPost {
                    url: entry.url.clone(),
                    slug: slug.clone(),
                    error: e.to_string(),
                });
                Outcome::Failed(e.to_string())
            }
        };
        attempts.push(Attempt {
            url: entry.url.clone(),
            slug,
            outcome,
            latency_ms,
        });

        if !opts.rate_limit.is_zero() {
            debug!("Sleeping {:.1}s", opts.rate_limit.as_secs_f64());
            thread::sleep(opts.rate_limit);
        }
    }

    pb.finish_and_clear();

    let summary = RunSummary {
        total,
        attempted: attempts.len(),
        successful,
        failed: errors.len(),
        skipped,
        dry_run: !opts.save,
        started_at,
        finished_at: Utc::now(),
        errors,
    };
    info!(
        "Batch done: {} attempted ({} ok, {} failed), {} skipped",
        summary.attempted, summary.successful, summary.failed, summary.skipped
    );

    Ok(BatchReport { summary, attempts })
}
