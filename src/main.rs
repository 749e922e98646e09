use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blog_scraper::batch::{self, BatchOptions};
use blog_scraper::settings::Settings;
use blog_scraper::sitemap::{self, SitemapEntry, DEFAULT_YEARS};
use blog_scraper::{http_client, ledger, parser, store};

const SAMPLE_POST_URL: &str = "https://blog.bytebytego.com/p/ep194-evolution-of-http";

#[derive(Parser)]
#[command(name = "blog_scraper", about = "Substack blog scraper: sitemap -> posts -> JSON files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect URLs from the yearly sitemaps and scrape every post not yet on disk
    Run {
        /// Max posts to fetch this run (skipped posts don't count)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Sitemap years to walk
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_YEARS.to_vec())]
        years: Vec<i32>,
    },
    /// Extract a single post and print what was found
    Post {
        /// Post URL
        #[arg(default_value = SAMPLE_POST_URL)]
        url: String,
        /// Print the full JSON record
        #[arg(long)]
        json: bool,
    },
    /// Only collect post URLs from the sitemaps
    Urls {
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_YEARS.to_vec())]
        years: Vec<i32>,
    },
    /// Show run history and posts on disk
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run { limit, years } => run(&settings, limit, &years),
        Commands::Post { url, json } => {
            let client = http_client()?;
            let post = parser::extract_post(&client, &url)
                .with_context(|| format!("Failed to extract {}", url))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                let m = &post.metadata;
                let dash = || "-".to_string();
                println!("Title:         {}", post.title);
                println!("Author:        {}", m.author.clone().unwrap_or_else(dash));
                println!("Published:     {}", m.date_published.clone().unwrap_or_else(dash));
                println!("Content:       {} chars", post.content_text.chars().count());
                println!("Images:        {}", post.images.len());
                println!("Code snippets: {}", post.code_snippets.len());
                println!("Likes:         {}", m.likes.map(|n| n.to_string()).unwrap_or_else(dash));
                println!("Comments:      {}", m.comments.map(|n| n.to_string()).unwrap_or_else(dash));
                if !post.content_text.is_empty() {
                    println!("\n{}", truncate(&post.content_text, 300));
                }
            }
            Ok(())
        }
        Commands::Urls { years } => {
            let client = http_client()?;
            let entries = sitemap::collect_all(&client, &settings.base_url, &years);
            save_url_list(&settings, &entries)?;
            for e in entries.iter().take(10) {
                println!("{:>4} | {:<60} | {}", e.year, truncate(&e.title, 60), e.url);
            }
            println!("\n{} unique posts", entries.len());
            Ok(())
        }
        Commands::Stats => {
            let on_disk = store::count_posts(&settings.posts_dir())?;
            println!("Posts on disk: {}", on_disk);
            let path = settings.ledger_file();
            if !path.exists() {
                println!("No ledger yet. Run 'run' with DEBUG_FILE_LOGS=true first.");
                return Ok(());
            }
            let conn = ledger::connect(&path)?;
            ledger::init_schema(&conn)?;
            let s = ledger::get_stats(&conn)?;
            println!("Runs:          {}", s.runs);
            println!("Attempts ok:   {}", s.attempts_ok);
            println!("Attempts err:  {}", s.attempts_error);
            println!("Failing now:   {}", s.failing.len());
            for slug in &s.failing {
                println!("  {}", slug);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run(settings: &Settings, limit: Option<usize>, years: &[i32]) -> Result<()> {
    let save = settings.save_to_file;
    println!("Save to file: {}", save);
    println!("Rate limit:   {:.1}s", settings.rate_limit.as_secs_f64());
    println!("Output:       {}", settings.posts_dir().display());

    // Phase 1: URLs
    let client = http_client()?;
    println!("\n[1/3] Collecting URLs from sitemaps ({:?})...", years);
    let entries = sitemap::collect_all(&client, &settings.base_url, years);
    println!("Found {} unique posts", entries.len());
    save_url_list(settings, &entries)?;

    // Phase 2: posts
    println!("\n[2/3] Scraping {} posts{}...", entries.len(), if save { "" } else { " (dry run)" });
    let opts = BatchOptions {
        output_dir: settings.posts_dir(),
        rate_limit: settings.rate_limit,
        save,
        limit,
    };
    let report = batch::scrape_posts(&client, &entries, &opts)?;
    let s = &report.summary;

    // Phase 3: summary
    println!("\n[3/3] Summary");
    if save {
        store::write_json(&settings.summary_file(), s)?;
        let conn = ledger::connect(&settings.ledger_file())?;
        ledger::init_schema(&conn)?;
        let run_id = ledger::record_run(&conn, &report)?;
        println!("Summary: {} (run #{})", settings.summary_file().display(), run_id);
    }
    println!("Total:      {}", s.total);
    println!("Attempted:  {}", s.attempted);
    println!("Successful: {}", s.successful);
    println!("Failed:     {}", s.failed);
    println!("Skipped:    {}", s.skipped);
    println!("Success rate: {:.1}%", s.success_rate());
    for e in &s.errors {
        println!("  {} -> {}", e.slug, truncate(&e.error, 80));
    }
    Ok(())
}

fn save_url_list(settings: &Settings, entries: &[SitemapEntry]) -> Result<()> {
    if settings.save_to_file {
        store::write_json(&settings.urls_file(), entries)?;
        println!("URL list saved to {}", settings.urls_file().display());
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
