pub mod batch;
pub mod error;
pub mod ledger;
pub mod parser;
pub mod settings;
pub mod sitemap;
pub mod store;

use anyhow::Result;
use reqwest::blocking::Client;

pub const USER_AGENT: &str = concat!("blog_scraper/", env!("CARGO_PKG_VERSION"));

/// Blocking client shared by sitemap and post fetches. Default timeouts apply.
pub fn http_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}
