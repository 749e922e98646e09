use thiserror::Error;

/// Why a single page could not be turned into a record.
///
/// These never abort a batch; the orchestrator logs them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no slug in URL {0}")]
    MissingSlug(String),
}
