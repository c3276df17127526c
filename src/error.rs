use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the watcher.
///
/// The first three variants are fatal: they abort the run before any
/// network work starts and map to exit code 1. The remaining variants are
/// per-product: they are captured in that product's result slot and never
/// abort the batch.
#[derive(Debug, Error)]
pub enum CossError {
    #[error("config file not found at {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config.json is not valid:\n{0}")]
    ConfigInvalid(String),

    #[error("telegram credentials not found in environment, secret file or config")]
    CredentialsMissing,

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("missing field `{0}` in product data")]
    MissingField(&'static str),

    #[error("{0}")]
    Data(String),

    #[error("telegram send failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}
