//! Stock watcher for clasohlson.com.
//!
//! Checks price and availability for a configured list of products and
//! posts a photo digest to a Telegram chat. Runs once per invocation;
//! nothing is persisted between runs.

pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod scrape;
pub mod sku;

pub use config::Config;
pub use error::CossError;
pub use scrape::{CoScraper, Product, StockStatus};
