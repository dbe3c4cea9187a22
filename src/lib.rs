//! # game-scrape
//!
//! Scraper library for two paginated game-data sources: a JSON review API
//! and an HTML catalog index. Both pipelines fetch pages with bounded
//! immediate retry, extract records with per-field defensive defaults, and
//! emit escaped CSV through a single-owner sink.
//!
//! ## Design Philosophy
//!
//! - **Page-local failure** - a page that cannot be fetched or extracted is
//!   logged and skipped; only configuration and startup errors abort a run
//! - **Defensive extraction** - a missing or malformed field degrades to a
//!   documented default, never to an error
//! - **Bounded concurrency** - the catalog pipeline never has more than the
//!   configured number of pages in flight
//!
//! ## Quick Start
//!
//! ```no_run
//! use game_scrape::{ReviewsConfig, reviews};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReviewsConfig {
//!         api_key: "your-api-key".to_owned(),
//!         output: Some("reviews.csv".into()),
//!         ..Default::default()
//!     };
//!
//!     let written = reviews::run(&config).await?;
//!     println!("wrote {written} records");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Concurrent driver and extractor for the HTML catalog source
pub mod catalog;
/// Configuration types
pub mod config;
/// CSV serialization and the single-owner output sink
pub mod csv;
/// Error types
pub mod error;
/// Page fetching with bounded immediate retry
pub mod fetch;
/// Sequential driver and extractor for the JSON review source
pub mod reviews;
/// Core record types
pub mod types;

// Re-export commonly used types
pub use config::{CATALOG_PAGE_STEP, CatalogConfig, FetchConfig, REVIEW_PAGE_SIZE, ReviewsConfig};
pub use csv::{CsvSink, SinkHandle};
pub use error::{Error, Result};
pub use fetch::{Fetch, FetchOutcome, HttpFetcher, PageFetcher};
pub use types::{
    CatalogRecord, CsvField, CsvRecord, NOT_RATED, NOT_RATED_SCORE, ReviewRecord,
    UNKNOWN_PLATFORM,
};
