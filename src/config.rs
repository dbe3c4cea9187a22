//! Configuration types for game-scrape

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Number of review entries served per API page; offsets step by this amount.
pub const REVIEW_PAGE_SIZE: u64 = 100;

/// Fixed increment between catalog index offsets; both range bounds must be
/// multiples of it.
pub const CATALOG_PAGE_STEP: u64 = 50;

fn default_retry_bound() -> u32 {
    5
}

fn default_max_workers() -> usize {
    8
}

fn default_reviews_base_url() -> String {
    "https://www.giantbomb.com/api/reviews/".to_owned()
}

fn default_catalog_base_url() -> String {
    "https://www.ign.com/games/all-ajax".to_owned()
}

/// Retry behavior for page fetches
///
/// Retries are immediate: the upstream servers intermittently serve error
/// pages even for valid offsets, and a prompt re-request is usually enough.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Attempts per page before the page is given up as exhausted (default: 5)
    #[serde(default = "default_retry_bound")]
    pub retry_bound: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_bound: default_retry_bound(),
        }
    }
}

/// Immutable run configuration for the JSON review source
///
/// Created once at startup and read-only thereafter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewsConfig {
    /// API key interpolated into every page request
    pub api_key: String,

    /// Offset at which to start
    #[serde(default)]
    pub start: u64,

    /// Offset at which to end (inclusive); `None` discovers the total from
    /// the first page
    #[serde(default)]
    pub end: Option<u64>,

    /// CSV output path; `None` means verbose-only runs
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Emit per-page and per-record progress
    #[serde(default)]
    pub verbose: bool,

    /// Fetch retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Base URL of the review API endpoint
    #[serde(default = "default_reviews_base_url")]
    pub base_url: String,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            start: 0,
            end: None,
            output: None,
            verbose: false,
            fetch: FetchConfig::default(),
            base_url: default_reviews_base_url(),
        }
    }
}

impl ReviewsConfig {
    /// Check the configuration before any page work begins.
    pub fn validate(&self) -> Result<()> {
        require_some_sink(&self.output, self.verbose)?;
        if let Some(end) = self.end {
            if self.start > end {
                return Err(Error::config(
                    format!("start index {} exceeds end index {end}", self.start),
                    "start",
                ));
            }
        }
        Ok(())
    }
}

/// Immutable run configuration for the HTML catalog source
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Offset at which to start; must be a multiple of [`CATALOG_PAGE_STEP`]
    #[serde(default)]
    pub start: u64,

    /// Offset at which to end (inclusive); must be a multiple of
    /// [`CATALOG_PAGE_STEP`]
    pub end: u64,

    /// CSV output path; `None` means verbose-only runs
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Emit per-page and per-record progress
    #[serde(default)]
    pub verbose: bool,

    /// Skip entries the site marks as not rated
    #[serde(default)]
    pub scores_only: bool,

    /// Maximum number of pages fetched concurrently (default: 8)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Fetch retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Base URL of the catalog index endpoint
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            output: None,
            verbose: false,
            scores_only: false,
            max_workers: default_max_workers(),
            fetch: FetchConfig::default(),
            base_url: default_catalog_base_url(),
        }
    }
}

impl CatalogConfig {
    /// Check the configuration before any page work begins.
    pub fn validate(&self) -> Result<()> {
        require_some_sink(&self.output, self.verbose)?;
        if self.start % CATALOG_PAGE_STEP != 0 {
            return Err(Error::config(
                format!(
                    "start index {} is not a multiple of {CATALOG_PAGE_STEP}",
                    self.start
                ),
                "start",
            ));
        }
        if self.end % CATALOG_PAGE_STEP != 0 {
            return Err(Error::config(
                format!(
                    "end index {} is not a multiple of {CATALOG_PAGE_STEP}",
                    self.end
                ),
                "end",
            ));
        }
        if self.start > self.end {
            return Err(Error::config(
                format!("start index {} exceeds end index {}", self.start, self.end),
                "start",
            ));
        }
        if self.max_workers == 0 {
            return Err(Error::config("max_workers must be at least 1", "max_workers"));
        }
        Ok(())
    }
}

/// A run with neither an output file nor verbose logging would do its work
/// invisibly, so it is rejected up front.
fn require_some_sink(output: &Option<PathBuf>, verbose: bool) -> Result<()> {
    if output.is_none() && !verbose {
        return Err(Error::config(
            "at least one of an output file or verbose mode must be enabled",
            "output",
        ));
    }
    Ok(())
}
