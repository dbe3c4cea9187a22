//! Sequential driver for the JSON review source
//!
//! Pages are walked from `start` to `end` inclusive, stepping by
//! [`REVIEW_PAGE_SIZE`]; each page is fetched, extracted, and written
//! before the next is requested. When no end index is configured, a probe
//! fetch of offset 0 discovers the catalog-wide total; probe failure is
//! fatal because it means even the first page is unreachable.

pub mod extract;

use url::Url;

use crate::config::{REVIEW_PAGE_SIZE, ReviewsConfig};
use crate::csv::CsvSink;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchOutcome, HttpFetcher, PageFetcher};
use crate::types::{CsvRecord, ReviewRecord};

/// Fields requested from the API, mirroring the CSV columns plus release
/// metadata the endpoint bundles with them.
const FIELD_LIST: &str = "deck,game,publish_date,release,reviewer,score,site_detail_url";

/// Run the review scrape described by `config`.
///
/// Returns the number of records written. Retry-exhausted and unparseable
/// pages are skipped with a diagnostic; only configuration, probe, and
/// output-file failures abort the run.
pub async fn run(config: &ReviewsConfig) -> Result<u64> {
    config.validate()?;
    let fetcher = PageFetcher::new(HttpFetcher::new()?, config.fetch.retry_bound);
    run_with(config, &fetcher).await
}

/// Drive the pipeline with an explicit transport. Test seam for [`run`].
pub(crate) async fn run_with<F: Fetch>(
    config: &ReviewsConfig,
    fetcher: &PageFetcher<F>,
) -> Result<u64> {
    let sink = match &config.output {
        Some(path) => Some(CsvSink::create(path, ReviewRecord::header()).await?),
        None => None,
    };

    let end = match config.end {
        Some(end) => end,
        None => discover_end(config, fetcher).await?,
    };

    let mut written = 0u64;
    let mut offset = config.start;
    while offset <= end {
        let url = page_url(config, offset)?;
        tracing::debug!(url = %url, offset, "requesting review page");
        if let FetchOutcome::Success(body) = fetcher.fetch(url.as_str()).await {
            match extract::extract(&body) {
                Ok(records) => {
                    for record in &records {
                        if let Some(sink) = &sink {
                            sink.handle().write(record).await?;
                        }
                        tracing::info!(
                            title = %record.title,
                            date = %record.date,
                            reviewer = %record.reviewer,
                            score = %record.score,
                            url = %record.url,
                            "review"
                        );
                        written += 1;
                    }
                }
                Err(error) => {
                    tracing::warn!(url = %url, error = %error, "skipping unparseable review page");
                }
            }
        }
        offset += REVIEW_PAGE_SIZE;
    }

    if let Some(sink) = sink {
        sink.close().await?;
    }
    Ok(written)
}

/// Probe offset 0 and read the total result count for use as the end index.
async fn discover_end<F: Fetch>(config: &ReviewsConfig, fetcher: &PageFetcher<F>) -> Result<u64> {
    let url = page_url(config, 0)?;
    tracing::debug!(url = %url, "probing first page for total result count");
    match fetcher.fetch(url.as_str()).await {
        FetchOutcome::Success(body) => extract::total_results(&body),
        FetchOutcome::Exhausted => Err(Error::Probe(format!("failed to fetch probe page {url}"))),
    }
}

fn page_url(config: &ReviewsConfig, offset: u64) -> Result<Url> {
    let url = Url::parse_with_params(
        &config.base_url,
        [
            ("api_key", config.api_key.clone()),
            ("format", "JSON".to_owned()),
            ("field_list", FIELD_LIST.to_owned()),
            ("offset", offset.to_string()),
        ],
    )?;
    Ok(url)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Transport answering from a fixed offset→body table; anything absent
    /// from the table fails the attempt.
    struct PageTable {
        pages: HashMap<String, String>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Fetch for PageTable {
        async fn get_text(&self, url: &str) -> crate::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let offset = Url::parse(url)
                .unwrap()
                .query_pairs()
                .find(|(key, _)| key == "offset")
                .map(|(_, value)| value.into_owned())
                .unwrap();
            self.pages.get(&offset).cloned().ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "no such page",
                ))
            })
        }
    }

    fn table(pages: &[(&str, &str)]) -> (PageTable, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            PageTable {
                pages: pages
                    .iter()
                    .map(|(offset, body)| ((*offset).to_owned(), (*body).to_owned()))
                    .collect(),
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn config(end: Option<u64>, output: Option<std::path::PathBuf>) -> ReviewsConfig {
        ReviewsConfig {
            api_key: "test-key".into(),
            end,
            output,
            verbose: true,
            base_url: "http://reviews.test/api/reviews/".into(),
            ..ReviewsConfig::default()
        }
    }

    const ONE_RECORD: &str = r#"{"number_of_total_results": 101,
        "results": [{"game": {"name": "Portal"}, "score": 5}]}"#;

    #[tokio::test]
    async fn bounded_run_writes_header_plus_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        let (transport, _) = table(&[("0", ONE_RECORD), ("100", ONE_RECORD)]);
        let fetcher = PageFetcher::new(transport, 5);

        let written = run_with(&config(Some(100), Some(path.clone())), &fetcher)
            .await
            .unwrap();

        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "title,deck,date,reviewer,score,url");
    }

    #[tokio::test]
    async fn unbounded_run_discovers_end_from_the_probe_page() {
        let (transport, _) = table(&[("0", ONE_RECORD), ("100", ONE_RECORD)]);
        let fetcher = PageFetcher::new(transport, 5);

        // Probe reports 101 total, so offsets 0 and 100 are both scraped.
        let written = run_with(&config(None, None), &fetcher).await.unwrap();
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn probe_failure_aborts_the_run() {
        let (transport, calls) = table(&[]);
        let fetcher = PageFetcher::new(transport, 3);

        let result = run_with(&config(None, None), &fetcher).await;

        assert!(matches!(result, Err(Error::Probe(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "probe respects the retry bound");
    }

    #[tokio::test]
    async fn exhausted_page_is_skipped_and_the_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        // Offset 100 is absent, so it exhausts; offsets 0 and 200 still land.
        let (transport, _) = table(&[("0", ONE_RECORD), ("200", ONE_RECORD)]);
        let fetcher = PageFetcher::new(transport, 2);

        let written = run_with(&config(Some(200), Some(path.clone())), &fetcher)
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn invalid_configuration_fails_before_any_fetch() {
        let (transport, calls) = table(&[("0", ONE_RECORD)]);
        let _fetcher = PageFetcher::new(transport, 5);
        let bad = ReviewsConfig {
            verbose: false,
            output: None,
            ..config(Some(0), None)
        };

        // run() owns validation; run_with is only reached with a valid config.
        let result = bad.validate();
        assert!(matches!(result, Err(Error::Config { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
