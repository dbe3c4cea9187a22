//! Concurrent driver for the HTML catalog source
//!
//! Offsets run from `start` to `end` inclusive, stepping by
//! [`CATALOG_PAGE_STEP`]. Each offset becomes a fetch-and-extract task; a
//! semaphore caps how many run at once, and the dispatch loop acquires a
//! permit *before* spawning, so the loop itself is the backpressure point.
//! Dispatch order is monotonic by offset but completion order is not —
//! rows may land in the output out of offset order, which is accepted:
//! the correctness requirement is row content, not ordering.

pub mod extract;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::{CATALOG_PAGE_STEP, CatalogConfig};
use crate::csv::{CsvSink, SinkHandle};
use crate::error::Result;
use crate::fetch::{Fetch, FetchOutcome, HttpFetcher, PageFetcher};
use crate::types::{CatalogRecord, CsvRecord, UNKNOWN_PLATFORM};

/// Body prefix the index serves both for out-of-range offsets and,
/// unpredictably, for requests that simply failed upstream.
pub(crate) const NO_RESULTS_SENTINEL: &str = "No Results";

/// Run the catalog scrape described by `config`.
///
/// Returns the number of records written. Per-page failures (retry
/// exhaustion, unextractable layout) are logged and skipped; they never
/// abort sibling tasks or the run.
pub async fn run(config: &CatalogConfig) -> Result<u64> {
    config.validate()?;
    let fetcher = PageFetcher::new(HttpFetcher::new()?, config.fetch.retry_bound)
        .with_error_sentinel(NO_RESULTS_SENTINEL);
    run_with(config, Arc::new(fetcher)).await
}

/// Drive the pipeline with an explicit transport. Test seam for [`run`].
pub(crate) async fn run_with<F>(
    config: &CatalogConfig,
    fetcher: Arc<PageFetcher<F>>,
) -> Result<u64>
where
    F: Fetch + 'static,
{
    let sink = match &config.output {
        Some(path) => Some(CsvSink::create(path, CatalogRecord::header()).await?),
        None => None,
    };
    let workers = Arc::new(Semaphore::new(config.max_workers));
    let written = Arc::new(AtomicU64::new(0));
    let mut tasks = Vec::new();

    let mut offset = config.start;
    while offset <= config.end {
        // Acquire a permit before spawning (blocks while the pool is saturated).
        let permit = match workers.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break, // semaphore closed, stop dispatching
        };
        let url = page_url(config, offset)?;
        tracing::debug!(url = %url, offset, "dispatching catalog page");

        let fetcher = Arc::clone(&fetcher);
        let handle = sink.as_ref().map(CsvSink::handle);
        let written = Arc::clone(&written);
        let scores_only = config.scores_only;
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            scrape_page(&fetcher, &url, scores_only, handle, &written).await;
        }));

        offset += CATALOG_PAGE_STEP;
    }

    // Join-all barrier: the run completes only once every dispatched page
    // has finished, successfully or not.
    for joined in join_all(tasks).await {
        if let Err(error) = joined {
            tracing::error!(error = %error, "catalog worker panicked");
        }
    }

    if let Some(sink) = sink {
        sink.close().await?;
    }
    Ok(written.load(Ordering::Relaxed))
}

/// Fetch one page, extract its records, and push them to the sink.
///
/// Everything here is page-local: failures are logged, never propagated.
async fn scrape_page<F: Fetch>(
    fetcher: &PageFetcher<F>,
    url: &Url,
    scores_only: bool,
    sink: Option<SinkHandle>,
    written: &AtomicU64,
) {
    let FetchOutcome::Success(body) = fetcher.fetch(url.as_str()).await else {
        return;
    };
    match extract::extract(&body, scores_only) {
        Ok(records) => {
            for record in records {
                if let Some(sink) = &sink {
                    if let Err(error) = sink.write(&record).await {
                        tracing::error!(url = %url, error = %error, "failed to write record");
                        continue;
                    }
                }
                tracing::info!(
                    title = %record.title,
                    link = %record.link,
                    platform = %record.platform.as_deref().unwrap_or(UNKNOWN_PLATFORM),
                    score = %record.score,
                    date = %record.date,
                    "game"
                );
                written.fetch_add(1, Ordering::Relaxed);
            }
        }
        Err(error) => {
            tracing::warn!(url = %url, error = %error, "skipping page with unextractable layout");
        }
    }
}

fn page_url(config: &CatalogConfig, offset: u64) -> Result<Url> {
    Ok(Url::parse_with_params(
        &config.base_url,
        [("startIndex", offset.to_string())],
    )?)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Concurrency gauge shared between a [`Gauged`] transport and the test
    /// asserting on it.
    #[derive(Default)]
    struct Gauge {
        in_flight: AtomicUsize,
        high_water: AtomicUsize,
    }

    /// Transport that serves the same page body everywhere while tracking
    /// how many requests are in flight simultaneously.
    struct Gauged {
        body: std::result::Result<String, ()>,
        gauge: Arc<Gauge>,
    }

    impl Gauged {
        fn serving(body: &str) -> (Self, Arc<Gauge>) {
            let gauge = Arc::new(Gauge::default());
            (
                Self {
                    body: Ok(body.to_owned()),
                    gauge: gauge.clone(),
                },
                gauge,
            )
        }

        fn failing() -> Self {
            Self {
                body: Err(()),
                gauge: Arc::new(Gauge::default()),
            }
        }
    }

    #[async_trait]
    impl Fetch for Gauged {
        async fn get_text(&self, _url: &str) -> crate::error::Result<String> {
            let now = self.gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.high_water.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.body.clone().map_err(|()| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "scripted failure",
                ))
            })
        }
    }

    const ONE_GAME_PAGE: &str = concat!(
        "<html><body>",
        "<div class=\"item-title\"><a href=\"/games/portal\">Portal</a>",
        "<span class=\"item-platform\">PC</span></div>",
        "<div class=\"publisher grid_3\">Valve</div>",
        "<div class=\"grid_3\">9.4</div>",
        "<div class=\"releaseDate grid_3 omega\">Oct 10, 2007</div>",
        "</body></html>"
    );

    fn config(start: u64, end: u64, workers: usize) -> CatalogConfig {
        CatalogConfig {
            start,
            end,
            verbose: true,
            max_workers: workers,
            base_url: "http://catalog.test/games/all-ajax".into(),
            ..CatalogConfig::default()
        }
    }

    #[tokio::test]
    async fn in_flight_fetches_never_exceed_the_worker_bound() {
        let (transport, gauge) = Gauged::serving(ONE_GAME_PAGE);
        let fetcher = Arc::new(PageFetcher::new(transport, 5));

        // 20 pages, 3 workers.
        let written = run_with(&config(0, 950, 3), fetcher).await.unwrap();

        assert_eq!(written, 20);
        let seen = gauge.high_water.load(Ordering::SeqCst);
        assert!(seen <= 3, "saw {seen} concurrent fetches with a bound of 3");
        assert!(seen >= 2, "pool was never actually concurrent");
    }

    #[tokio::test]
    async fn record_count_matches_pages_regardless_of_completion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let (transport, _gauge) = Gauged::serving(ONE_GAME_PAGE);
        let fetcher = Arc::new(PageFetcher::new(transport, 5));
        let mut cfg = config(0, 450, 8);
        cfg.output = Some(path.clone());

        let written = run_with(&cfg, fetcher).await.unwrap();

        assert_eq!(written, 10);
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 11, "one header plus one line per page");
        assert_eq!(lines[0], "title,link,platform,publisher,score,date");
        assert!(lines[1..].iter().all(|l| l.contains("\"Portal\"")));
    }

    #[tokio::test]
    async fn exhausted_pages_do_not_abort_the_run() {
        let fetcher = Arc::new(PageFetcher::new(Gauged::failing(), 2));

        let written = run_with(&config(0, 100, 4), fetcher).await.unwrap();

        assert_eq!(written, 0, "every page exhausted, run still completed");
    }

    #[tokio::test]
    async fn single_worker_still_covers_every_offset() {
        let (transport, gauge) = Gauged::serving(ONE_GAME_PAGE);
        let fetcher = Arc::new(PageFetcher::new(transport, 5));
        let written = run_with(&config(0, 200, 1), fetcher).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(gauge.high_water.load(Ordering::SeqCst), 1);
    }
}
