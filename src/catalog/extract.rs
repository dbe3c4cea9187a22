//! Positional extraction for HTML catalog index pages
//!
//! An index page carries two parallel structures: `div.item-title` blocks
//! (title, optional platform, detail link) and `div.grid_3` metadata cells.
//! A metadata cell's class cardinality marks its column — a bare `grid_3`
//! is a score, `publisher grid_3` a publisher, `releaseDate grid_3 omega` a
//! release date. The three metadata lists are zipped with the title blocks
//! by position: index `i` in each list refers to the same game. That
//! alignment is the extraction's core correctness assumption, so the
//! equal-length precondition is checked up front and a mismatch fails the
//! whole page instead of pairing fields from different games.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};
use crate::types::{CatalogRecord, NOT_RATED, NOT_RATED_SCORE};

/// Extract the records from one catalog index page.
///
/// With `scores_only` set, entries the site marks [`NOT_RATED`] are skipped
/// while the positional index still advances; without it they are kept with
/// score [`NOT_RATED_SCORE`].
pub fn extract(body: &str, scores_only: bool) -> Result<Vec<CatalogRecord>> {
    let document = Html::parse_document(body);
    let title_selector = selector("div.item-title")?;
    let metadata_selector = selector("div.grid_3")?;
    let link_selector = selector("a")?;

    let mut scores = Vec::new();
    let mut publishers = Vec::new();
    let mut dates = Vec::new();
    for cell in document.select(&metadata_selector) {
        let value = joined_text(&cell);
        match cell.value().classes().count() {
            1 => scores.push(value),
            2 => publishers.push(value),
            3 => dates.push(value),
            _ => {}
        }
    }

    let titles: Vec<ElementRef<'_>> = document.select(&title_selector).collect();
    if titles.len() != scores.len()
        || titles.len() != publishers.len()
        || titles.len() != dates.len()
    {
        return Err(Error::Extract(format!(
            "misaligned page: {} title blocks, {} scores, {} publishers, {} dates",
            titles.len(),
            scores.len(),
            publishers.len(),
            dates.len()
        )));
    }

    let mut records = Vec::new();
    for (index, block) in titles.iter().enumerate() {
        if scores_only && scores[index] == NOT_RATED {
            continue;
        }
        let mut segments = block
            .text()
            .map(str::trim)
            .filter(|segment| !segment.is_empty());
        let title = segments.next().unwrap_or_default().to_owned();
        // Some games have no platform segment at all; degrade rather than
        // reading past the end of the block.
        let platform = segments.next().map(str::to_owned);
        let link = block
            .select(&link_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .unwrap_or_default()
            .to_owned();
        let score = if scores[index] == NOT_RATED {
            NOT_RATED_SCORE.to_owned()
        } else {
            scores[index].clone()
        };
        records.push(CatalogRecord {
            title,
            link,
            platform,
            publisher: publishers[index].clone(),
            score,
            date: dates[index].clone(),
        });
    }
    Ok(records)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|error| Error::Extract(format!("bad selector {css}: {error}")))
}

fn joined_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
