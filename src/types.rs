//! Core record types for game-scrape
//!
//! Every textual field in a record holds either the extracted value or a
//! documented default — extraction never propagates a per-field failure, so
//! downstream serialization can rely on these shapes unconditionally.

/// Score string the catalog site serves for games without a rating.
pub const NOT_RATED: &str = "NR";

/// Score emitted for not-rated entries that survive filtering.
pub const NOT_RATED_SCORE: &str = "-1";

/// Placeholder emitted when a catalog entry carries no platform segment.
pub const UNKNOWN_PLATFORM: &str = "<unknown>";

/// How a single value is rendered into a CSV row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CsvField {
    /// Wrapped in double quotes with interior quotes doubled.
    Text(String),
    /// Emitted verbatim (numeric scores and the unknown-platform sentinel).
    Raw(String),
}

/// A row type with a fixed header and field layout.
pub trait CsvRecord {
    /// Header line for this record type.
    fn header() -> &'static str;

    /// Row values in header order.
    fn fields(&self) -> Vec<CsvField>;
}

/// One review pulled from the JSON API.
///
/// All fields default to the empty string when absent or malformed; `score`
/// is the raw scalar rendered to text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewRecord {
    /// Name of the reviewed game
    pub title: String,
    /// Short description ("deck") of the review
    pub deck: String,
    /// Publish date as served by the API
    pub date: String,
    /// Reviewer name
    pub reviewer: String,
    /// Review score; empty when absent
    pub score: String,
    /// Detail URL of the review on the site
    pub url: String,
}

impl CsvRecord for ReviewRecord {
    fn header() -> &'static str {
        "title,deck,date,reviewer,score,url"
    }

    fn fields(&self) -> Vec<CsvField> {
        vec![
            CsvField::Text(self.title.clone()),
            CsvField::Text(self.deck.clone()),
            CsvField::Text(self.date.clone()),
            CsvField::Text(self.reviewer.clone()),
            CsvField::Raw(self.score.clone()),
            CsvField::Text(self.url.clone()),
        ]
    }
}

/// One game pulled from the HTML catalog index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Game title
    pub title: String,
    /// Path to the site's detail page for the game
    pub link: String,
    /// Platform; `None` when the title block has no platform segment
    pub platform: Option<String>,
    /// Publisher name
    pub publisher: String,
    /// Score; [`NOT_RATED_SCORE`] for unrated entries
    pub score: String,
    /// Release date as displayed on the index
    pub date: String,
}

impl CsvRecord for CatalogRecord {
    fn header() -> &'static str {
        "title,link,platform,publisher,score,date"
    }

    fn fields(&self) -> Vec<CsvField> {
        let platform = match &self.platform {
            Some(platform) => CsvField::Text(platform.clone()),
            None => CsvField::Raw(UNKNOWN_PLATFORM.to_owned()),
        };
        vec![
            CsvField::Text(self.title.clone()),
            CsvField::Text(self.link.clone()),
            platform,
            CsvField::Text(self.publisher.clone()),
            CsvField::Raw(self.score.clone()),
            CsvField::Text(self.date.clone()),
        ]
    }
}
