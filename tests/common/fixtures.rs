//! Page-body builders for the mock upstream servers.

/// A review API page: `total` drives probe discovery, `entries` become the
/// `results` array (pass raw JSON objects).
pub fn review_page(total: u64, entries: &[&str]) -> String {
    format!(
        r#"{{"number_of_total_results": {total}, "results": [{}]}}"#,
        entries.join(",")
    )
}

/// One review entry with the six extracted fields populated.
pub fn review_entry(title: &str, deck: &str, score: &str) -> String {
    format!(
        r#"{{"game": {{"name": "{title}"}}, "deck": "{deck}",
            "publish_date": "2013-08-22 10:00:00", "reviewer": "staff",
            "score": {score}, "site_detail_url": "https://reviews.test/{title}"}}"#
    )
}

/// One catalog index entry in the site's markup. `platform: None` omits the
/// platform span entirely.
pub fn catalog_entry(
    title: &str,
    platform: Option<&str>,
    publisher: &str,
    score: &str,
    date: &str,
) -> String {
    let platform_span = platform
        .map(|p| format!("<span class=\"item-platform\">{p}</span>"))
        .unwrap_or_default();
    format!(
        concat!(
            "<div class=\"clear itemList-itemShort\">",
            "<div class=\"item-title\">",
            "<a href=\"/games/{slug}\">{title}</a>",
            "{platform}",
            "</div>",
            "<div class=\"publisher grid_3\">{publisher}</div>",
            "<div class=\"grid_3\">{score}</div>",
            "<div class=\"releaseDate grid_3 omega\">{date}</div>",
            "</div>"
        ),
        slug = title.to_lowercase().replace(' ', "-"),
        title = title,
        platform = platform_span,
        publisher = publisher,
        score = score,
        date = date,
    )
}

/// A full catalog index page wrapping the given entries.
pub fn catalog_page(entries: &[String]) -> String {
    format!("<html><body>{}</body></html>", entries.join("\n"))
}
