//! Search-result page parsing
//!
//! Turns saved search-result pages into flat listing records, one per ad.

use std::path::Path;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, warn};

use crate::record::ListingRecord;

/// Columns produced by [`parse_search_page`], in output order
pub const SEARCH_COLUMNS: [&str; 8] = [
    "link",
    "price",
    "year",
    "mileage",
    "title",
    "fuel_type",
    "gearbox",
    "isPrivateSeller",
];

/// Detail labels (lower-cased) and the column each one fills
const DETAIL_LABELS: [(&str, &str); 4] = [
    ("przebieg", "mileage"),
    ("rodzaj paliwa", "fuel_type"),
    ("skrzynia biegów", "gearbox"),
    ("rok produkcji", "year"),
];

const PRIVATE_SELLER_MARKER: &str = "1-wł";

/// Extract one record per `article > section` ad block
pub fn parse_search_page(html: &str) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("article > section") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let records: Vec<ListingRecord> = document
        .select(&selector)
        .enumerate()
        .map(|(idx, section)| parse_ad(idx + 1, section))
        .collect();

    debug!(ads = records.len(), "parsed search page");
    records
}

/// Parse every file in `paths`; missing or unreadable files are skipped.
pub fn parse_search_files<P: AsRef<Path>>(paths: &[P]) -> Vec<ListingRecord> {
    let mut records = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let html = match std::fs::read_to_string(path) {
            Ok(html) => html,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        info!(file = %path.display(), "processing file");
        records.extend(parse_search_page(&html));
    }

    if records.is_empty() {
        error!("no ad data was extracted, check the HTML structure and selectors");
    } else {
        info!(ads = records.len(), "extracted ads");
    }

    records
}

fn parse_ad(idx: usize, section: ElementRef<'_>) -> ListingRecord {
    // Title and link come from the first <h2> that holds an <a>
    let anchor = first(section, "h2").and_then(|h2| first(h2, "a"));
    let title = anchor.map(text_of).unwrap_or_default();
    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let price = first(section, "h3").map(text_of).unwrap_or_default();
    debug!(section = idx, %price, "parsed price");

    let details = parse_details(idx, section);
    let detail = |column: &str| {
        DETAIL_LABELS
            .iter()
            .find(|(_, c)| *c == column)
            .and_then(|(label, _)| details.iter().find(|(l, _)| l == label))
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    };

    let is_private = all(section, "p")
        .any(|p| p.text().collect::<String>().contains(PRIVATE_SELLER_MARKER));

    ListingRecord::from_pairs([
        ("link", link),
        ("price", price),
        ("year", detail("year")),
        ("mileage", detail("mileage")),
        ("title", title),
        ("fuel_type", detail("fuel_type")),
        ("gearbox", detail("gearbox")),
        ("isPrivateSeller", (if is_private { "True" } else { "False" }).to_string()),
    ])
}

/// (lower-cased label, value) pairs from the ad's first `<dl>`
fn parse_details(idx: usize, section: ElementRef<'_>) -> Vec<(String, String)> {
    let Some(dl) = first(section, "dl") else {
        debug!(section = idx, "no <dl> element found for details");
        return vec![];
    };

    all(dl, "dt")
        .filter_map(|dt| {
            let dd = dt
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "dd")?;
            Some((text_of(dt).to_lowercase(), text_of(dd)))
        })
        .collect()
}

fn first<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    all(element, selector).next()
}

fn all<'a>(element: ElementRef<'a>, selector: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let selector = Selector::parse(selector).ok();
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| selector.as_ref().is_some_and(|s| s.matches(el)))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
