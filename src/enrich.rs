//! Row enrichment
//!
//! Visits each row's link, opens the page's detail sections and merges what
//! they reveal into the row. Every interaction is isolated: a failure leaves
//! the row with fewer fields and the batch moves on.

use tracing::{debug, error, info, info_span, warn};

use crate::accordion::AccordionDriver;
use crate::config::EnrichConfig;
use crate::extract::extract_field;
use crate::record::ListingRecord;
use crate::session::{BrowserSession, Locator};

/// What happened to a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Enriched { sections_opened: usize },
    MissingLink,
    NavigationFailed,
}

/// Overall result of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// There were no rows to begin with
    EmptyInput,
    /// Rows were given but none could be enriched
    NothingEnriched,
    Completed,
}

/// Rows in input order plus per-status counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    pub rows: Vec<ListingRecord>,
    pub enriched: usize,
    pub missing_link: usize,
    pub failed: usize,
}

impl EnrichOutcome {
    pub fn status(&self) -> BatchStatus {
        if self.rows.is_empty() {
            BatchStatus::EmptyInput
        } else if self.enriched == 0 {
            BatchStatus::NothingEnriched
        } else {
            BatchStatus::Completed
        }
    }
}

/// Enrich every row in order using one browsing session.
pub fn enrich<S>(session: &mut S, rows: Vec<ListingRecord>, config: &EnrichConfig) -> EnrichOutcome
where
    S: BrowserSession + ?Sized,
{
    let total = rows.len();
    let driver = AccordionDriver::from_config(config);
    let mut outcome = EnrichOutcome {
        rows: Vec::with_capacity(total),
        ..EnrichOutcome::default()
    };

    for (i, mut row) in rows.into_iter().enumerate() {
        match process_row(session, &mut row, i + 1, total, config, &driver) {
            RowStatus::Enriched { .. } => outcome.enriched += 1,
            RowStatus::MissingLink => outcome.missing_link += 1,
            RowStatus::NavigationFailed => outcome.failed += 1,
        }
        outcome.rows.push(row);
    }

    match outcome.status() {
        BatchStatus::EmptyInput => warn!("no rows to enrich"),
        BatchStatus::NothingEnriched => error!(
            rows = total,
            missing_link = outcome.missing_link,
            failed = outcome.failed,
            "no row could be enriched"
        ),
        BatchStatus::Completed => info!(
            rows = total,
            enriched = outcome.enriched,
            missing_link = outcome.missing_link,
            failed = outcome.failed,
            "enrichment complete"
        ),
    }

    outcome
}

/// Enrich a single row in place.
pub fn enrich_row<S>(session: &mut S, row: &mut ListingRecord, config: &EnrichConfig) -> RowStatus
where
    S: BrowserSession + ?Sized,
{
    let driver = AccordionDriver::from_config(config);
    process_row(session, row, 1, 1, config, &driver)
}

fn process_row<S>(
    session: &mut S,
    row: &mut ListingRecord,
    index: usize,
    total: usize,
    config: &EnrichConfig,
    driver: &AccordionDriver,
) -> RowStatus
where
    S: BrowserSession + ?Sized,
{
    let Some(link) = row.link().map(str::to_string) else {
        warn!(row = index, "no link found, skipping");
        return RowStatus::MissingLink;
    };

    // Everything logged below, including by the driver and extractor,
    // carries the row and its link
    let _span = info_span!("row", row = index, link = %link).entered();

    info!(total, "processing link");
    if let Err(e) = session.navigate(&link) {
        error!(error = %e, "error loading link");
        return RowStatus::NavigationFailed;
    }
    if !config.page_settle.until(|| session.page_ready()) {
        debug!("page not ready before settle timeout");
    }

    dismiss_consent(session, config);

    for column in config.enrichment_columns() {
        row.ensure_column(column);
    }

    // Later sections win for the same column
    let sweep = driver.open_all(session, |session, idx, section| {
        let section_no = idx + 1;
        match session.text(section) {
            Ok(title) => debug!(section = section_no, %title, "opened section"),
            Err(e) => debug!(section = section_no, error = %e, "could not read section title"),
        }

        for query in &config.section_fields {
            let value = extract_field(session, None, &query.lookup);
            if value.is_empty() {
                debug!(section = section_no, column = %query.column, "field not in section");
            } else if row.merge_field(&query.column, &value) {
                debug!(section = section_no, column = %query.column, %value, "field updated");
            }
        }
    });

    extract_highlights(session, row, config);

    RowStatus::Enriched {
        sections_opened: sweep.opened,
    }
}

/// Best-effort click on the cookie consent button.
fn dismiss_consent<S>(session: &mut S, config: &EnrichConfig)
where
    S: BrowserSession + ?Sized,
{
    let locator = Locator::css(config.consent_css.as_str());
    let clicked = session
        .find(None, &locator)
        .and_then(|button| session.click(&button));

    match clicked {
        Ok(()) => {
            info!("clicked cookie accept button");
            config.consent_settle.until(|| session.page_ready());
        }
        Err(e) => debug!(error = %e, "cookie accept button not clicked, continuing"),
    }
}

/// Label/value pairs below the highlights heading. Each lookup stands alone.
fn extract_highlights<S>(session: &mut S, row: &mut ListingRecord, config: &EnrichConfig)
where
    S: BrowserSession + ?Sized,
{
    let highlights = &config.highlights;
    let heading = Locator::text_contains(&highlights.heading_css, &highlights.heading_marker);
    let container = session
        .find(None, &heading)
        .and_then(|heading| session.next_sibling(&heading, &highlights.container_tag));

    let container = match container {
        Ok(container) => container,
        Err(e) => {
            warn!(
                marker = %highlights.heading_marker,
                error = %e,
                "error finding highlights section"
            );
            return;
        }
    };

    for query in &highlights.fields {
        let value = extract_field(session, Some(&container), &query.lookup);
        if value.is_empty() {
            info!(column = %query.column, "field not found");
        }
        row.merge_field(&query.column, &value);
    }
}
