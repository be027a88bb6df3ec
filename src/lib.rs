//! Listing enricher
//!
//! Collects vehicle ads from saved search-result pages and enriches each ad
//! with fields from its detail page:
//! - Search-page parsing into flat records
//! - Link deduplication and CSV tables
//! - Accordion traversal with per-section field extraction
//! - Highlights block extraction
//!
//! Browsing goes through the [`BrowserSession`] trait; [`StaticSession`] is
//! the bundled implementation over fetched or saved HTML.

pub mod accordion;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod listing;
pub mod record;
pub mod session;
pub mod static_session;
pub mod table;
pub mod wait;

pub use accordion::{click_with_retry, AccordionDriver, SweepOutcome};
pub use config::{EnrichConfig, HighlightsConfig};
pub use enrich::{enrich, enrich_row, BatchStatus, EnrichOutcome, RowStatus};
pub use error::{EnrichError, Result, SessionError};
pub use extract::{extract_field, FieldQuery, Lookup};
pub use listing::{parse_search_files, parse_search_page};
pub use record::{merge, ListingRecord};
pub use session::{BrowserSession, ElementHandle, Locator};
pub use static_session::StaticSession;
pub use table::{dedupe_by_link, read_csv, write_csv};
pub use wait::WaitPolicy;
