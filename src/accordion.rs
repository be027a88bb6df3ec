//! Accordion traversal
//!
//! Collapsible sections are rendered client-side and their subtree is often
//! replaced when one opens, so handles are never kept across an interaction.
//! The driver walks sections by position and re-enumerates before every step.

use tracing::{debug, info, warn};

use crate::config::EnrichConfig;
use crate::error::SessionError;
use crate::session::{BrowserSession, ElementHandle, Locator};
use crate::wait::{pause, WaitPolicy};

/// Counts from one pass over a page's sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Sections present in the first enumeration
    pub discovered: usize,
    /// Positions that still resolved to a section when reached
    pub processed: usize,
    /// Sections that opened and were handed to the callback
    pub opened: usize,
}

/// Opens every section matched by `locator`, one at a time
#[derive(Debug, Clone)]
pub struct AccordionDriver {
    pub locator: Locator,
    pub click_attempts: usize,
    pub retry_pause_ms: u64,
    pub scroll_settle: WaitPolicy,
    pub open_settle: WaitPolicy,
}

impl AccordionDriver {
    pub fn from_config(config: &EnrichConfig) -> Self {
        Self {
            locator: Locator::css(config.accordion_css.as_str()),
            click_attempts: config.click_attempts,
            retry_pause_ms: config.retry_pause_ms,
            scroll_settle: config.scroll_settle,
            open_settle: config.open_settle,
        }
    }

    /// Open each section in page order and call `on_opened` right after it
    /// opens. Sections that cannot be opened are skipped; a set that shrinks
    /// mid-pass ends the pass.
    pub fn open_all<S, F>(&self, session: &mut S, mut on_opened: F) -> SweepOutcome
    where
        S: BrowserSession + ?Sized,
        F: FnMut(&mut S, usize, &ElementHandle),
    {
        let discovered = match session.find_all(None, &self.locator) {
            Ok(sections) => sections.len(),
            Err(e) => {
                warn!(locator = %self.locator, error = %e, "could not enumerate sections");
                0
            }
        };
        info!(sections = discovered, "found accordion toggles");

        let mut outcome = SweepOutcome {
            discovered,
            ..SweepOutcome::default()
        };

        for idx in 0..discovered {
            let section = match self.resolve(session, idx) {
                Ok(Some(section)) => section,
                Ok(None) => {
                    info!(section = idx + 1, "no more accordion toggles available");
                    break;
                }
                Err(e) => {
                    warn!(section = idx + 1, error = %e, "could not re-enumerate sections");
                    continue;
                }
            };
            outcome.processed += 1;

            if let Err(e) = session.scroll_into_view(&section) {
                debug!(section = idx + 1, error = %e, "scroll failed");
            }
            if !self.scroll_settle.until(|| session.is_displayed(&section)) {
                debug!(section = idx + 1, "section not displayed after scroll");
            }

            let opened = click_with_retry(
                session,
                section,
                self.click_attempts,
                self.retry_pause_ms,
                |session| self.resolve(session, idx).ok().flatten(),
            );
            let Some(opened) = opened else {
                warn!(section = idx + 1, "skipping section that would not open");
                continue;
            };
            info!(section = idx + 1, "clicked accordion toggle");

            if !self.open_settle.until(|| session.page_ready()) {
                debug!(section = idx + 1, "page not ready after opening section");
            }
            on_opened(session, idx, &opened);
            outcome.opened += 1;
        }

        outcome
    }

    /// Fresh handle for the section at `idx`, or None when the set shrank.
    fn resolve<S>(&self, session: &mut S, idx: usize) -> Result<Option<ElementHandle>, SessionError>
    where
        S: BrowserSession + ?Sized,
    {
        let mut sections = session.find_all(None, &self.locator)?;
        if idx < sections.len() {
            Ok(Some(sections.swap_remove(idx)))
        } else {
            Ok(None)
        }
    }
}

/// Click `element`, retrying up to `attempts` times.
///
/// An intercepted click waits `retry_pause_ms` and retries the same handle. A
/// stale handle is swapped for whatever `reresolve` returns. Any other error
/// gives up. Returns the handle that was clicked.
pub fn click_with_retry<S, R>(
    session: &mut S,
    element: ElementHandle,
    attempts: usize,
    retry_pause_ms: u64,
    mut reresolve: R,
) -> Option<ElementHandle>
where
    S: BrowserSession + ?Sized,
    R: FnMut(&mut S) -> Option<ElementHandle>,
{
    let mut element = element;

    for attempt in 1..=attempts {
        match session.click(&element) {
            Ok(()) => return Some(element),
            Err(e) if e.is_intercepted() => {
                debug!(attempt, error = %e, "click intercepted, retrying");
                pause(retry_pause_ms);
            }
            Err(e) if e.is_stale() => {
                debug!(attempt, error = %e, "element went stale, retrying lookup");
                match reresolve(session) {
                    Some(fresh) => element = fresh,
                    None => {
                        debug!(attempt, "element disappeared after going stale");
                        return None;
                    }
                }
            }
            Err(e) => {
                warn!(attempt, error = %e, "error clicking element");
                return None;
            }
        }
    }

    debug!(attempts, "click attempts exhausted");
    None
}
