//! HTML-backed browsing session
//!
//! Implements `BrowserSession` over a parsed `scraper::Html` document. Pages
//! come from http(s) via ureq or from disk. There is no script engine, so
//! clicks and scrolls are accepted as no-ops; collapsed sections are read
//! straight from the markup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::SessionError;
use crate::session::{BrowserSession, ElementHandle, Locator};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Browsing session over static HTML
pub struct StaticSession {
    agent: ureq::Agent,
    document: Option<Html>,
    generation: u64,
}

impl StaticSession {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(timeout_secs)))
                .user_agent(user_agent)
                .build(),
        );

        Self {
            agent,
            document: None,
            generation: 0,
        }
    }

    /// Session with `html` already loaded as the current page
    pub fn from_html(html: &str) -> Self {
        let mut session = Self::default();
        session.load_html(html);
        session
    }

    /// Replace the current page with `html`.
    pub fn load_html(&mut self, html: &str) {
        self.document = Some(Html::parse_document(html));
        self.generation += 1;
    }

    fn fetch(&self, url: &str) -> Result<String, String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self.agent.get(url).call().map_err(|e| e.to_string())?;
            if !response.status().is_success() {
                return Err(format!("HTTP {}", response.status()));
            }
            return response
                .into_body()
                .read_to_string()
                .map_err(|e| e.to_string());
        }

        let path = local_path(url)?;
        std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))
    }

    fn document(&self) -> Result<&Html, SessionError> {
        self.document
            .as_ref()
            .ok_or_else(|| SessionError::Other("no page loaded".to_string()))
    }

    fn resolve(&self, handle: &ElementHandle) -> Result<ElementRef<'_>, SessionError> {
        let document = self.document()?;
        if handle.generation() != self.generation {
            return Err(SessionError::Stale(format!(
                "element {} belongs to an earlier page",
                handle.id()
            )));
        }

        elements(document)
            .nth(handle.id())
            .ok_or_else(|| SessionError::Stale(format!("element {} no longer exists", handle.id())))
    }

    fn handle_of(&self, document: &Html, element: ElementRef<'_>) -> Option<ElementHandle> {
        elements(document)
            .position(|candidate| candidate.id() == element.id())
            .map(|id| ElementHandle::new(self.generation, id))
    }
}

impl Default for StaticSession {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, 30)
    }
}

impl BrowserSession for StaticSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let html = self.fetch(url).map_err(|reason| SessionError::Navigation {
            url: url.to_string(),
            reason,
        })?;
        self.load_html(&html);
        debug!(url, generation = self.generation, "page loaded");
        Ok(())
    }

    fn find_all(
        &mut self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError> {
        let selector = Selector::parse(locator.selector())
            .map_err(|e| SessionError::Other(format!("invalid selector {locator}: {e}")))?;
        let scope = scope.map(|handle| self.resolve(handle)).transpose()?;
        let document = self.document()?;

        let handles = elements(document)
            .enumerate()
            .filter(|(_, element)| selector.matches(element))
            .filter(|(_, element)| match scope {
                Some(root) => element.ancestors().any(|ancestor| ancestor.id() == root.id()),
                None => true,
            })
            .filter(|(_, element)| match locator {
                Locator::TextContains { needle, .. } => text_of(*element).contains(needle.as_str()),
                Locator::Css(_) => true,
            })
            .map(|(id, _)| ElementHandle::new(self.generation, id))
            .collect();

        Ok(handles)
    }

    fn next_sibling(
        &mut self,
        element: &ElementHandle,
        tag: &str,
    ) -> Result<ElementHandle, SessionError> {
        let origin = self.resolve(element)?;
        let sibling = origin
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name().eq_ignore_ascii_case(tag))
            .ok_or_else(|| {
                SessionError::NotFound(format!("<{tag}> after element {}", element.id()))
            })?;

        let document = self.document()?;
        self.handle_of(document, sibling)
            .ok_or_else(|| SessionError::Stale(format!("sibling of element {}", element.id())))
    }

    fn scroll_into_view(&mut self, element: &ElementHandle) -> Result<(), SessionError> {
        self.resolve(element).map(|_| ())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), SessionError> {
        self.resolve(element).map(|_| ())
    }

    fn text(&mut self, element: &ElementHandle) -> Result<String, SessionError> {
        self.resolve(element).map(text_of)
    }

    fn page_ready(&mut self) -> bool {
        self.document.is_some()
    }

    fn is_displayed(&mut self, element: &ElementHandle) -> bool {
        self.resolve(element).is_ok()
    }
}

/// Every element of the document in document order; positions are handle ids.
fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

/// Descendant text with whitespace collapsed, as a browser renders it
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn local_path(url: &str) -> Result<PathBuf, String> {
    if url.starts_with("file://") {
        let parsed = url::Url::parse(url).map_err(|e| e.to_string())?;
        return parsed
            .to_file_path()
            .map_err(|_| format!("not a local file URL: {url}"));
    }
    Ok(Path::new(url).to_path_buf())
}
