//! Browsing session abstraction
//!
//! Defines the `BrowserSession` capability the enrichment pipeline drives.
//! Implementations own the page; callers only ever hold opaque
//! `ElementHandle`s, which may go stale whenever the page changes.

use crate::error::SessionError;

/// How to find elements on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Elements matching a CSS selector
    Css(String),
    /// Elements matching `css` whose text contains `needle` (exact substring)
    TextContains { css: String, needle: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text_contains(css: impl Into<String>, needle: impl Into<String>) -> Self {
        Locator::TextContains {
            css: css.into(),
            needle: needle.into(),
        }
    }

    /// The CSS part of the locator
    pub fn selector(&self) -> &str {
        match self {
            Locator::Css(css) => css,
            Locator::TextContains { css, .. } => css,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "{css}"),
            Locator::TextContains { css, needle } => write!(f, "{css} containing '{needle}'"),
        }
    }
}

/// Opaque reference to an element of a specific page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    generation: u64,
    id: usize,
}

impl ElementHandle {
    pub fn new(generation: u64, id: usize) -> Self {
        Self { generation, id }
    }

    /// Page load this handle belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

/// A single browsing context the pipeline drives sequentially.
pub trait BrowserSession {
    /// Load `url`, replacing the current page.
    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// All elements matching `locator`, in document order, optionally
    /// restricted to descendants of `scope`.
    fn find_all(
        &mut self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, SessionError>;

    /// First element matching `locator`.
    fn find(
        &mut self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<ElementHandle, SessionError> {
        self.find_all(scope, locator)?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::NotFound(locator.to_string()))
    }

    /// First following sibling of `element` with tag name `tag`.
    fn next_sibling(
        &mut self,
        element: &ElementHandle,
        tag: &str,
    ) -> Result<ElementHandle, SessionError>;

    /// Scroll `element` to the centre of the viewport.
    fn scroll_into_view(&mut self, element: &ElementHandle) -> Result<(), SessionError>;

    /// Activate `element`. Obstruction must be reported as
    /// `SessionError::Intercepted`, a replaced node as `SessionError::Stale`.
    fn click(&mut self, element: &ElementHandle) -> Result<(), SessionError>;

    /// Rendered text of `element`, trimmed.
    fn text(&mut self, element: &ElementHandle) -> Result<String, SessionError>;

    /// Whether the current page has finished loading.
    fn page_ready(&mut self) -> bool {
        true
    }

    /// Whether `element` is currently rendered and visible.
    fn is_displayed(&mut self, _element: &ElementHandle) -> bool {
        true
    }
}
