//! Enrichment configuration
//!
//! Defaults target the ad detail page layout (Polish labels). Every field
//! can be overridden from a JSON file; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;
use crate::extract::{keyed_selector, FieldQuery, Lookup};
use crate::record;
use crate::static_session::DEFAULT_USER_AGENT;
use crate::wait::WaitPolicy;

/// Fields read from the "highlights" block below a marker heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightsConfig {
    pub heading_css: String,
    /// Text the heading must contain
    pub heading_marker: String,
    /// Tag of the heading's sibling that holds the labels
    pub container_tag: String,
    pub fields: Vec<FieldQuery>,
}

impl Default for HighlightsConfig {
    fn default() -> Self {
        let label = |column: &str, needle: &str| {
            FieldQuery::new(column, Lookup::label_adjacent("p", needle))
        };

        Self {
            heading_css: "h2".to_string(),
            heading_marker: "Najważniejsze".to_string(),
            container_tag: "div".to_string(),
            fields: vec![
                label(record::BODY_TYPE, "Typ nadwozia"),
                label(record::CAPACITY, "Pojemność skokowa"),
                label(record::POWER, "Moc"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Headers of the collapsible detail sections
    pub accordion_css: String,
    /// Cookie consent button, clicked once per page if present
    pub consent_css: String,
    /// Queries run after each section opens
    pub section_fields: Vec<FieldQuery>,
    pub highlights: HighlightsConfig,
    pub click_attempts: usize,
    /// Pause between retries of an intercepted click
    pub retry_pause_ms: u64,
    pub page_settle: WaitPolicy,
    pub consent_settle: WaitPolicy,
    pub scroll_settle: WaitPolicy,
    pub open_settle: WaitPolicy,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        let keyed = |column: &str, key: &str| {
            FieldQuery::new(column, Lookup::keyed(Some("div"), "data-testid", key))
        };

        Self {
            accordion_css: "div[data-testid=collapsible-groups-wrapper] > div > div > header".to_string(),
            consent_css: "#onetrust-accept-btn-handler".to_string(),
            section_fields: vec![
                keyed(record::VERSION, "version"),
                keyed(record::COLOR, "color"),
                keyed(record::TRANSMISSION, "transmission"),
                keyed(record::COUNTRY, "country_origin"),
                keyed(record::ORIGINAL_OWNER, "original_owner"),
                keyed(record::NO_ACCIDENT, "no_accident"),
            ],
            highlights: HighlightsConfig::default(),
            click_attempts: 3,
            retry_pause_ms: 1000,
            page_settle: WaitPolicy::new(250, 2000, 10_000),
            consent_settle: WaitPolicy::new(100, 500, 1000),
            scroll_settle: WaitPolicy::new(100, 250, 500),
            open_settle: WaitPolicy::new(100, 500, 1000),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl EnrichConfig {
    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check that every selector in the config parses.
    pub fn validate(&self) -> crate::Result<()> {
        let mut selectors = vec![
            self.accordion_css.clone(),
            self.consent_css.clone(),
            self.highlights.heading_css.clone(),
        ];
        for query in self.section_fields.iter().chain(&self.highlights.fields) {
            selectors.push(match &query.lookup {
                Lookup::Keyed {
                    tag,
                    attribute,
                    key,
                } => keyed_selector(tag.as_deref(), attribute, key),
                Lookup::LabelAdjacent { label_css, .. } => label_css.clone(),
            });
        }

        for css in selectors {
            if let Err(e) = scraper::Selector::parse(&css) {
                return Err(EnrichError::Selector(format!("{css}: {e}")));
            }
        }
        Ok(())
    }

    /// Same config with every wait and retry pause set to zero
    pub fn without_waits(mut self) -> Self {
        self.retry_pause_ms = 0;
        self.page_settle = WaitPolicy::immediate();
        self.consent_settle = WaitPolicy::immediate();
        self.scroll_settle = WaitPolicy::immediate();
        self.open_settle = WaitPolicy::immediate();
        self
    }

    /// Columns this config fills, section fields first
    pub fn enrichment_columns(&self) -> Vec<&str> {
        self.section_fields
            .iter()
            .chain(&self.highlights.fields)
            .map(|query| query.column.as_str())
            .collect()
    }
}
