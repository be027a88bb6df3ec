//! Field extraction from the live page
//!
//! A lookup either matches an element by an identifying attribute, or finds a
//! label by its text and reads the sibling that follows it. Lookups never
//! fail: anything missing, ambiguous or broken yields an empty string.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::session::{BrowserSession, ElementHandle, Locator};

/// Strategy for finding one value on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Lookup {
    /// Single element whose `attribute` equals `key`, e.g. `div[data-testid='color']`
    Keyed {
        #[serde(default)]
        tag: Option<String>,
        attribute: String,
        key: String,
    },
    /// Element matching `label_css` whose text contains `needle`; the value is
    /// the text of its next sibling with the same tag
    LabelAdjacent { label_css: String, needle: String },
}

impl Lookup {
    pub fn keyed(tag: Option<&str>, attribute: &str, key: &str) -> Self {
        Lookup::Keyed {
            tag: tag.map(String::from),
            attribute: attribute.to_string(),
            key: key.to_string(),
        }
    }

    pub fn label_adjacent(label_css: &str, needle: &str) -> Self {
        Lookup::LabelAdjacent {
            label_css: label_css.to_string(),
            needle: needle.to_string(),
        }
    }
}

/// Output column plus how to find its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldQuery {
    pub column: String,
    #[serde(flatten)]
    pub lookup: Lookup,
}

impl FieldQuery {
    pub fn new(column: &str, lookup: Lookup) -> Self {
        Self {
            column: column.to_string(),
            lookup,
        }
    }
}

/// Extract the value for `lookup`, or "" when it cannot be found.
pub fn extract_field<S>(session: &mut S, scope: Option<&ElementHandle>, lookup: &Lookup) -> String
where
    S: BrowserSession + ?Sized,
{
    let result = match lookup {
        Lookup::Keyed {
            tag,
            attribute,
            key,
        } => extract_keyed(session, scope, tag.as_deref(), attribute, key),
        Lookup::LabelAdjacent { label_css, needle } => {
            extract_label_adjacent(session, scope, label_css, needle)
        }
    };

    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(?lookup, error = %e, "field not extracted");
            String::new()
        }
    }
}

fn extract_keyed<S>(
    session: &mut S,
    scope: Option<&ElementHandle>,
    tag: Option<&str>,
    attribute: &str,
    key: &str,
) -> Result<String, SessionError>
where
    S: BrowserSession + ?Sized,
{
    let selector = keyed_selector(tag, attribute, key);
    let matches = session.find_all(scope, &Locator::Css(selector.clone()))?;

    match matches.as_slice() {
        [element] => session.text(element),
        [] => Err(SessionError::NotFound(selector)),
        many => Err(SessionError::Other(format!(
            "{} elements match {selector}",
            many.len()
        ))),
    }
}

fn extract_label_adjacent<S>(
    session: &mut S,
    scope: Option<&ElementHandle>,
    label_css: &str,
    needle: &str,
) -> Result<String, SessionError>
where
    S: BrowserSession + ?Sized,
{
    let label = session.find(scope, &Locator::text_contains(label_css, needle))?;
    let tag = tag_name(label_css);
    let value = session.next_sibling(&label, tag)?;
    session.text(&value)
}

/// CSS selector for an exact attribute match
pub fn keyed_selector(tag: Option<&str>, attribute: &str, key: &str) -> String {
    let escaped = key.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{}[{attribute}='{escaped}']", tag.unwrap_or(""))
}

/// Tag name a simple label selector targets ("p" for "p", "p.label", "div > p")
fn tag_name(css: &str) -> &str {
    let last = css.rsplit([' ', '>']).next().unwrap_or(css);
    let end = last
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(last.len());
    &last[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_session::StaticSession;

    const AD_PAGE: &str = r#"
    <html>
    <body>
        <div data-testid="color"><p>Kolor</p><p> Czarny </p></div>
        <div data-testid="version">  2.0 TDI  </div>
        <div data-testid="no_accident">Tak</div>
        <div data-testid="no_accident">Nie</div>
        <h2>Najważniejsze</h2>
        <div class="highlights">
            <p>Typ nadwozia</p><p>Kombi</p>
            <p>Pojemność skokowa</p><span>ignored</span><p> 1 968 cm3 </p>
            <p>Moc</p>
        </div>
    </body>
    </html>
    "#;

    fn testid(key: &str) -> Lookup {
        Lookup::keyed(Some("div"), "data-testid", key)
    }

    #[test]
    fn test_keyed_lookup() {
        let mut session = StaticSession::from_html(AD_PAGE);

        let version = extract_field(&mut session, None, &testid("version"));
        assert_eq!(version, "2.0 TDI");

        let color = extract_field(&mut session, None, &testid("color"));
        assert_eq!(color, "Kolor Czarny");
    }

    #[test]
    fn test_keyed_lookup_absent_or_ambiguous_is_empty() {
        let mut session = StaticSession::from_html(AD_PAGE);

        let untagged = Lookup::keyed(None, "data-testid", "transmission");
        assert_eq!(extract_field(&mut session, None, &untagged), "");

        let ambiguous = extract_field(&mut session, None, &testid("no_accident"));
        assert_eq!(ambiguous, "");
    }

    #[test]
    fn test_label_adjacent_lookup() {
        let mut session = StaticSession::from_html(AD_PAGE);

        let body_type = Lookup::label_adjacent("p", "Typ nadwozia");
        assert_eq!(extract_field(&mut session, None, &body_type), "Kombi");

        // Skips the span, takes the next <p>
        let capacity = Lookup::label_adjacent("p", "Pojemność skokowa");
        assert_eq!(extract_field(&mut session, None, &capacity), "1 968 cm3");
    }

    #[test]
    fn test_label_adjacent_missing_label_or_sibling() {
        let mut session = StaticSession::from_html(AD_PAGE);

        // Label present but nothing follows it
        let power = Lookup::label_adjacent("p", "Moc");
        assert_eq!(extract_field(&mut session, None, &power), "");

        // Case and diacritics matter
        let lower = Lookup::label_adjacent("p", "pojemnosc skokowa");
        assert_eq!(extract_field(&mut session, None, &lower), "");
    }

    #[test]
    fn test_lookup_is_scoped() {
        let mut session = StaticSession::from_html(AD_PAGE);
        let container = session
            .find(None, &Locator::css("div.highlights"))
            .unwrap();

        let outside = extract_field(&mut session, Some(&container), &testid("version"));
        assert_eq!(outside, "");

        let body_type = Lookup::label_adjacent("p", "Typ nadwozia");
        let inside = extract_field(&mut session, Some(&container), &body_type);
        assert_eq!(inside, "Kombi");
    }

    #[test]
    fn test_field_query_from_json() {
        let json = r#"{
            "column": "Color",
            "strategy": "keyed",
            "tag": "div",
            "attribute": "data-testid",
            "key": "color"
        }"#;
        let query: FieldQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.column, "Color");
        assert_eq!(query.lookup, testid("color"));
    }

    #[test]
    fn test_selector_helpers() {
        assert_eq!(
            keyed_selector(Some("div"), "data-testid", "color"),
            "div[data-testid='color']"
        );
        assert_eq!(keyed_selector(None, "id", "it's"), "[id='it\\'s']");
        assert_eq!(tag_name("p"), "p");
        assert_eq!(tag_name("div > p.label"), "p");
    }
}
