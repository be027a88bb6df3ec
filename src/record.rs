//! Listing records and the merge rule
//!
//! A record is one ad, keyed by its `link`. Columns keep the order in which
//! they were first set so the output table stays aligned with the input.

pub const LINK: &str = "link";

pub const VERSION: &str = "Version";
pub const COLOR: &str = "Color";
pub const TRANSMISSION: &str = "Transmission";
pub const COUNTRY: &str = "Country";
pub const ORIGINAL_OWNER: &str = "Original_owner";
pub const NO_ACCIDENT: &str = "No_accident";
pub const BODY_TYPE: &str = "Type";
pub const CAPACITY: &str = "Capacity";
pub const POWER: &str = "Power";

/// One row of ad data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRecord {
    fields: Vec<(String, String)>,
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(link: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.set(LINK, link);
        record
    }

    /// Build a record from (column, value) pairs; a repeated column keeps its
    /// first position and takes the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.set(column, value);
        }
        record
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `column`, or "" when the column is absent
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Add `column` with an empty value unless it already exists.
    pub fn ensure_column(&mut self, column: &str) {
        if self.get(column).is_none() {
            self.fields.push((column.to_string(), String::new()));
        }
    }

    /// The record's link, if present and non-empty
    pub fn link(&self) -> Option<&str> {
        self.get(LINK).filter(|link| !link.is_empty())
    }

    /// Merge an extracted value into the row.
    ///
    /// Non-empty values overwrite, empty values are ignored. Returns true when
    /// the stored value changed.
    pub fn merge_field(&mut self, column: &str, value: &str) -> bool {
        if value.is_empty() || self.get(column) == Some(value) {
            return false;
        }
        self.set(column, value);
        true
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Pure form of [`ListingRecord::merge_field`]
pub fn merge(mut row: ListingRecord, column: &str, value: &str) -> ListingRecord {
    row.merge_field(column, value);
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge(ListingRecord::with_link("http://x/ad/1"), COLOR, "red");
        let twice = merge(once.clone(), COLOR, "red");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_value_never_regresses_field() {
        let mut row = ListingRecord::with_link("http://x/ad/1");
        row.set(COLOR, "red");

        assert!(!row.merge_field(COLOR, ""));
        assert_eq!(row.value(COLOR), "red");

        // Absent column stays absent
        assert!(!row.merge_field(VERSION, ""));
        assert_eq!(row.get(VERSION), None);
    }

    #[test]
    fn test_last_non_empty_wins() {
        let row = merge(ListingRecord::with_link("l"), COLOR, "red");
        let row = merge(row, COLOR, "blue");
        assert_eq!(row.value(COLOR), "blue");
    }

    #[test]
    fn test_column_order_is_first_seen() {
        let mut row = ListingRecord::from_pairs([("link", "a"), ("price", "1")]);
        row.set("price", "2");
        row.ensure_column(POWER);
        row.ensure_column("price");

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["link", "price", "Power"]);

        let pairs: Vec<(&str, &str)> = row.iter().collect();
        assert_eq!(pairs, vec![("link", "a"), ("price", "2"), ("Power", "")]);
    }

    #[test]
    fn test_empty_link_is_no_link() {
        let row = ListingRecord::from_pairs([("link", ""), ("title", "BMW")]);
        assert_eq!(row.link(), None);
        assert_eq!(ListingRecord::new().link(), None);
        assert_eq!(ListingRecord::with_link("u").link(), Some("u"));
    }
}
