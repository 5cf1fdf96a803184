//! Grouped key/value details shown when a schedule or standings row expands

use serde::{Deserialize, Serialize};

/// How a detail's value should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Free text
    Text,
    /// A count, displayed with thousands separators
    Quantity,
    /// A URL; the display value is the link label
    Link,
    /// A win-loss record
    Record,
}

/// A single labelled value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Stable identifier within its group (e.g. "gamecast", "streak")
    pub id: String,
    pub kind: DetailKind,
    /// Compact label, may be empty
    pub short_name: String,
    /// Label shown next to the value
    pub full_name: String,
    /// Raw value (URL for links)
    pub value: Option<String>,
    /// Text shown to the reader
    pub display_value: String,
}

/// Details organised into named groups, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailCatalog {
    groups: Vec<(String, Vec<Detail>)>,
}

impl DetailCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a detail to `group`, creating the group on first use
    pub fn add(&mut self, group: &str, detail: Detail) {
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, details)) => details.push(detail),
            None => self.groups.push((group.to_string(), vec![detail])),
        }
    }

    /// Builds a detail from its parts and appends it to `group`
    #[allow(clippy::too_many_arguments)]
    pub fn add_values(
        &mut self,
        group: &str,
        id: &str,
        kind: DetailKind,
        short_name: &str,
        full_name: &str,
        value: Option<String>,
        display_value: impl Into<String>,
    ) {
        self.add(
            group,
            Detail {
                id: id.to_string(),
                kind,
                short_name: short_name.to_string(),
                full_name: full_name.to_string(),
                value,
                display_value: display_value.into(),
            },
        );
    }

    /// Looks up a detail by group and id
    pub fn get(&self, group: &str, id: &str) -> Option<&Detail> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .and_then(|(_, details)| details.iter().find(|d| d.id == id))
    }

    /// Iterates over groups in insertion order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Detail])> {
        self.groups
            .iter()
            .map(|(name, details)| (name.as_str(), details.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> Detail {
        Detail {
            id: id.to_string(),
            kind: DetailKind::Text,
            short_name: String::new(),
            full_name: id.to_uppercase(),
            value: None,
            display_value: id.to_string(),
        }
    }

    #[test]
    fn test_groups_keep_insertion_order() {
        let mut catalog = DetailCatalog::new();
        catalog.add("Streak Details", text("l10"));
        catalog.add("Record Details", text("home"));
        catalog.add("Streak Details", text("streak"));

        let groups: Vec<_> = catalog.groups().map(|(name, d)| (name, d.len())).collect();
        assert_eq!(groups, vec![("Streak Details", 2), ("Record Details", 1)]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(DetailCatalog::new().is_empty());
    }
}
