// ── Alias tables ──
//
// Source sheets are maintained by hand, so both column headers and
// status cells drift between deployments. These tables map the observed
// spellings onto canonical names. They are plain data: extending them
// from configuration never touches parser or normalizer control flow.

use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::model::UnitStatus;

/// Canonical columns the normalizer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Unit,
    Floor,
    Type,
    Area,
    Parking,
    Status,
}

impl Column {
    /// Positional layout assumed for header-less exports.
    pub const POSITIONAL: [Column; 6] = [
        Column::Unit,
        Column::Floor,
        Column::Type,
        Column::Area,
        Column::Parking,
        Column::Status,
    ];

    fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Unit => &[
                "unit",
                "unit no",
                "unit no.",
                "unit number",
                "unit_no",
                "unit #",
                "apartment",
                "apt",
            ],
            Self::Floor => &["floor", "level", "floor no"],
            Self::Type => &["type", "unit type", "layout", "bedrooms"],
            Self::Area => &["area", "size", "sqft", "area (sqft)", "bua"],
            Self::Parking => &["parking", "parking bay", "parking no"],
            Self::Status => &["status", "availability", "sale status"],
        }
    }
}

/// Lower-case, trim, and collapse internal whitespace runs to one space.
pub fn fold_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ── Column aliases ──────────────────────────────────────────────────

/// Header-name aliases for each canonical [`Column`].
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    by_name: HashMap<String, Column>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let mut by_name = HashMap::new();
        for column in Column::iter() {
            for alias in column.default_aliases() {
                by_name.insert((*alias).to_owned(), column);
            }
        }
        Self { by_name }
    }
}

impl ColumnAliases {
    /// Register extra header spellings for a column.
    pub fn extend<I, S>(&mut self, column: Column, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            let key = fold_key(alias.as_ref());
            if !key.is_empty() {
                self.by_name.insert(key, column);
            }
        }
    }

    /// Resolve a header name to its canonical column.
    pub fn resolve(&self, header: &str) -> Option<Column> {
        self.by_name.get(&fold_key(header)).copied()
    }

    /// Every alias registered for `column`, in no particular order.
    pub fn aliases_for(&self, column: Column) -> impl Iterator<Item = &str> {
        self.by_name
            .iter()
            .filter(move |(_, c)| **c == column)
            .map(|(name, _)| name.as_str())
    }
}

// ── Status vocabulary ───────────────────────────────────────────────

/// Status-cell aliases for each canonical [`UnitStatus`].
///
/// Classification is total: anything not in the table is `Available`.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    by_alias: HashMap<String, UnitStatus>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        let mut by_alias = HashMap::new();
        for status in UnitStatus::iter() {
            for alias in status.default_aliases() {
                by_alias.insert((*alias).to_owned(), status);
            }
        }
        Self { by_alias }
    }
}

impl StatusVocabulary {
    /// Register extra spellings for a status.
    pub fn extend<I, S>(&mut self, status: UnitStatus, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            self.by_alias.insert(fold_key(alias.as_ref()), status);
        }
    }

    /// Classify a raw status cell.
    pub fn classify(&self, raw: &str) -> UnitStatus {
        self.by_alias
            .get(&fold_key(raw))
            .copied()
            .unwrap_or(UnitStatus::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_key_collapses_whitespace() {
        assert_eq!(fold_key("  On \t  HOLD \r"), "on hold");
        assert_eq!(fold_key(""), "");
    }

    #[test]
    fn status_table_matches_every_alias() {
        let vocab = StatusVocabulary::default();
        let cases = [
            ("available", UnitStatus::Available),
            ("avail", UnitStatus::Available),
            ("", UnitStatus::Available),
            ("on hold", UnitStatus::OnHold),
            ("on-hold", UnitStatus::OnHold),
            ("hold", UnitStatus::OnHold),
            ("booked", UnitStatus::Booked),
            ("reserve", UnitStatus::Booked),
            ("reserved", UnitStatus::Booked),
            ("sold", UnitStatus::Sold),
            ("closed", UnitStatus::Sold),
        ];
        for (raw, expected) in cases {
            assert_eq!(vocab.classify(raw), expected, "alias {raw:?}");
        }
    }

    #[test]
    fn classification_is_case_and_space_insensitive() {
        let vocab = StatusVocabulary::default();
        assert_eq!(vocab.classify("  ON   Hold "), UnitStatus::OnHold);
        assert_eq!(vocab.classify("Sold\r"), UnitStatus::Sold);
        assert_eq!(vocab.classify("BOOKED"), UnitStatus::Booked);
    }

    #[test]
    fn unknown_status_defaults_to_available() {
        let vocab = StatusVocabulary::default();
        assert_eq!(vocab.classify("under offer"), UnitStatus::Available);
        assert_eq!(vocab.classify("???"), UnitStatus::Available);
    }

    #[test]
    fn classification_is_idempotent_on_canonical_labels() {
        let vocab = StatusVocabulary::default();
        for status in UnitStatus::iter() {
            let once = vocab.classify(status.label());
            assert_eq!(once, status);
            assert_eq!(vocab.classify(&once.label().to_lowercase()), status);
        }
    }

    #[test]
    fn status_vocabulary_can_be_extended() {
        let mut vocab = StatusVocabulary::default();
        assert_eq!(vocab.classify("Pending"), UnitStatus::Available);
        vocab.extend(UnitStatus::OnHold, ["Pending", "  under   offer "]);
        assert_eq!(vocab.classify("pending"), UnitStatus::OnHold);
        assert_eq!(vocab.classify("Under Offer"), UnitStatus::OnHold);
    }

    #[test]
    fn column_aliases_resolve_case_insensitively() {
        let cols = ColumnAliases::default();
        assert_eq!(cols.resolve(" Unit No. "), Some(Column::Unit));
        assert_eq!(cols.resolve("LEVEL"), Some(Column::Floor));
        assert_eq!(cols.resolve("Sale  Status"), Some(Column::Status));
        assert_eq!(cols.resolve("price"), None);
    }

    #[test]
    fn column_aliases_can_be_extended() {
        let mut cols = ColumnAliases::default();
        cols.extend(Column::Unit, ["Flat"]);
        assert_eq!(cols.resolve("flat"), Some(Column::Unit));
        assert!(cols.aliases_for(Column::Unit).any(|a| a == "flat"));
    }
}
