//! Column-name normalization onto the canonical title schema.
//!
//! The alias table is data, not logic: the built-in table covers the two
//! public variants of the dataset (`netflix_titles.csv` and
//! `Netflix Dataset.csv`) and the config file can extend it.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::loader::RawTable;

/// A field of the canonical schema that may be sourced from an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ShowId,
    ContentType,
    Title,
    Director,
    Cast,
    Country,
    DateAdded,
    ReleaseYear,
    Rating,
    Duration,
    ListedIn,
    Description,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Self::ShowId,
        Self::ContentType,
        Self::Title,
        Self::Director,
        Self::Cast,
        Self::Country,
        Self::DateAdded,
        Self::ReleaseYear,
        Self::Rating,
        Self::Duration,
        Self::ListedIn,
        Self::Description,
    ];

    /// Canonical column name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShowId => "show_id",
            Self::ContentType => "type",
            Self::Title => "title",
            Self::Director => "director",
            Self::Cast => "cast",
            Self::Country => "country",
            Self::DateAdded => "date_added",
            Self::ReleaseYear => "release_year",
            Self::Rating => "rating",
            Self::Duration => "duration",
            Self::ListedIn => "listed_in",
            Self::Description => "description",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == normalize_header(name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alias table entry as written in the config file.
///
/// ```toml
/// [[schema.fields]]
/// name = "listed_in"
/// aliases = ["categories"]
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct FieldAliasConfig {
    pub name: String,
    pub aliases: Vec<String>,
    /// Replace the built-in aliases instead of appending to them.
    #[serde(default)]
    pub replace: bool,
}

/// Ordered mapping of canonical fields to the source column names they accept.
///
/// Fields are resolved in table order and each source column is claimed by at
/// most one field, so `type` can mean the content type in one dataset and the
/// genre list in another.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(Field, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let builtin: [(Field, &[&str]); 12] = [
            (Field::ShowId, &["show_id", "id"]),
            (Field::ContentType, &["category", "type", "content_type"]),
            (Field::Title, &["title", "name"]),
            (Field::Director, &["director", "directors"]),
            (Field::Cast, &["cast", "actors"]),
            (Field::Country, &["country", "countries"]),
            (Field::DateAdded, &["date_added", "release_date", "added"]),
            (Field::ReleaseYear, &["release_year", "year"]),
            (Field::Rating, &["rating", "maturity_rating"]),
            (Field::Duration, &["duration", "runtime"]),
            (Field::ListedIn, &["listed_in", "genre", "genres", "type"]),
            (Field::Description, &["description", "summary"]),
        ];
        Self {
            entries: builtin
                .into_iter()
                .map(|(field, aliases)| (field, aliases.iter().map(|a| a.to_string()).collect()))
                .collect(),
        }
    }
}

impl AliasTable {
    /// Built-in table merged with config entries.
    pub fn with_overrides(overrides: &[FieldAliasConfig]) -> Self {
        let mut table = Self::default();
        for entry in overrides {
            let Some(field) = Field::from_name(&entry.name) else {
                log::warn!("Ignoring alias entry for unknown field '{}'", entry.name);
                continue;
            };
            let aliases: Vec<String> = entry.aliases.iter().map(|a| normalize_header(a)).collect();
            if let Some((_, existing)) = table.entries.iter_mut().find(|(f, _)| *f == field) {
                if entry.replace {
                    *existing = aliases;
                } else {
                    for alias in aliases {
                        if !existing.contains(&alias) {
                            existing.push(alias);
                        }
                    }
                }
            }
        }
        table
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| a.as_slice())
            .unwrap_or(&[])
    }
}

/// Lowercase, trim, and turn spaces/dashes into underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// What the normalizer did with the input columns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SchemaReport {
    /// (source column, canonical field) pairs.
    pub mapped: Vec<(String, Field)>,
    /// Canonical fields with no matching source column.
    pub missing: Vec<Field>,
    /// Source columns no field claimed.
    pub unmapped: Vec<String>,
}

impl SchemaReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn log_diagnostics(&self, source: &std::path::Path) {
        for (column, field) in &self.mapped {
            if column != field.name() {
                log::info!("Column '{}' mapped to '{}'", column, field);
            }
        }
        if !self.missing.is_empty() {
            let names: Vec<&str> = self.missing.iter().map(|f| f.name()).collect();
            log::warn!(
                "{}: expected fields not found: {} (values will be missing)",
                source.display(),
                names.join(", ")
            );
        }
        if !self.unmapped.is_empty() {
            log::debug!("Ignored columns: {}", self.unmapped.join(", "));
        }
    }
}

/// A raw table viewed through the canonical schema.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub source: PathBuf,
    columns: HashMap<Field, usize>,
    raw: RawTable,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Value of `field` in `row`; `None` when the column is absent from the source.
    pub fn get(&self, row: usize, field: Field) -> Option<&str> {
        self.columns.get(&field).map(|&col| self.raw.cell(row, col))
    }
}

/// Rename source columns onto canonical fields.
pub fn normalize(raw: RawTable, table: &AliasTable) -> (NormalizedTable, SchemaReport) {
    let normalized: Vec<String> = raw.headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut columns = HashMap::new();
    let mut report = SchemaReport::default();

    for field in Field::ALL {
        let found = table.aliases(field).iter().find_map(|alias| {
            normalized
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed.contains(i) && *h == alias)
                .map(|(i, _)| i)
        });
        match found {
            Some(idx) => {
                claimed.insert(idx);
                columns.insert(field, idx);
                report.mapped.push((normalized[idx].clone(), field));
            }
            None => report.missing.push(field),
        }
    }

    report.unmapped = normalized
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed.contains(i))
        .map(|(_, h)| h.clone())
        .collect();

    (
        NormalizedTable {
            source: raw.source.clone(),
            columns,
            raw,
        },
        report,
    )
}
