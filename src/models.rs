use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for missing categorical values (genre, country, rating, people).
pub const UNKNOWN: &str = "Unknown";

/// Content type of a catalog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [Self::Movie, Self::TvShow, Self::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TV Show",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit tag of a parsed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Minutes,
    Seasons,
}

impl DurationUnit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Seasons => "seasons",
        }
    }
}

/// Runtime of a movie (minutes) or length of a show (seasons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub value: u32,
    pub unit: DurationUnit,
}

impl fmt::Display for Duration {
    /// Formats back into the dataset's own notation ("90 min", "1 Season", "3 Seasons").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            DurationUnit::Minutes => write!(f, "{} min", self.value),
            DurationUnit::Seasons if self.value == 1 => write!(f, "1 Season"),
            DurationUnit::Seasons => write!(f, "{} Seasons", self.value),
        }
    }
}

/// A catalog title after schema normalization and cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub show_id: String,
    pub title: String,
    pub content_type: ContentType,
    pub listed_in: Vec<String>,
    pub release_year: Option<i32>,
    pub date_added: Option<NaiveDate>,
    pub year_added: Option<i32>,
    pub month_added: Option<u32>,
    pub countries: Vec<String>,
    pub rating: String,
    pub duration: Option<Duration>,
    pub director: String,
    pub cast: Vec<String>,
    pub description: String,
}

impl Title {
    /// Genres excluding the missing sentinel.
    pub fn known_genres(&self) -> impl Iterator<Item = &str> {
        known(&self.listed_in)
    }

    /// Countries excluding the missing sentinel.
    pub fn known_countries(&self) -> impl Iterator<Item = &str> {
        known(&self.countries)
    }

    /// Cast members excluding the missing sentinel.
    pub fn known_cast(&self) -> impl Iterator<Item = &str> {
        known(&self.cast)
    }
}

fn known(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|s| s.as_str()).filter(|s| *s != UNKNOWN)
}

/// One label with its frequency, the row type of every grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self { label: label.into(), count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_display_matches_dataset_notation() {
        let d = |value, unit| Duration { value, unit };
        assert_eq!(d(90, DurationUnit::Minutes).to_string(), "90 min");
        assert_eq!(d(1, DurationUnit::Seasons).to_string(), "1 Season");
        assert_eq!(d(4, DurationUnit::Seasons).to_string(), "4 Seasons");
    }

    #[test]
    fn test_content_type_serializes_as_label() {
        assert_eq!(serde_json::to_string(&ContentType::TvShow).unwrap(), "\"TV Show\"");
        assert_eq!(serde_json::to_string(&ContentType::Movie).unwrap(), "\"Movie\"");
    }
}
