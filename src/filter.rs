use std::collections::BTreeSet;

use crate::models::{ContentType, Title};

/// User-selected predicate over the cleaned table. Empty selections match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub types: Vec<ContentType>,
    /// Inclusive `year_added` bounds; titles without a year never match.
    pub year_range: Option<(i32, i32)>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
}

impl FilterState {
    pub fn with_types(mut self, types: impl IntoIterator<Item = ContentType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Set the year range; reversed bounds are swapped.
    pub fn with_year_range(mut self, from: i32, to: i32) -> Self {
        self.year_range = Some((from.min(to), from.max(to)));
        self
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = String>) -> Self {
        self.genres = genres.into_iter().collect();
        self
    }

    pub fn with_countries(mut self, countries: impl IntoIterator<Item = String>) -> Self {
        self.countries = countries.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self
    }

    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// Whether a title satisfies every active predicate.
    pub fn matches(&self, title: &Title) -> bool {
        if !self.types.is_empty() && !self.types.contains(&title.content_type) {
            return false;
        }

        if let Some((from, to)) = self.year_range {
            match title.year_added {
                Some(y) if y >= from && y <= to => {}
                _ => return false,
            }
        }

        if !self.genres.is_empty() && !any_selected(&self.genres, &title.listed_in) {
            return false;
        }

        if !self.countries.is_empty() && !any_selected(&self.countries, &title.countries) {
            return false;
        }

        if let Some(ref needle) = self.search {
            if !title.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        true
    }

    /// Narrow the table to matching titles, preserving order.
    pub fn apply<'a>(&self, titles: &'a [Title]) -> Vec<&'a Title> {
        titles.iter().filter(|t| self.matches(t)).collect()
    }
}

fn any_selected(selected: &[String], values: &[String]) -> bool {
    values
        .iter()
        .any(|v| selected.iter().any(|s| s.eq_ignore_ascii_case(v)))
}

/// Values offered by the dashboard's filter controls.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub types: Vec<ContentType>,
    pub year_bounds: (i32, i32),
    /// At least one title has a `year_added`; otherwise `year_bounds` is the fallback.
    pub has_dates: bool,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
}

/// Year slider bounds when no title has a usable date.
pub const DEFAULT_YEAR_BOUNDS: (i32, i32) = (2008, 2021);

impl FilterOptions {
    pub fn from_titles(titles: &[Title]) -> Self {
        let types: BTreeSet<ContentType> = titles.iter().map(|t| t.content_type).collect();
        let years = titles.iter().filter_map(|t| t.year_added);
        let observed = years.fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        });

        let genres: BTreeSet<&str> = titles.iter().flat_map(|t| t.known_genres()).collect();
        let countries: BTreeSet<&str> = titles.iter().flat_map(|t| t.known_countries()).collect();

        Self {
            types: types.into_iter().collect(),
            year_bounds: observed.unwrap_or(DEFAULT_YEAR_BOUNDS),
            has_dates: observed.is_some(),
            genres: genres.into_iter().map(String::from).collect(),
            countries: countries.into_iter().map(String::from).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Duration, DurationUnit, UNKNOWN};
    use chrono::{Datelike, NaiveDate};

    pub(crate) fn title(id: &str, ct: ContentType, year: Option<i32>, genres: &[&str], countries: &[&str]) -> Title {
        let date_added = year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 1));
        Title {
            show_id: id.into(),
            title: format!("Title {id}"),
            content_type: ct,
            listed_in: genres.iter().map(|g| g.to_string()).collect(),
            release_year: year,
            date_added,
            year_added: date_added.map(|d| d.year()),
            month_added: date_added.map(|d| d.month()),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            rating: "TV-MA".into(),
            duration: Some(match ct {
                ContentType::TvShow => Duration { value: 2, unit: DurationUnit::Seasons },
                _ => Duration { value: 95, unit: DurationUnit::Minutes },
            }),
            director: UNKNOWN.into(),
            cast: vec![UNKNOWN.into()],
            description: String::new(),
        }
    }

    /// Ten titles, three of which are TV shows added 2018–2020.
    pub(crate) fn fixture() -> Vec<Title> {
        use ContentType::*;
        vec![
            title("s1", TvShow, Some(2018), &["Dramas"], &["United States"]),
            title("s2", TvShow, Some(2019), &["Comedies"], &["India"]),
            title("s3", TvShow, Some(2020), &["Dramas", "Comedies"], &["United States", "India"]),
            title("s4", TvShow, Some(2017), &["Dramas"], &["Brazil"]),
            title("s5", TvShow, Some(2021), &["Docuseries"], &["United Kingdom"]),
            title("s6", TvShow, None, &["Dramas"], &[UNKNOWN]),
            title("s7", Movie, Some(2019), &["Dramas"], &["United States"]),
            title("s8", Movie, Some(2020), &["Action & Adventure"], &["India"]),
            title("s9", Movie, Some(2018), &["Comedies"], &["Mexico"]),
            title("s10", Unknown, Some(2019), &[UNKNOWN], &[UNKNOWN]),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let titles = fixture();
        let f = FilterState::default();
        assert!(!f.is_active());
        assert_eq!(f.apply(&titles).len(), titles.len());
    }

    #[test]
    fn test_type_and_year_range() {
        let titles = fixture();
        let f = FilterState::default()
            .with_types([ContentType::TvShow])
            .with_year_range(2018, 2020);
        let ids: Vec<&str> = f.apply(&titles).iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_reversed_year_range_is_swapped() {
        let f = FilterState::default().with_year_range(2020, 2018);
        assert_eq!(f.year_range, Some((2018, 2020)));
    }

    #[test]
    fn test_year_range_excludes_missing_years() {
        let titles = fixture();
        let f = FilterState::default().with_year_range(1900, 2100);
        assert!(f.apply(&titles).iter().all(|t| t.show_id != "s6"));
    }

    #[test]
    fn test_genre_and_country_any_of() {
        let titles = fixture();
        let f = FilterState::default()
            .with_genres(["comedies".to_string()])
            .with_countries(["India".to_string(), "Mexico".to_string()]);
        let ids: Vec<&str> = f.apply(&titles).iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s3", "s9"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let titles = fixture();
        let f = FilterState::default().with_search(Some(" title S1 ".into()));
        let ids: Vec<&str> = f.apply(&titles).iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s10"]);
        assert_eq!(FilterState::default().with_search(Some("  ".into())).search, None);
    }

    #[test]
    fn test_filter_only_narrows() {
        let titles = fixture();
        let filters = [
            FilterState::default().with_types([ContentType::Movie]),
            FilterState::default().with_year_range(2019, 2019),
            FilterState::default().with_genres(["Dramas".to_string()]).with_year_range(2017, 2020),
            FilterState::default()
                .with_types([ContentType::TvShow, ContentType::Unknown])
                .with_countries(["United States".to_string()]),
        ];
        for f in &filters {
            let out = f.apply(&titles);
            assert!(out.len() <= titles.len());
            assert!(out.iter().all(|t| f.matches(t)));
            for t in &out {
                if !f.types.is_empty() {
                    assert!(f.types.contains(&t.content_type));
                }
                if let Some((lo, hi)) = f.year_range {
                    let y = t.year_added.unwrap();
                    assert!(y >= lo && y <= hi);
                }
            }
        }
    }

    #[test]
    fn test_filter_options() {
        let opts = FilterOptions::from_titles(&fixture());
        assert_eq!(
            opts.types,
            vec![ContentType::Movie, ContentType::TvShow, ContentType::Unknown]
        );
        assert_eq!(opts.year_bounds, (2017, 2021));
        assert!(opts.genres.contains(&"Docuseries".to_string()));
        assert!(!opts.genres.contains(&UNKNOWN.to_string()));
        assert!(!opts.countries.contains(&UNKNOWN.to_string()));
        assert!(opts.has_dates);
        let empty = FilterOptions::from_titles(&[]);
        assert_eq!(empty.year_bounds, DEFAULT_YEAR_BOUNDS);
        assert!(!empty.has_dates);
    }
}
