//! Group-by summaries over cleaned titles.
//!
//! Every function is pure and deterministic: counts are sorted by descending
//! frequency with ties kept in first-seen order (stable sort), so the same
//! input always yields the same ordered output.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use crate::models::{ContentType, DurationUnit, LabelCount, Title, UNKNOWN};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Words ignored by the title word cloud.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "that", "this", "you", "your", "are",
    "not", "but", "all", "his", "her", "its", "our", "who", "what", "when",
    "how", "into", "out", "one", "two", "was", "will", "has", "have", "der",
    "die", "das", "del", "les", "los", "las", "une",
];

/// Fixed N per top-N chart.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TopN {
    pub ratings: usize,
    pub genres: usize,
    pub countries: usize,
    pub directors: usize,
    pub cast: usize,
    /// Genres drawn in the trend-over-time chart.
    pub trend_genres: usize,
    pub words: usize,
}

impl Default for TopN {
    fn default() -> Self {
        Self {
            ratings: 10,
            genres: 15,
            countries: 20,
            directors: 10,
            cast: 10,
            trend_genres: 5,
            words: 60,
        }
    }
}

/// A frequency dimension with multi-valued cells exploded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Rating,
    Genre,
    Country,
    Director,
    Cast,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rating => "Rating",
            Self::Genre => "Genre",
            Self::Country => "Country",
            Self::Director => "Director",
            Self::Cast => "Cast",
        }
    }

    /// Values of this dimension on one title, sentinel excluded.
    pub fn values<'a>(&self, title: &'a Title) -> Vec<&'a str> {
        match self {
            Self::Rating => vec![title.rating.as_str()],
            Self::Genre => title.known_genres().collect(),
            Self::Country => title.known_countries().collect(),
            Self::Director => title
                .director
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty() && *d != UNKNOWN)
                .collect(),
            Self::Cast => title.known_cast().collect(),
        }
    }

    pub fn limit(&self, top: &TopN) -> usize {
        match self {
            Self::Rating => top.ratings,
            Self::Genre => top.genres,
            Self::Country => top.countries,
            Self::Director => top.directors,
            Self::Cast => top.cast,
        }
    }
}

/// Count keys, descending by count, ties in first-seen order.
fn tally<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Generic group-by-count over titles.
pub fn count_by<'a, K, F>(titles: &[&'a Title], key: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a Title) -> K,
{
    tally(titles.iter().map(|t| key(*t)))
}

/// Top-N labels by frequency; the missing sentinel never ranks.
pub fn top_n<'a, I>(values: I, n: usize) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = tally(values.into_iter().filter(|v| *v != UNKNOWN));
    counts.truncate(n);
    counts
        .into_iter()
        .map(|(label, count)| LabelCount::new(label, count))
        .collect()
}

/// Top-N of one dimension across titles.
pub fn top_dimension(titles: &[&Title], dim: Dimension, n: usize) -> Vec<LabelCount> {
    top_n(titles.iter().flat_map(|t| dim.values(t)), n)
}

pub fn count_by_type(titles: &[&Title]) -> Vec<LabelCount> {
    count_by(titles, |t| t.content_type)
        .into_iter()
        .map(|(ct, count)| LabelCount::new(ct.label(), count))
        .collect()
}

/// Every known rating with its count, most frequent first.
pub fn count_by_rating(titles: &[&Title]) -> Vec<LabelCount> {
    top_dimension(titles, Dimension::Rating, usize::MAX)
}

/// One point of a per-year series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub series: String,
    pub count: usize,
}

/// Titles added per (year, content type), ascending year. Undated titles are skipped.
pub fn count_by_year_type(titles: &[&Title]) -> Vec<YearCount> {
    let mut grouped: BTreeMap<(i32, ContentType), usize> = BTreeMap::new();
    for t in titles {
        if let Some(year) = t.year_added {
            *grouped.entry((year, t.content_type)).or_insert(0) += 1;
        }
    }
    grouped
        .into_iter()
        .map(|((year, ct), count)| YearCount {
            year,
            series: ct.label().to_string(),
            count,
        })
        .collect()
}

/// Titles added per (year, genre) for the `k` most frequent genres among dated titles.
pub fn genre_trends(titles: &[&Title], k: usize) -> Vec<YearCount> {
    let dated: Vec<&Title> = titles.iter().copied().filter(|t| t.year_added.is_some()).collect();
    let top: Vec<String> = top_dimension(&dated, Dimension::Genre, k)
        .into_iter()
        .map(|lc| lc.label)
        .collect();

    let mut grouped: BTreeMap<(i32, usize), usize> = BTreeMap::new();
    for t in &dated {
        let Some(year) = t.year_added else { continue };
        for genre in t.known_genres() {
            if let Some(rank) = top.iter().position(|g| g == genre) {
                *grouped.entry((year, rank)).or_insert(0) += 1;
            }
        }
    }
    grouped
        .into_iter()
        .map(|((year, rank), count)| YearCount {
            year,
            series: top[rank].clone(),
            count,
        })
        .collect()
}

/// Titles added per calendar month, in calendar order; empty months omitted.
pub fn count_by_month(titles: &[&Title]) -> Vec<LabelCount> {
    let mut counts = [0usize; 12];
    for t in titles {
        if let Some(m) = t.month_added.filter(|m| (1..=12).contains(m)) {
            counts[(m - 1) as usize] += 1;
        }
    }
    MONTH_NAMES
        .iter()
        .zip(counts)
        .filter(|(_, c)| *c > 0)
        .map(|(name, c)| LabelCount::new(*name, c))
        .collect()
}

/// One equal-width histogram bin, `[start, end)` (the last bin is closed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram of movie runtimes in minutes.
pub fn duration_histogram(titles: &[&Title], bins: usize) -> Vec<Bin> {
    let minutes: Vec<f64> = titles
        .iter()
        .filter(|t| t.content_type == ContentType::Movie)
        .filter_map(|t| t.duration)
        .filter(|d| d.unit == DurationUnit::Minutes)
        .map(|d| d.value as f64)
        .collect();
    histogram(&minutes, bins)
}

pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (bins, width) = if max > min {
        (bins, (max - min) / bins as f64)
    } else {
        (1, 1.0)
    };

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// TV shows per season count, ascending.
pub fn season_counts(titles: &[&Title]) -> Vec<LabelCount> {
    let mut grouped: BTreeMap<u32, usize> = BTreeMap::new();
    for t in titles {
        if let Some(d) = t.duration.filter(|d| d.unit == DurationUnit::Seasons) {
            *grouped.entry(d.value).or_insert(0) += 1;
        }
    }
    grouped
        .into_iter()
        .map(|(seasons, count)| {
            let label = if seasons == 1 {
                "1 Season".to_string()
            } else {
                format!("{seasons} Seasons")
            };
            LabelCount::new(label, count)
        })
        .collect()
}

/// Headline metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub unknown_type: usize,
    pub countries: usize,
}

pub fn summary(titles: &[&Title]) -> Summary {
    let mut s = Summary {
        total: titles.len(),
        ..Default::default()
    };
    let mut countries: HashSet<&str> = HashSet::new();
    for t in titles {
        match t.content_type {
            ContentType::Movie => s.movies += 1,
            ContentType::TvShow => s.tv_shows += 1,
            ContentType::Unknown => s.unknown_type += 1,
        }
        countries.extend(t.known_countries());
    }
    s.countries = countries.len();
    s
}

/// Most frequent title words for the word cloud.
pub fn word_frequencies(titles: &[&Title], n: usize) -> Vec<LabelCount> {
    let words: Vec<String> = titles
        .iter()
        .filter(|t| t.title != UNKNOWN)
        .flat_map(|t| {
            t.title
                .split(|c: char| !c.is_alphanumeric() && c != '\'')
                .map(|w| w.trim_matches('\'').to_lowercase())
                .collect::<Vec<_>>()
        })
        .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .collect();
    top_n(words.iter().map(|w| w.as_str()), n)
}

/// Every aggregate the dashboard and report draw, for one filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
    pub summary: Summary,
    pub by_type: Vec<LabelCount>,
    pub ratings: Vec<LabelCount>,
    pub duration_histogram: Vec<Bin>,
    pub seasons: Vec<LabelCount>,
    pub genres: Vec<LabelCount>,
    pub genre_trends: Vec<YearCount>,
    pub countries: Vec<LabelCount>,
    pub by_year_type: Vec<YearCount>,
    pub by_month: Vec<LabelCount>,
    pub directors: Vec<LabelCount>,
    pub cast: Vec<LabelCount>,
    pub words: Vec<LabelCount>,
}

/// Histogram bins for movie runtimes.
pub const DURATION_BINS: usize = 30;

impl AggregateView {
    pub fn compute(titles: &[&Title], top: &TopN) -> Self {
        Self {
            summary: summary(titles),
            by_type: count_by_type(titles),
            ratings: top_dimension(titles, Dimension::Rating, top.ratings),
            duration_histogram: duration_histogram(titles, DURATION_BINS),
            seasons: season_counts(titles),
            genres: top_dimension(titles, Dimension::Genre, top.genres),
            genre_trends: genre_trends(titles, top.trend_genres),
            countries: top_dimension(titles, Dimension::Country, top.countries),
            by_year_type: count_by_year_type(titles),
            by_month: count_by_month(titles),
            directors: top_dimension(titles, Dimension::Director, top.directors),
            cast: top_dimension(titles, Dimension::Cast, top.cast),
            words: word_frequencies(titles, top.words),
        }
    }
}
