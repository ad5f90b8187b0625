pub mod categorical;
pub mod dates;
pub mod duration;

use chrono::Datelike;

use crate::models::{ContentType, Title};
use crate::schema::{Field, NormalizedTable};
use categorical::{normalize_content_type, normalize_rating, split_list, text_or_unknown};
use dates::{parse_date, parse_year};
use duration::parse_duration;

/// Counts of values the cleaner could not interpret.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanReport {
    pub rows: usize,
    /// Non-blank date cells that did not parse.
    pub unparsed_dates: usize,
    /// Non-blank duration cells that did not parse.
    pub unparsed_durations: usize,
    /// Rows whose content type mapped to neither Movie nor TV Show.
    pub unknown_types: usize,
    /// The source had no date column at all.
    pub missing_date_column: bool,
}

/// Clean every row of a normalized table. Rows are never dropped.
pub fn clean_table(table: &NormalizedTable) -> (Vec<Title>, CleanReport) {
    let mut report = CleanReport {
        rows: table.len(),
        missing_date_column: !table.has(Field::DateAdded),
        ..Default::default()
    };

    let titles = (0..table.len())
        .map(|row| {
            let title = clean_row(table, row);
            if title.date_added.is_none() && !is_blank(table.get(row, Field::DateAdded)) {
                report.unparsed_dates += 1;
            }
            if title.duration.is_none() && !is_blank(table.get(row, Field::Duration)) {
                report.unparsed_durations += 1;
            }
            if title.content_type == ContentType::Unknown {
                report.unknown_types += 1;
            }
            title
        })
        .collect();

    if report.unparsed_dates > 0 || report.unparsed_durations > 0 {
        log::info!(
            "{} unparsable dates, {} unparsable durations set to missing",
            report.unparsed_dates,
            report.unparsed_durations
        );
    }
    if report.unknown_types > 0 {
        log::warn!("{} rows have an unrecognized content type", report.unknown_types);
    }

    (titles, report)
}

/// Clean a single row into a canonical title.
pub fn clean_row(table: &NormalizedTable, row: usize) -> Title {
    let get = |field| table.get(row, field);

    let date_added = get(Field::DateAdded).and_then(parse_date);
    let show_id = match get(Field::ShowId).map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("s{}", row + 1),
    };

    Title {
        show_id,
        title: text_or_unknown(get(Field::Title)),
        content_type: get(Field::ContentType)
            .map(normalize_content_type)
            .unwrap_or(ContentType::Unknown),
        listed_in: split_list(get(Field::ListedIn)),
        release_year: get(Field::ReleaseYear).and_then(parse_year),
        date_added,
        year_added: date_added.map(|d| d.year()),
        month_added: date_added.map(|d| d.month()),
        countries: split_list(get(Field::Country)),
        rating: normalize_rating(get(Field::Rating).unwrap_or("")),
        duration: get(Field::Duration).and_then(parse_duration),
        director: text_or_unknown(get(Field::Director)),
        cast: split_list(get(Field::Cast)),
        description: get(Field::Description).unwrap_or("").trim().to_string(),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
