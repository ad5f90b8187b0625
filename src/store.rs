use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::cleaner::dates::format_date;
use crate::models::Title;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Header of the persisted cleaned table and of every export.
pub const CLEAN_HEADER: [&str; 16] = [
    "show_id",
    "type",
    "title",
    "director",
    "cast",
    "country",
    "date_added",
    "year_added",
    "month_added",
    "release_year",
    "rating",
    "duration",
    "duration_value",
    "duration_unit",
    "listed_in",
    "description",
];

/// Flat row layout matching [`CLEAN_HEADER`]; missing values are empty cells.
#[derive(Serialize)]
struct CleanRow<'a> {
    show_id: &'a str,
    content_type: &'static str,
    title: &'a str,
    director: &'a str,
    cast: String,
    country: String,
    date_added: String,
    year_added: Option<i32>,
    month_added: Option<u32>,
    release_year: Option<i32>,
    rating: &'a str,
    duration: String,
    duration_value: Option<u32>,
    duration_unit: &'static str,
    listed_in: String,
    description: &'a str,
}

impl<'a> From<&'a Title> for CleanRow<'a> {
    fn from(t: &'a Title) -> Self {
        Self {
            show_id: &t.show_id,
            content_type: t.content_type.label(),
            title: &t.title,
            director: &t.director,
            cast: t.cast.join(", "),
            country: t.countries.join(", "),
            date_added: t.date_added.map(format_date).unwrap_or_default(),
            year_added: t.year_added,
            month_added: t.month_added,
            release_year: t.release_year,
            rating: &t.rating,
            duration: t.duration.map(|d| d.to_string()).unwrap_or_default(),
            duration_value: t.duration.map(|d| d.value),
            duration_unit: t.duration.map(|d| d.unit.label()).unwrap_or(""),
            listed_in: t.listed_in.join(", "),
            description: &t.description,
        }
    }
}

/// Write titles as CSV. The header is always written, so an empty
/// selection still yields a valid file.
pub fn write_titles<'a, W, I>(writer: W, titles: I) -> Result<usize, StoreError>
where
    W: Write,
    I: IntoIterator<Item = &'a Title>,
{
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CLEAN_HEADER)?;
    let mut written = 0;
    for title in titles {
        wtr.serialize(CleanRow::from(title))?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

/// Persist the cleaned table, creating parent directories as needed.
pub fn write_cleaned(path: &Path, titles: &[Title]) -> Result<usize, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    let written = write_titles(std::io::BufWriter::new(file), titles)?;
    log::info!("Wrote {} cleaned rows to {}", written, path.display());
    Ok(written)
}

/// Render titles to an in-memory CSV document.
pub fn to_csv_bytes<'a, I>(titles: I) -> Result<Vec<u8>, StoreError>
where
    I: IntoIterator<Item = &'a Title>,
{
    let mut buf = Vec::new();
    write_titles(&mut buf, titles)?;
    Ok(buf)
}

/// File name offered for a filtered export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("netflix_filtered_{}.csv", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::clean_table;
    use crate::loader::{from_reader, read_table};
    use crate::models::{ContentType, Duration, DurationUnit, UNKNOWN};
    use crate::schema::{normalize, AliasTable};

    fn sample() -> Title {
        Title {
            show_id: "s7".into(),
            title: "My Little Pony: A New Generation".into(),
            content_type: ContentType::Movie,
            listed_in: vec!["Children & Family Movies".into()],
            release_year: Some(2021),
            date_added: NaiveDate::from_ymd_opt(2021, 9, 24),
            year_added: Some(2021),
            month_added: Some(9),
            countries: vec![UNKNOWN.into()],
            rating: "PG".into(),
            duration: Some(Duration { value: 91, unit: DurationUnit::Minutes }),
            director: "Robert Cullen, José Luis Ucha".into(),
            cast: vec!["Vanessa Hudgens".into(), "Kimiko Glenn".into()],
            description: "Equestria's divided.".into(),
        }
    }

    fn reclean(bytes: &[u8]) -> Vec<Title> {
        let raw = from_reader(bytes, Path::new("cleaned.csv")).unwrap();
        let (table, report) = normalize(raw, &AliasTable::default());
        assert!(report.is_complete(), "missing: {:?}", report.missing);
        clean_table(&table).0
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let bytes = to_csv_bytes(std::iter::empty()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, format!("{}\n", CLEAN_HEADER.join(",")));
    }

    #[test]
    fn test_row_layout() {
        let t = sample();
        let text = String::from_utf8(to_csv_bytes([&t]).unwrap()).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert!(line.starts_with("s7,Movie,My Little Pony: A New Generation,"));
        assert!(line.contains(",2021-09-24,2021,9,2021,PG,91 min,91,minutes,"));
    }

    #[test]
    fn test_persisted_table_recleans_identically() {
        let mut show = sample();
        show.show_id = "s2".into();
        show.content_type = ContentType::TvShow;
        show.duration = Some(Duration { value: 1, unit: DurationUnit::Seasons });
        show.date_added = None;
        show.year_added = None;
        show.month_added = None;
        show.release_year = None;
        let titles = vec![sample(), show];

        let bytes = to_csv_bytes(&titles).unwrap();
        assert_eq!(reclean(&bytes), titles);
    }

    #[test]
    fn test_write_cleaned_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs").join("cleaned_netflix.csv");
        let written = write_cleaned(&path, &[sample()]).unwrap();
        assert_eq!(written, 1);
        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, CLEAN_HEADER.to_vec());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_export_file_name() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(d), "netflix_filtered_20240309.csv");
    }
}
