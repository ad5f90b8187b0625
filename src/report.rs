use std::fmt::Write as FmtWrite;
use std::path::Path;

use crate::aggregate::{AggregateView, TopN};
use crate::catalog::Catalog;
use crate::charts::escape_html;
use crate::dashboard::page::{self, thousands};
use crate::models::Title;

/// Every exploratory chart for the full table as one standalone HTML page.
pub fn render_report(catalog: &Catalog, top: &TopN) -> String {
    let all: Vec<&Title> = catalog.titles.iter().collect();
    let view = AggregateView::compute(&all, top);

    let mut body = String::new();
    let _ = write!(
        body,
        "<h2>Catalog Report</h2><p>{} titles: {} movies, {} TV shows, {} countries.</p>",
        thousands(view.summary.total),
        thousands(view.summary.movies),
        thousands(view.summary.tv_shows),
        thousands(view.summary.countries),
    );
    body.push_str(&data_quality(catalog));
    body.push_str(&page::overview_section(&view, top));
    body.push_str(&page::genres_section(&view, top));
    body.push_str(&page::geographic_section(&view, top));
    body.push_str(&page::temporal_section(&view));

    let footer = format!("Generated from {}", catalog.source.display());
    page::document("Netflix Catalog Report", &body, &footer)
}

fn data_quality(catalog: &Catalog) -> String {
    let mut items: Vec<String> = Vec::new();
    let c = &catalog.cleaning;
    if c.missing_date_column {
        items.push("The source has no date column; time-based charts are empty.".into());
    }
    if c.unparsed_dates > 0 {
        items.push(format!("{} date values could not be parsed.", thousands(c.unparsed_dates)));
    }
    if c.unparsed_durations > 0 {
        items.push(format!("{} duration values could not be parsed.", thousands(c.unparsed_durations)));
    }
    if c.unknown_types > 0 {
        items.push(format!("{} rows have an unrecognized content type.", thousands(c.unknown_types)));
    }
    if !catalog.schema.missing.is_empty() {
        let names: Vec<&str> = catalog.schema.missing.iter().map(|f| f.name()).collect();
        items.push(format!("Missing columns: {}.", names.join(", ")));
    }
    if items.is_empty() {
        return String::new();
    }
    let mut s = String::from(r#"<div class="notice"><ul>"#);
    for item in items {
        let _ = write!(s, "<li>{}</li>", escape_html(&item));
    }
    s.push_str("</ul></div>");
    s
}

/// Write the report, creating parent directories as needed.
pub fn write_report(path: &Path, catalog: &Catalog, top: &TopN) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_report(catalog, top))?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::fixture;

    #[test]
    fn test_report_has_every_section() {
        let catalog = Catalog::from_titles(fixture(), "fixture.csv");
        let html = render_report(&catalog, &TopN::default());
        for heading in [
            "Content Distribution Overview",
            "Genre Analysis",
            "Geographic Distribution",
            "Temporal Analysis",
        ] {
            assert!(html.contains(heading), "{heading}");
        }
        assert!(html.contains("10 titles: 3 movies, 6 TV shows, 5 countries."));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn test_report_lists_data_quality_issues() {
        let mut catalog = Catalog::from_titles(fixture(), "fixture.csv");
        catalog.cleaning.unparsed_dates = 3;
        catalog.cleaning.missing_date_column = true;
        let html = render_report(&catalog, &TopN::default());
        assert!(html.contains("3 date values could not be parsed."));
        assert!(html.contains("no date column"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs/report.html");
        let catalog = Catalog::from_titles(Vec::new(), "empty.csv");
        write_report(&path, &catalog, &TopN::default()).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(crate::charts::EMPTY_MESSAGE));
    }
}
