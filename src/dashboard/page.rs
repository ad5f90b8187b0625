use std::fmt::Write as FmtWrite;

use crate::aggregate::{AggregateView, Summary, TopN};
use crate::charts::{self, escape_html};
use crate::dashboard::{AppState, FilterQuery, Tab, ROW_CHOICES};
use crate::filter::FilterState;
use crate::models::{LabelCount, Title};

pub const PAGE_TITLE: &str = "Netflix Data Analysis";

/// Full dashboard page for one request.
pub fn render(state: &AppState, query: &FilterQuery, raw_query: &str) -> String {
    let catalog = &state.catalog;
    let filter = query.to_filter(&catalog.options);
    let filtered = filter.apply(&catalog.titles);
    let view = AggregateView::compute(&filtered, &state.top);
    let tab = query.tab();

    let mut body = String::new();
    body.push_str(r#"<div class="layout">"#);
    body.push_str(&sidebar(state, query, &filter, raw_query));
    body.push_str(r#"<div class="content">"#);
    if filtered.is_empty() {
        body.push_str(r#"<div class="notice">No titles match the current filters.</div>"#);
    }
    body.push_str(&metrics(&view.summary));
    body.push_str(&tab_nav(tab, raw_query));
    let section = match tab {
        Tab::Overview => overview_section(&view, &state.top),
        Tab::Genres => genres_section(&view, &state.top),
        Tab::Geographic => geographic_section(&view, &state.top),
        Tab::Temporal => temporal_section(&view),
        Tab::Explore => explore_section(query, &filtered, raw_query),
    };
    body.push_str(&section);
    body.push_str("</div></div>");

    let footer = format!(
        "{} titles loaded from {}",
        thousands(catalog.len()),
        catalog.source.display()
    );
    document(PAGE_TITLE, &body, &footer)
}

/// Wrap body content in a standalone HTML document.
pub fn document(title: &str, body: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header><h1><span>Netflix</span> Data Analysis Dashboard</h1><div>Interactive insights into Netflix's content strategy</div></header>
<main>{body}</main>
<footer style="text-align: center; color: gray; padding: 16px;">{footer}</footer>
</body>
</html>
"#,
        title = escape_html(title),
        style = charts::STYLESHEET,
        body = body,
        footer = escape_html(footer),
    )
}

/// `1234567` as `1,234,567`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Query string with `tab` replaced.
fn with_tab(raw_query: &str, tab: Tab) -> String {
    let mut parts: Vec<&str> = raw_query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("tab="))
        .collect();
    let tab_param = format!("tab={}", tab.slug());
    parts.push(&tab_param);
    parts.join("&")
}

fn tab_nav(active: Tab, raw_query: &str) -> String {
    let mut s = String::from(r#"<nav class="tabs">"#);
    for tab in Tab::ALL {
        let class = if tab == active { r#" class="active""# } else { "" };
        let _ = write!(
            s,
            r#"<a href="/?{}"{class}>{}</a>"#,
            escape_html(&with_tab(raw_query, tab)),
            tab.label()
        );
    }
    s.push_str("</nav>");
    s
}

fn metrics(summary: &Summary) -> String {
    let mut s = String::from(r#"<div class="metrics">"#);
    for (name, value) in [
        ("Total Titles", summary.total),
        ("Movies", summary.movies),
        ("TV Shows", summary.tv_shows),
        ("Countries", summary.countries),
    ] {
        let _ = write!(
            s,
            r#"<div class="metric"><div class="value">{}</div><div class="name">{name}</div></div>"#,
            thousands(value)
        );
    }
    s.push_str("</div>");
    s
}

fn multi_select(label: &str, name: &str, options: &[String], selected: &[String]) -> String {
    let mut s = format!(
        r#"<label for="{name}">{label}</label><select id="{name}" name="{name}" multiple size="6">"#
    );
    for opt in options {
        let sel = if selected.iter().any(|v| v.eq_ignore_ascii_case(opt)) { " selected" } else { "" };
        let _ = write!(
            s,
            r#"<option value="{v}"{sel}>{v}</option>"#,
            v = escape_html(opt)
        );
    }
    s.push_str("</select>");
    s
}

fn sidebar(state: &AppState, query: &FilterQuery, filter: &FilterState, raw_query: &str) -> String {
    let options = &state.catalog.options;
    // Empty inputs when no range applies, so submitting unchanged keeps it off
    let (lo, hi) = match filter.year_range {
        Some((lo, hi)) => (lo.to_string(), hi.to_string()),
        None => (String::new(), String::new()),
    };

    let mut s = String::from(r#"<aside><h3>Filters &amp; Options</h3><form method="get" action="/">"#);
    let _ = write!(
        s,
        r#"<input type="hidden" name="tab" value="{}">"#,
        query.tab().slug()
    );

    let types: Vec<String> = options.types.iter().map(|t| t.label().to_string()).collect();
    let selected: Vec<String> = filter.types.iter().map(|t| t.label().to_string()).collect();
    s.push_str(&multi_select("Select Content Type", "type", &types, &selected));

    let _ = write!(
        s,
        r#"<label>Year Added Range</label><input type="number" name="year_min" min="{bmin}" max="{bmax}" value="{lo}"> to <input type="number" name="year_max" min="{bmin}" max="{bmax}" value="{hi}">"#,
        bmin = options.year_bounds.0,
        bmax = options.year_bounds.1,
    );

    s.push_str(&multi_select("Genres", "genre", &options.genres, &filter.genres));
    s.push_str(&multi_select("Countries", "country", &options.countries, &filter.countries));
    if let Some(q) = query.search() {
        let _ = write!(s, r#"<input type="hidden" name="q" value="{}">"#, escape_html(&q));
    }
    let _ = write!(
        s,
        r#"<p><button type="submit">Apply</button> <a href="/?tab={}">Reset</a></p></form><p><a href="/export.csv?{}">Download filtered data as CSV</a></p></aside>"#,
        query.tab().slug(),
        escape_html(raw_query),
    );
    s
}

fn grid(items: &[String]) -> String {
    format!(r#"<div class="grid">{}</div>"#, items.concat())
}

/// Two-column count table next to a chart.
fn count_table(title: &str, label: &str, count: &str, data: &[LabelCount]) -> String {
    let mut s = format!(
        r#"<figure class="chart"><figcaption>{}</figcaption><table class="data"><tr><th>{}</th><th>{}</th></tr>"#,
        escape_html(title),
        escape_html(label),
        escape_html(count)
    );
    for d in data {
        let _ = write!(s, "<tr><td>{}</td><td>{}</td></tr>", escape_html(&d.label), d.count);
    }
    s.push_str("</table></figure>");
    s
}

pub fn overview_section(view: &AggregateView, top: &TopN) -> String {
    let mut s = String::from("<h2>Content Distribution Overview</h2>");
    s.push_str(&grid(&[
        charts::donut("Movies vs TV Shows Distribution", &view.by_type),
        charts::bar_vertical(&format!("Top {} Content Ratings", top.ratings), &view.ratings),
    ]));
    s.push_str("<h3>Duration Analysis</h3>");
    s.push_str(&grid(&[
        charts::histogram("Movie Duration Distribution (minutes)", &view.duration_histogram, "min"),
        charts::bar_vertical("TV Shows by Number of Seasons", &view.seasons),
    ]));
    s.push_str("<h3>People</h3>");
    s.push_str(&grid(&[
        charts::bar_horizontal(&format!("Top {} Directors", top.directors), &view.directors),
        charts::bar_horizontal(&format!("Top {} Cast Members", top.cast), &view.cast),
    ]));
    s.push_str(&charts::word_cloud("Most Common Title Words", &view.words));
    s
}

pub fn genres_section(view: &AggregateView, top: &TopN) -> String {
    let mut s = String::from("<h2>Genre Analysis</h2>");
    s.push_str(&grid(&[
        charts::bar_horizontal(&format!("Top {} Genres", top.genres), &view.genres),
        count_table("Genre Statistics", "Genre", "Count", &view.genres),
    ]));
    s.push_str(&charts::line(
        &format!("Top {} Genre Trends Over Time", top.trend_genres),
        &view.genre_trends,
    ));
    s
}

pub fn geographic_section(view: &AggregateView, top: &TopN) -> String {
    let mut s = String::from("<h2>Geographic Distribution</h2>");
    s.push_str(&grid(&[
        charts::bar_horizontal(&format!("Top {} Content Producing Countries", top.countries), &view.countries),
        count_table("Country Statistics", "Country", "Titles", &view.countries),
    ]));
    s.push_str(&charts::heat_grid("Netflix Content by Country", &view.countries));
    s
}

pub fn temporal_section(view: &AggregateView) -> String {
    let mut s = String::from("<h2>Temporal Analysis</h2>");
    s.push_str(&charts::stacked_area("Content Added Per Year by Type", &view.by_year_type));
    s.push_str("<h3>Monthly Addition Patterns</h3>");
    s.push_str(&charts::bar_vertical("Content Added by Month", &view.by_month));
    s
}

fn explore_section(query: &FilterQuery, filtered: &[&Title], raw_query: &str) -> String {
    let search = FilterState::default().with_search(query.search());
    let rows = query.rows();

    let mut s = String::from(r#"<h2>Explore Raw Data</h2><form method="get" action="/">"#);
    for (name, values) in [("type", &query.types), ("genre", &query.genres), ("country", &query.countries)] {
        for v in values {
            let _ = write!(s, r#"<input type="hidden" name="{name}" value="{}">"#, escape_html(v));
        }
    }
    for (name, value) in [("year_min", &query.year_min), ("year_max", &query.year_max)] {
        if let Some(v) = value {
            let _ = write!(s, r#"<input type="hidden" name="{name}" value="{}">"#, escape_html(v));
        }
    }
    let _ = write!(
        s,
        r#"<input type="hidden" name="tab" value="explore"><label>Search titles <input type="search" name="q" value="{}"></label> <label>Rows to display <select name="rows">"#,
        escape_html(search.search.as_deref().unwrap_or(""))
    );
    for n in ROW_CHOICES {
        let sel = if n == rows { " selected" } else { "" };
        let _ = write!(s, r#"<option value="{n}"{sel}>{n}</option>"#);
    }
    s.push_str(r#"</select></label> <button type="submit">Show</button></form>"#);

    let shown: Vec<&Title> = filtered.iter().copied().filter(|t| search.matches(t)).collect();
    if search.search.is_some() {
        let _ = write!(s, "<p>Found {} results</p>", thousands(shown.len()));
    }
    s.push_str(&title_table(&shown[..shown.len().min(rows)]));
    let _ = write!(
        s,
        r#"<p><a href="/export.csv?{}">Download Filtered Data as CSV</a> ({} rows)</p>"#,
        escape_html(raw_query),
        thousands(filtered.len())
    );
    s
}

fn title_table(titles: &[&Title]) -> String {
    if titles.is_empty() {
        return format!(r#"<div class="empty">{}</div>"#, charts::EMPTY_MESSAGE);
    }
    let mut s = String::from(
        r#"<table class="data"><tr><th>ID</th><th>Title</th><th>Type</th><th>Director</th><th>Country</th><th>Date Added</th><th>Release Year</th><th>Rating</th><th>Duration</th><th>Genres</th></tr>"#,
    );
    for t in titles {
        let _ = write!(
            s,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&t.show_id),
            escape_html(&t.title),
            t.content_type,
            escape_html(&t.director),
            escape_html(&t.countries.join(", ")),
            t.date_added.map(|d| d.to_string()).unwrap_or_default(),
            t.release_year.map(|y| y.to_string()).unwrap_or_default(),
            escape_html(&t.rating),
            t.duration.map(|d| d.to_string()).unwrap_or_default(),
            escape_html(&t.listed_in.join(", ")),
        );
    }
    s.push_str("</table>");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::filter::tests::fixture;

    fn state() -> AppState {
        AppState {
            catalog: Catalog::from_titles(fixture(), "fixture.csv"),
            top: TopN::default(),
        }
    }

    fn query(tab: &str) -> FilterQuery {
        FilterQuery {
            tab: Some(tab.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(7787), "7,787");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_with_tab_replaces_existing() {
        assert_eq!(with_tab("type=Movie&tab=genres", Tab::Temporal), "type=Movie&tab=temporal");
        assert_eq!(with_tab("", Tab::Overview), "tab=overview");
    }

    #[test]
    fn test_metrics_header() {
        let html = render(&state(), &query("overview"), "");
        // s6 has no year_added and falls outside the default range
        assert!(html.contains(r#"<div class="value">9</div><div class="name">Total Titles</div>"#));
        assert!(html.contains(r#"<div class="value">5</div><div class="name">TV Shows</div>"#));
        assert!(html.contains("Movies vs TV Shows Distribution"));
    }

    #[test]
    fn test_explore_search_and_rows() {
        let mut q = query("explore");
        q.q = Some("s1".into());
        q.rows = Some("10".into());
        let html = render(&state(), &q, "tab=explore&q=s1&rows=10");
        // "Title s1" and "Title s10"
        assert!(html.contains("Found 2 results"));
        assert!(html.contains(r#"<option value="10" selected>"#));
        // export still covers the whole filtered set
        assert!(html.contains("(9 rows)"));
    }

    #[test]
    fn test_explore_limits_rows() {
        let mut q = query("explore");
        q.rows = Some("10".into());
        let mut s = state();
        s.catalog = Catalog::from_titles(fixture().into_iter().cycle().take(30).collect(), "big.csv");
        let html = render(&s, &q, "");
        assert_eq!(html.matches("<tr><td>").count(), 10);
    }

    #[test]
    fn test_undated_catalog_leaves_year_inputs_empty() {
        let mut titles = fixture();
        for t in &mut titles {
            t.date_added = None;
            t.year_added = None;
            t.month_added = None;
        }
        let mut s = state();
        s.catalog = Catalog::from_titles(titles, "undated.csv");
        let html = render(&s, &query("overview"), "");
        assert!(html.contains(r#"name="year_min" min="2008" max="2021" value="""#));
        assert!(html.contains(r#"<div class="value">10</div><div class="name">Total Titles</div>"#));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut q = query("explore");
        q.q = Some("<script>".into());
        let html = render(&state(), &q, "q=%3Cscript%3E");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
