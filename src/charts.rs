//! Self-contained chart rendering: every chart is an HTML fragment with
//! inline SVG, so pages need no script or external assets.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;

use crate::aggregate::{Bin, YearCount};
use crate::models::LabelCount;

pub const EMPTY_MESSAGE: &str = "No data for the current filters";

const WIDTH: f64 = 640.0;
const PLOT_HEIGHT: f64 = 280.0;
const MARGIN: f64 = 40.0;

/// Series colours, cycled.
pub const PALETTE: [&str; 10] = [
    "#e50914", "#221f1f", "#f5c518", "#1f77b4", "#2ca02c",
    "#9467bd", "#8c564b", "#e377c2", "#17becf", "#bcbd22",
];

/// Shared stylesheet for the dashboard and the static report.
pub const STYLESHEET: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; color: #221f1f; background: #f7f7f7; }
header { background: #141414; color: #fff; padding: 12px 24px; }
header h1 { margin: 0; font-size: 22px; }
header h1 span { color: #e50914; }
main { padding: 16px 24px; }
.layout { display: flex; gap: 16px; }
aside { width: 260px; flex-shrink: 0; background: #fff; padding: 12px; border-radius: 6px; }
aside label { display: block; font-weight: 600; margin-top: 10px; }
aside select { width: 100%; }
.content { flex: 1; min-width: 0; }
.metrics { display: flex; gap: 12px; margin-bottom: 16px; }
.metric { flex: 1; background: #fff; border-radius: 6px; padding: 12px; }
.metric .value { font-size: 28px; font-weight: 700; }
.metric .name { color: #666; font-size: 13px; }
nav.tabs a { display: inline-block; padding: 8px 14px; text-decoration: none; color: #221f1f; border-bottom: 3px solid transparent; }
nav.tabs a.active { border-bottom-color: #e50914; font-weight: 600; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(520px, 1fr)); gap: 16px; }
figure.chart { background: #fff; margin: 0; padding: 12px; border-radius: 6px; }
figure.chart figcaption { font-weight: 600; margin-bottom: 8px; }
figure.chart svg { width: 100%; height: auto; }
.empty { color: #888; font-style: italic; padding: 32px; text-align: center; }
.heat-grid { display: grid; grid-template-columns: repeat(5, 1fr); gap: 4px; }
.heat-cell { padding: 8px; border-radius: 4px; font-size: 12px; }
.heat-cell b { display: block; font-size: 15px; }
.word-cloud { line-height: 1.4; text-align: center; }
.word-cloud span { display: inline-block; margin: 2px 6px; }
table.data { border-collapse: collapse; width: 100%; background: #fff; font-size: 13px; }
table.data th, table.data td { border-bottom: 1px solid #eee; padding: 4px 6px; text-align: left; vertical-align: top; }
.notice { background: #fff3cd; padding: 8px 12px; border-radius: 4px; margin-bottom: 12px; }
"#;

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

fn figure(title: &str, body: &str) -> String {
    format!(
        r#"<figure class="chart"><figcaption>{}</figcaption>{}</figure>"#,
        escape_html(title),
        body
    )
}

/// Placeholder shown in place of a chart with nothing to draw.
pub fn empty(title: &str) -> String {
    figure(title, &format!(r#"<div class="empty">{EMPTY_MESSAGE}</div>"#))
}

fn svg_open(height: f64) -> String {
    format!(
        r#"<svg viewBox="0 0 {WIDTH} {height:.0}" xmlns="http://www.w3.org/2000/svg" font-size="11">"#
    )
}

fn max_count<'a>(counts: impl Iterator<Item = &'a usize>) -> f64 {
    counts.copied().max().unwrap_or(0).max(1) as f64
}

/// Ranked horizontal bars, largest first.
pub fn bar_horizontal(title: &str, data: &[LabelCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let row = 22.0;
    let label_w = 180.0;
    let bar_w = WIDTH - label_w - 60.0;
    let max = max_count(data.iter().map(|d| &d.count));

    let mut s = svg_open(data.len() as f64 * row + 10.0);
    for (i, d) in data.iter().enumerate() {
        let y = 5.0 + i as f64 * row;
        let w = d.count as f64 / max * bar_w;
        let _ = write!(
            s,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text><rect x="{label_w}" y="{:.1}" width="{w:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect><text x="{:.1}" y="{:.1}">{}</text>"#,
            label_w - 6.0,
            y + 14.0,
            escape_html(&d.label),
            y + 2.0,
            row - 6.0,
            color(0),
            escape_html(&d.label),
            d.count,
            label_w + w + 4.0,
            y + 14.0,
            d.count,
        );
    }
    s.push_str("</svg>");
    figure(title, &s)
}

/// Vertical bars in the given order.
pub fn bar_vertical(title: &str, data: &[LabelCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let max = max_count(data.iter().map(|d| &d.count));
    let slot = (WIDTH - 2.0 * MARGIN) / data.len() as f64;

    let mut s = svg_open(PLOT_HEIGHT + 90.0);
    axis(&mut s, max);
    for (i, d) in data.iter().enumerate() {
        let h = d.count as f64 / max * PLOT_HEIGHT;
        let x = MARGIN + i as f64 * slot;
        let cx = x + slot / 2.0;
        let base = MARGIN / 2.0 + PLOT_HEIGHT;
        let _ = write!(
            s,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{h:.1}" fill="{}"><title>{}: {}</title></rect><text x="{cx:.1}" y="{:.1}" text-anchor="end" transform="rotate(-40 {cx:.1} {:.1})">{}</text>"#,
            x + slot * 0.1,
            base - h,
            slot * 0.8,
            color(0),
            escape_html(&d.label),
            d.count,
            base + 14.0,
            base + 14.0,
            escape_html(&d.label),
        );
    }
    s.push_str("</svg>");
    figure(title, &s)
}

/// Left axis line with the max count as a tick.
fn axis(s: &mut String, max: f64) {
    let top = MARGIN / 2.0;
    let base = top + PLOT_HEIGHT;
    let _ = write!(
        s,
        r##"<line x1="{MARGIN}" y1="{top}" x2="{MARGIN}" y2="{base}" stroke="#999"/><line x1="{MARGIN}" y1="{base}" x2="{:.1}" y2="{base}" stroke="#999"/><text x="{:.1}" y="{:.1}" text-anchor="end">{max:.0}</text><text x="{:.1}" y="{base}" text-anchor="end">0</text>"##,
        WIDTH - MARGIN,
        MARGIN - 4.0,
        top + 4.0,
        MARGIN - 4.0,
    );
}

/// Year-by-series matrix: (years ascending, series in first-seen order, counts[series][year]).
fn pivot(data: &[YearCount]) -> (Vec<i32>, Vec<String>, Vec<Vec<usize>>) {
    let years: Vec<i32> = data.iter().map(|d| d.year).collect::<BTreeSet<_>>().into_iter().collect();
    let mut series: Vec<String> = Vec::new();
    for d in data {
        if !series.contains(&d.series) {
            series.push(d.series.clone());
        }
    }
    let mut counts = vec![vec![0usize; years.len()]; series.len()];
    for d in data {
        let (Some(si), Ok(yi)) = (series.iter().position(|s| *s == d.series), years.binary_search(&d.year)) else {
            continue;
        };
        counts[si][yi] += d.count;
    }
    (years, series, counts)
}

fn x_for(years: &[i32], i: usize) -> f64 {
    let plot_w = WIDTH - 2.0 * MARGIN;
    if years.len() <= 1 {
        MARGIN + plot_w / 2.0
    } else {
        MARGIN + i as f64 / (years.len() - 1) as f64 * plot_w
    }
}

fn year_ticks(s: &mut String, years: &[i32]) {
    let base = MARGIN / 2.0 + PLOT_HEIGHT;
    let step = years.len().div_ceil(12).max(1);
    for (i, y) in years.iter().enumerate().step_by(step) {
        let _ = write!(
            s,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{y}</text>"#,
            x_for(years, i),
            base + 14.0
        );
    }
}

fn legend(s: &mut String, series: &[String], y: f64) {
    let mut x = MARGIN;
    for (i, name) in series.iter().enumerate() {
        let _ = write!(
            s,
            r#"<rect x="{x:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{y:.1}">{}</text>"#,
            y - 9.0,
            color(i),
            x + 14.0,
            escape_html(name),
        );
        x += 24.0 + name.chars().count() as f64 * 6.5;
    }
}

/// One line per series over years.
pub fn line(title: &str, data: &[YearCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let (years, series, counts) = pivot(data);
    let max = max_count(counts.iter().flatten());
    let base = MARGIN / 2.0 + PLOT_HEIGHT;

    let mut s = svg_open(PLOT_HEIGHT + 70.0);
    axis(&mut s, max);
    year_ticks(&mut s, &years);
    for (si, row) in counts.iter().enumerate() {
        let points: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(yi, c)| format!("{:.1},{:.1}", x_for(&years, yi), base - *c as f64 / max * PLOT_HEIGHT))
            .collect();
        let _ = write!(
            s,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"><title>{}</title></polyline>"#,
            points.join(" "),
            color(si),
            escape_html(&series[si]),
        );
        for (yi, c) in row.iter().enumerate() {
            let _ = write!(
                s,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"><title>{} {}: {c}</title></circle>"#,
                x_for(&years, yi),
                base - *c as f64 / max * PLOT_HEIGHT,
                color(si),
                escape_html(&series[si]),
                years[yi],
            );
        }
    }
    legend(&mut s, &series, PLOT_HEIGHT + 60.0);
    s.push_str("</svg>");
    figure(title, &s)
}

/// Series stacked on top of each other over years.
pub fn stacked_area(title: &str, data: &[YearCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let (years, series, counts) = pivot(data);
    let totals: Vec<usize> = (0..years.len()).map(|yi| counts.iter().map(|r| r[yi]).sum()).collect();
    let max = max_count(totals.iter());
    let base = MARGIN / 2.0 + PLOT_HEIGHT;
    let y_at = |v: usize| base - v as f64 / max * PLOT_HEIGHT;

    let mut s = svg_open(PLOT_HEIGHT + 70.0);
    axis(&mut s, max);
    year_ticks(&mut s, &years);
    let mut lower = vec![0usize; years.len()];
    for (si, row) in counts.iter().enumerate() {
        let upper: Vec<usize> = lower.iter().zip(row).map(|(l, c)| l + c).collect();
        let mut points: Vec<String> = Vec::with_capacity(years.len() * 2);
        for (yi, v) in upper.iter().enumerate() {
            points.push(format!("{:.1},{:.1}", x_for(&years, yi), y_at(*v)));
        }
        for (yi, v) in lower.iter().enumerate().rev() {
            points.push(format!("{:.1},{:.1}", x_for(&years, yi), y_at(*v)));
        }
        let _ = write!(
            s,
            r#"<polygon points="{}" fill="{}" fill-opacity="0.8" stroke="{}"><title>{}</title></polygon>"#,
            points.join(" "),
            color(si),
            color(si),
            escape_html(&series[si]),
        );
        lower = upper;
    }
    legend(&mut s, &series, PLOT_HEIGHT + 60.0);
    s.push_str("</svg>");
    figure(title, &s)
}

/// Share of the whole as a donut.
pub fn donut(title: &str, data: &[LabelCount]) -> String {
    let total: usize = data.iter().map(|d| d.count).sum();
    if total == 0 {
        return empty(title);
    }
    let r = 90.0;
    let circumference = 2.0 * std::f64::consts::PI * r;
    let (cx, cy) = (160.0, 130.0);

    let mut s = svg_open(270.0);
    let mut offset = 0.0;
    for (i, d) in data.iter().enumerate() {
        let share = d.count as f64 / total as f64;
        let len = share * circumference;
        let _ = write!(
            s,
            r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="none" stroke="{}" stroke-width="50" stroke-dasharray="{len:.2} {:.2}" stroke-dashoffset="{:.2}" transform="rotate(-90 {cx} {cy})"><title>{}: {} ({:.1}%)</title></circle>"#,
            color(i),
            circumference - len,
            -offset,
            escape_html(&d.label),
            d.count,
            share * 100.0,
        );
        offset += len;
        let ly = 30.0 + i as f64 * 20.0;
        let _ = write!(
            s,
            r#"<rect x="320" y="{:.1}" width="12" height="12" fill="{}"/><text x="338" y="{ly:.1}">{} {} ({:.1}%)</text>"#,
            ly - 10.0,
            color(i),
            escape_html(&d.label),
            d.count,
            share * 100.0,
        );
    }
    s.push_str("</svg>");
    figure(title, &s)
}

/// Adjacent equal-width bins.
pub fn histogram(title: &str, bins: &[Bin], unit: &str) -> String {
    if bins.iter().all(|b| b.count == 0) {
        return empty(title);
    }
    let max = max_count(bins.iter().map(|b| &b.count));
    let slot = (WIDTH - 2.0 * MARGIN) / bins.len() as f64;
    let base = MARGIN / 2.0 + PLOT_HEIGHT;

    let mut s = svg_open(PLOT_HEIGHT + 50.0);
    axis(&mut s, max);
    for (i, b) in bins.iter().enumerate() {
        let h = b.count as f64 / max * PLOT_HEIGHT;
        let _ = write!(
            s,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{h:.1}" fill="{}" stroke="#fff"><title>{:.0}-{:.0} {}: {}</title></rect>"##,
            MARGIN + i as f64 * slot,
            base - h,
            slot,
            color(0),
            b.start,
            b.end,
            escape_html(unit),
            b.count,
        );
    }
    if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
        let _ = write!(
            s,
            r#"<text x="{MARGIN}" y="{:.1}" text-anchor="middle">{:.0}</text><text x="{:.1}" y="{:.1}" text-anchor="middle">{:.0} {}</text>"#,
            base + 14.0,
            first.start,
            WIDTH - MARGIN,
            base + 14.0,
            last.end,
            escape_html(unit),
        );
    }
    s.push_str("</svg>");
    figure(title, &s)
}

/// Country shading by count; a grid stands in for a world map.
pub fn heat_grid(title: &str, data: &[LabelCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let max = max_count(data.iter().map(|d| &d.count));
    let mut s = String::from(r#"<div class="heat-grid">"#);
    for d in data {
        let alpha = 0.15 + 0.85 * d.count as f64 / max;
        let text = if alpha > 0.55 { "#fff" } else { "#221f1f" };
        let _ = write!(
            s,
            r#"<div class="heat-cell" style="background: rgba(229, 9, 20, {alpha:.2}); color: {text}" title="{}: {}"><b>{}</b>{}</div>"#,
            escape_html(&d.label),
            d.count,
            d.count,
            escape_html(&d.label),
        );
    }
    s.push_str("</div>");
    figure(title, &s)
}

/// Words sized by frequency.
pub fn word_cloud(title: &str, data: &[LabelCount]) -> String {
    if data.is_empty() {
        return empty(title);
    }
    let max = data.iter().map(|d| d.count).max().unwrap_or(1);
    let min = data.iter().map(|d| d.count).min().unwrap_or(1);
    let span = (max - min).max(1) as f64;

    let mut s = String::from(r#"<div class="word-cloud">"#);
    for (i, d) in data.iter().enumerate() {
        let size = 12.0 + 36.0 * (d.count - min) as f64 / span;
        let _ = write!(
            s,
            r#"<span style="font-size: {size:.0}px; color: {}" title="{}">{}</span>"#,
            color(i),
            d.count,
            escape_html(&d.label),
        );
    }
    s.push_str("</div>");
    figure(title, &s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> Vec<LabelCount> {
        pairs.iter().map(|(l, c)| LabelCount::new(*l, *c)).collect()
    }

    fn series() -> Vec<YearCount> {
        [(2019, "Movie", 4), (2019, "TV Show", 2), (2020, "Movie", 1), (2021, "TV Show", 3)]
            .iter()
            .map(|(year, s, count)| YearCount { year: *year, series: s.to_string(), count: *count })
            .collect()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
    }

    #[test]
    fn test_empty_inputs_render_placeholder() {
        let none: Vec<LabelCount> = Vec::new();
        for html in [
            bar_horizontal("Genres", &none),
            bar_vertical("Ratings", &none),
            line("Trend", &[]),
            stacked_area("Added", &[]),
            donut("Types", &none),
            histogram("Runtime", &[], "min"),
            heat_grid("Countries", &none),
            word_cloud("Words", &none),
        ] {
            assert!(html.contains(EMPTY_MESSAGE), "{html}");
            assert!(!html.contains("<svg"));
        }
    }

    #[test]
    fn test_bar_horizontal_draws_one_bar_per_label() {
        let html = bar_horizontal("Top <Genres>", &counts(&[("Dramas", 5), ("Comedies", 3)]));
        assert_eq!(html.matches("<rect").count(), 2);
        assert!(html.contains("Top &lt;Genres&gt;"));
        assert!(html.contains("<title>Dramas: 5</title>"));
    }

    #[test]
    fn test_donut_shares() {
        let html = donut("Types", &counts(&[("Movie", 3), ("TV Show", 1)]));
        assert!(html.contains("Movie: 3 (75.0%)"));
        assert!(html.contains("TV Show: 1 (25.0%)"));
        assert!(donut("Types", &counts(&[("Movie", 0)])).contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_line_and_area_have_no_nan() {
        let data = series();
        for html in [line("Trend", &data), stacked_area("Added", &data)] {
            assert!(!html.contains("NaN"));
            assert!(html.contains(">2019<"));
            assert!(html.contains(">2021<"));
        }
        let single = vec![YearCount { year: 2020, series: "Movie".into(), count: 1 }];
        assert!(!line("One", &single).contains("NaN"));
    }

    #[test]
    fn test_pivot_fills_missing_years() {
        let (years, names, counts) = pivot(&series());
        assert_eq!(years, vec![2019, 2020, 2021]);
        assert_eq!(names, vec!["Movie", "TV Show"]);
        assert_eq!(counts, vec![vec![4, 1, 0], vec![2, 0, 3]]);
    }

    #[test]
    fn test_histogram() {
        let bins = vec![
            Bin { start: 60.0, end: 90.0, count: 2 },
            Bin { start: 90.0, end: 120.0, count: 0 },
        ];
        let html = histogram("Runtime", &bins, "min");
        assert_eq!(html.matches("<rect").count(), 2);
        assert!(html.contains("120 min"));
        let zeros = vec![Bin { start: 0.0, end: 1.0, count: 0 }];
        assert!(histogram("Runtime", &zeros, "min").contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_heat_grid_and_word_cloud() {
        let html = heat_grid("Countries", &counts(&[("United States", 10), ("India", 5)]));
        assert_eq!(html.matches("heat-cell").count(), 2);
        assert!(html.contains("rgba(229, 9, 20, 1.00)"));

        let cloud = word_cloud("Words", &counts(&[("love", 4), ("life", 1)]));
        assert!(cloud.contains("font-size: 48px"));
        assert!(cloud.contains("font-size: 12px"));
    }
}
