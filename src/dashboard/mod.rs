//! Interactive dashboard: every request re-filters the shared cleaned table,
//! re-aggregates, and re-renders. Filter state travels in the query string,
//! so each browser session owns its own and the server keeps none.

pub mod page;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::aggregate::{AggregateView, TopN};
use crate::catalog::Catalog;
use crate::filter::{FilterOptions, FilterState};
use crate::models::ContentType;
use crate::store;

/// Choices offered for the Explore tab's table length.
pub const ROW_CHOICES: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_ROWS: usize = 25;

/// Shared, read-only state behind every request.
pub struct AppState {
    pub catalog: Catalog,
    pub top: TopN,
}

type SharedState = Arc<AppState>;

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Genres,
    Geographic,
    Temporal,
    Explore,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Overview, Tab::Genres, Tab::Geographic, Tab::Temporal, Tab::Explore];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Genres => "genres",
            Self::Geographic => "geographic",
            Self::Temporal => "temporal",
            Self::Explore => "explore",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Genres => "Genres",
            Self::Geographic => "Geographic",
            Self::Temporal => "Temporal",
            Self::Explore => "Explore Data",
        }
    }

    /// Unknown or absent slugs fall back to the overview.
    pub fn from_slug(slug: Option<&str>) -> Self {
        slug.and_then(|s| Self::ALL.into_iter().find(|t| t.slug() == s))
            .unwrap_or(Self::Overview)
    }
}

/// Query-string form of the filter controls. Repeated keys carry multi-selects
/// (`?type=Movie&type=TV+Show`). Numeric fields are read leniently: an empty
/// or malformed value is the same as an absent one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "genre")]
    pub genres: Vec<String>,
    #[serde(rename = "country")]
    pub countries: Vec<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub q: Option<String>,
    pub tab: Option<String>,
    pub rows: Option<String>,
}

fn parse_num<T: std::str::FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}

impl FilterQuery {
    pub fn year_min(&self) -> Option<i32> {
        parse_num(&self.year_min)
    }

    pub fn year_max(&self) -> Option<i32> {
        parse_num(&self.year_max)
    }

    pub fn tab(&self) -> Tab {
        Tab::from_slug(self.tab.as_deref())
    }

    /// Rows shown in the Explore table, snapped to an offered choice.
    pub fn rows(&self) -> usize {
        parse_num(&self.rows)
            .filter(|n| ROW_CHOICES.contains(n))
            .unwrap_or(DEFAULT_ROWS)
    }

    pub fn search(&self) -> Option<String> {
        self.q.clone()
    }

    /// The sidebar filters. Title search is left out: it narrows only the
    /// Explore table, not the charts or the export.
    ///
    /// The year range always applies once the catalog has dates, defaulting
    /// to the full bounds, so the first render matches the pre-filled form.
    pub fn to_filter(&self, options: &FilterOptions) -> FilterState {
        let types: Vec<ContentType> = self
            .types
            .iter()
            .filter_map(|s| ContentType::ALL.into_iter().find(|ct| ct.label().eq_ignore_ascii_case(s.trim())))
            .collect();

        let mut filter = FilterState::default()
            .with_types(types)
            .with_genres(self.genres.iter().filter(|g| !g.trim().is_empty()).cloned())
            .with_countries(self.countries.iter().filter(|c| !c.trim().is_empty()).cloned());

        if options.has_dates || self.year_min().is_some() || self.year_max().is_some() {
            let (lo, hi) = options.year_bounds;
            filter = filter.with_year_range(self.year_min().unwrap_or(lo), self.year_max().unwrap_or(hi));
        }
        filter
    }
}

/// Build the dashboard router.
pub fn make_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/export.csv", get(export_csv))
        .route("/api/summary", get(summary))
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state))
}

async fn index(
    State(state): State<SharedState>,
    Query(query): Query<FilterQuery>,
    RawQuery(raw): RawQuery,
) -> Html<String> {
    Html(page::render(&state, &query, raw.as_deref().unwrap_or("")))
}

async fn export_csv(State(state): State<SharedState>, Query(query): Query<FilterQuery>) -> Response {
    let catalog = &state.catalog;
    let filtered = query.to_filter(&catalog.options).apply(&catalog.titles);
    match store::to_csv_bytes(filtered.iter().copied()) {
        Ok(bytes) => {
            let name = store::export_file_name(chrono::Local::now().date_naive());
            log::debug!("Exporting {} rows as {}", filtered.len(), name);
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Export failed: {e}")).into_response()
        }
    }
}

async fn summary(State(state): State<SharedState>, Query(query): Query<FilterQuery>) -> Json<AggregateView> {
    let catalog = &state.catalog;
    let filtered = query.to_filter(&catalog.options).apply(&catalog.titles);
    Json(AggregateView::compute(&filtered, &state.top))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Bind a listener. `host` may be a name such as `localhost` or a bare IPv6
/// literal such as `::1`.
pub async fn bind(host: &str, port: u16) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let listener = bind(host, port).await?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    let app = make_app(state);
    println!("Dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.");
    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}

/// Run the dashboard on a single-threaded runtime.
pub fn run(state: AppState, host: &str, port: u16) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    rt.block_on(serve(state, host, port))
}
