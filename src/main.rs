use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flixlens::aggregate::{self, Dimension};
use flixlens::catalog::{self, Catalog};
use flixlens::config::AppConfig;
use flixlens::filter::FilterState;
use flixlens::models::{ContentType, LabelCount, Title};
use flixlens::schema::AliasTable;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flixlens", version, about = "Netflix catalog cleaner, analyzer, and dashboard")]
struct Cli {
    /// Dataset to load instead of the configured candidates
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Config file (defaults to ~/.config/flixlens/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DimensionArg {
    Genres,
    Countries,
    Directors,
    Cast,
    Ratings,
}

impl DimensionArg {
    fn dimension(&self) -> Dimension {
        match self {
            Self::Genres => Dimension::Genre,
            Self::Countries => Dimension::Country,
            Self::Directors => Dimension::Director,
            Self::Cast => Dimension::Cast,
            Self::Ratings => Dimension::Rating,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Movie,
    #[value(name = "tv-show", alias = "tv")]
    TvShow,
    Unknown,
}

impl From<TypeArg> for ContentType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Movie => ContentType::Movie,
            TypeArg::TvShow => ContentType::TvShow,
            TypeArg::Unknown => ContentType::Unknown,
        }
    }
}

/// Filters shared by `top` and `export`.
#[derive(Args)]
struct FilterArgs {
    /// Content type (repeatable)
    #[arg(short = 't', long = "type", value_enum)]
    types: Vec<TypeArg>,

    /// First year added (inclusive)
    #[arg(long)]
    year_from: Option<i32>,

    /// Last year added (inclusive)
    #[arg(long)]
    year_to: Option<i32>,

    /// Genre to include (repeatable, any-of)
    #[arg(short, long)]
    genre: Vec<String>,

    /// Country to include (repeatable, any-of)
    #[arg(short, long)]
    country: Vec<String>,

    /// Title substring (case-insensitive)
    #[arg(short, long)]
    search: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self, catalog: &Catalog) -> FilterState {
        let mut filter = FilterState::default()
            .with_types(self.types.iter().map(|t| ContentType::from(*t)))
            .with_genres(self.genre.iter().cloned())
            .with_countries(self.country.iter().cloned())
            .with_search(self.search.clone());
        if self.year_from.is_some() || self.year_to.is_some() {
            let (lo, hi) = catalog.options.year_bounds;
            filter = filter.with_year_range(self.year_from.unwrap_or(lo), self.year_to.unwrap_or(hi));
        }
        filter
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive dashboard
    Serve {
        /// Address to bind (defaults to config dashboard.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to config dashboard.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Re-clean the raw dataset and rewrite the cleaned cache
    Clean,

    /// Show key catalog metrics
    Stats,

    /// Show the most frequent values of a dimension
    Top {
        /// Which dimension to rank
        #[arg(value_enum, default_value = "genres")]
        dimension: DimensionArg,

        /// Number of results (defaults to the configured N for the dimension)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write filtered titles to a CSV file
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write a static HTML report of every chart for the full catalog
    Report {
        /// Output file (defaults to config report_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load(cli.config.as_deref());
    let aliases = AliasTable::with_overrides(&config.schema.fields);

    match cli.command {
        Commands::Clean => {
            // Never reload the cache we are about to rewrite
            let sources = match &cli.data {
                Some(path) => vec![path.clone()],
                None => config.data_paths.clone(),
            };
            let catalog = Catalog::load(&sources, &aliases).context("Failed to load dataset")?;
            let written = flixlens::store::write_cleaned(&config.cleaned_path, &catalog.titles)
                .context("Failed to write cleaned table")?;
            print_clean_report(&catalog);
            println!("Wrote {} rows to {}", written, config.cleaned_path.display());
        }

        Commands::Serve { host, port } => {
            let catalog = load_catalog(cli.data, &config, &aliases)?;
            let host = host.unwrap_or_else(|| config.dashboard.host.clone());
            let port = port.unwrap_or(config.dashboard.port);
            let state = flixlens::dashboard::AppState {
                catalog,
                top: config.top_n.clone(),
            };
            flixlens::dashboard::run(state, &host, port)?;
        }

        Commands::Stats => {
            let catalog = load_catalog(cli.data, &config, &aliases)?;
            let all: Vec<&Title> = catalog.titles.iter().collect();
            let summary = aggregate::summary(&all);
            let top = &config.top_n;
            println!("Catalog Statistics");
            println!("==================");
            println!("Source:           {}", catalog.source.display());
            println!("Total titles:     {}", summary.total);
            println!("Movies:           {}", summary.movies);
            println!("TV shows:         {}", summary.tv_shows);
            if summary.unknown_type > 0 {
                println!("Unknown type:     {}", summary.unknown_type);
            }
            println!("Countries:        {}", summary.countries);
            println!();

            for (heading, dim) in [
                ("Ratings", Dimension::Rating),
                ("Genres", Dimension::Genre),
                ("Countries", Dimension::Country),
            ] {
                let counts = aggregate::top_dimension(&all, dim, dim.limit(top).min(5));
                if !counts.is_empty() {
                    println!("{}:", heading);
                    for c in &counts {
                        println!("  {:<30} {}", c.label, c.count);
                    }
                    println!();
                }
            }
        }

        Commands::Top { dimension, limit, filters } => {
            let catalog = load_catalog(cli.data, &config, &aliases)?;
            let dim = dimension.dimension();
            let limit = limit.unwrap_or_else(|| dim.limit(&config.top_n));
            let filtered = filters.to_filter(&catalog).apply(&catalog.titles);
            let results = aggregate::top_dimension(&filtered, dim, limit);

            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }

            println!(
                "Top {} {} values across {} titles:",
                results.len(),
                dim.label().to_lowercase(),
                filtered.len()
            );
            println!();
            print_count_table(dim.label(), &results);
        }

        Commands::Export { output, filters } => {
            let catalog = load_catalog(cli.data, &config, &aliases)?;
            let filtered = filters.to_filter(&catalog).apply(&catalog.titles);
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = std::fs::File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            let written = flixlens::store::write_titles(std::io::BufWriter::new(file), filtered)
                .context("Export failed")?;
            println!("Exported {} of {} titles to {}", written, catalog.len(), output.display());
        }

        Commands::Report { output } => {
            let catalog = load_catalog(cli.data, &config, &aliases)?;
            let path = output.unwrap_or_else(|| config.report_path.clone());
            flixlens::report::write_report(&path, &catalog, &config.top_n)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

/// Load the catalog from the first usable candidate, refreshing the cleaned cache.
fn load_catalog(data: Option<PathBuf>, config: &AppConfig, aliases: &AliasTable) -> Result<Catalog> {
    let candidates = config.candidate_paths(data.as_deref());
    let catalog = catalog::prepare(&candidates, aliases, &config.cleaned_path)
        .context("Failed to load dataset")?;
    log::info!("Catalog: {} titles from {}", catalog.len(), catalog.source.display());
    Ok(catalog)
}

/// Print what the cleaner could not interpret.
fn print_clean_report(catalog: &Catalog) {
    let c = &catalog.cleaning;
    println!("Cleaned {} rows from {}", c.rows, catalog.source.display());
    if !catalog.schema.missing.is_empty() {
        let names: Vec<&str> = catalog.schema.missing.iter().map(|f| f.name()).collect();
        println!("  Missing columns:        {}", names.join(", "));
    }
    if c.missing_date_column {
        println!("  No date column: year/month breakdowns will be empty");
    }
    println!("  Unparsable dates:       {}", c.unparsed_dates);
    println!("  Unparsable durations:   {}", c.unparsed_durations);
    println!("  Unknown content types:  {}", c.unknown_types);
}

/// Print a label/count table.
fn print_count_table(heading: &str, rows: &[LabelCount]) {
    println!("{:<40} {:>6}", heading, "Titles");
    println!("{}", "-".repeat(47));

    for r in rows {
        // Truncate long labels
        let label: String = if r.label.chars().count() > 40 {
            format!("{}...", r.label.chars().take(37).collect::<String>())
        } else {
            r.label.clone()
        };
        println!("{:<40} {:>6}", label, r.count);
    }
}
