use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::aggregate::TopN;
use crate::schema::FieldAliasConfig;

/// Application configuration loaded from TOML config file.
/// All fields have defaults, so the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Raw dataset files tried in order after the cleaned cache.
    pub data_paths: Vec<PathBuf>,
    /// Where the cleaned table is persisted and reloaded from.
    pub cleaned_path: PathBuf,
    /// Default output of the `report` command.
    pub report_path: PathBuf,
    pub dashboard: DashboardConfig,
    pub top_n: TopN,
    pub schema: SchemaConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_paths: crate::DEFAULT_DATA_PATHS.iter().map(PathBuf::from).collect(),
            cleaned_path: PathBuf::from(crate::DEFAULT_CLEANED_PATH),
            report_path: PathBuf::from(crate::DEFAULT_REPORT_PATH),
            dashboard: DashboardConfig::default(),
            top_n: TopN::default(),
            schema: SchemaConfig::default(),
        }
    }
}

/// Dashboard server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Extra column aliases, merged with the built-in table.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SchemaConfig {
    pub fields: Vec<FieldAliasConfig>,
}

impl AppConfig {
    /// Load config from `path`, or from `~/.config/flixlens/config.toml`.
    /// Returns default config if the file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).or_else(Self::config_path);
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => {
                log::debug!("No config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Loader candidates in priority order: CLI path, cleaned cache, raw datasets.
    pub fn candidate_paths(&self, data_override: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.data_paths.len() + 2);
        if let Some(p) = data_override {
            paths.push(p.to_path_buf());
        }
        paths.push(self.cleaned_path.clone());
        for p in &self.data_paths {
            if !paths.contains(p) {
                paths.push(p.clone());
            }
        }
        paths
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard.port, 8501);
        assert_eq!(config.top_n.genres, 15);
        assert_eq!(config.top_n.countries, 20);
        assert_eq!(config.cleaned_path, PathBuf::from("outputs/cleaned_netflix.csv"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            data_paths = ["data/titles.csv"]

            [dashboard]
            port = 9000

            [top_n]
            genres = 5

            [[schema.fields]]
            name = "listed_in"
            aliases = ["categories"]
            "#,
        )
        .unwrap();
        assert_eq!(config.data_paths, vec![PathBuf::from("data/titles.csv")]);
        assert_eq!(config.dashboard.port, 9000);
        assert_eq!(config.dashboard.host, "127.0.0.1");
        assert_eq!(config.top_n.genres, 5);
        assert_eq!(config.top_n.ratings, 10);
        assert_eq!(config.schema.fields[0].aliases, vec!["categories"]);
        assert!(!config.schema.fields[0].replace);
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_paths = 7").unwrap();
        let config = AppConfig::load(Some(&path));
        assert_eq!(config.dashboard.port, 8501);

        let missing = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert_eq!(missing.top_n, TopN::default());
    }

    #[test]
    fn test_candidate_order() {
        let config = AppConfig::default();
        let paths = config.candidate_paths(Some(Path::new("mine.csv")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("mine.csv"),
                PathBuf::from("outputs/cleaned_netflix.csv"),
                PathBuf::from("Netflix Dataset.csv"),
                PathBuf::from("netflix_titles.csv"),
            ]
        );
        assert_eq!(config.candidate_paths(None)[0], config.cleaned_path);
    }
}
