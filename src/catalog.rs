use std::path::{Path, PathBuf};

use crate::cleaner::{clean_table, CleanReport};
use crate::filter::FilterOptions;
use crate::loader::{load_first, LoadError, RawTable};
use crate::models::Title;
use crate::schema::{normalize, AliasTable, SchemaReport};
use crate::store;

/// The cleaned, immutable table every view reads from.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub titles: Vec<Title>,
    pub source: PathBuf,
    pub schema: SchemaReport,
    pub cleaning: CleanReport,
    pub options: FilterOptions,
}

impl Catalog {
    /// Normalize and clean a raw table.
    pub fn from_raw(raw: RawTable, aliases: &AliasTable) -> Self {
        let source = raw.source.clone();
        let (table, schema) = normalize(raw, aliases);
        schema.log_diagnostics(&source);
        let (titles, cleaning) = clean_table(&table);
        Self::assemble(titles, source, schema, cleaning)
    }

    /// Wrap already-clean titles.
    pub fn from_titles(titles: Vec<Title>, source: impl Into<PathBuf>) -> Self {
        let cleaning = CleanReport {
            rows: titles.len(),
            ..Default::default()
        };
        Self::assemble(titles, source.into(), SchemaReport::default(), cleaning)
    }

    fn assemble(titles: Vec<Title>, source: PathBuf, schema: SchemaReport, cleaning: CleanReport) -> Self {
        let options = FilterOptions::from_titles(&titles);
        Self {
            titles,
            source,
            schema,
            cleaning,
            options,
        }
    }

    /// Load the first usable candidate and clean it.
    pub fn load(candidates: &[PathBuf], aliases: &AliasTable) -> Result<Self, LoadError> {
        let raw = load_first(candidates)?;
        Ok(Self::from_raw(raw, aliases))
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn loaded_from(&self, path: &Path) -> bool {
        same_file(&self.source, path)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Load, clean, and refresh the cleaned cache unless the cache itself was the source.
///
/// A cache write failure is logged and does not stop the pipeline.
pub fn prepare(candidates: &[PathBuf], aliases: &AliasTable, cleaned_path: &Path) -> Result<Catalog, LoadError> {
    let catalog = Catalog::load(candidates, aliases)?;
    if !catalog.loaded_from(cleaned_path) {
        if let Err(e) = store::write_cleaned(cleaned_path, &catalog.titles) {
            log::warn!("Could not write cleaned table to {}: {}", cleaned_path.display(), e);
        }
    }
    Ok(catalog)
}
