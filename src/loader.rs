use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(
        "Dataset not found. Checked: {}. Place 'Netflix Dataset.csv' in the working directory, \
         run `flixlens clean`, or pass --data <path>.",
        display_paths(checked)
    )]
    DatasetNotFound { checked: Vec<PathBuf> },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path}: file has no header row")]
    NoHeader { path: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A tabular file exactly as read: header row plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Cell at `row`/`col`, or "" when the row was shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Return the first candidate that exists and parses as a delimited table.
pub fn load_first(candidates: &[PathBuf]) -> Result<RawTable, LoadError> {
    for path in candidates {
        if !path.is_file() {
            log::debug!("Candidate {} does not exist", path.display());
            continue;
        }
        match read_table(path) {
            Ok(table) => {
                log::info!("Loaded {} rows from {}", table.len(), path.display());
                return Ok(table);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    Err(LoadError::DatasetNotFound {
        checked: candidates.to_vec(),
    })
}

/// Read one delimited file from disk.
pub fn read_table(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path)?;
    from_reader(file, path)
}

/// Parse a delimited table from any reader. Ragged rows are tolerated.
///
/// Cells are decoded as UTF-8 one at a time; invalid bytes become U+FFFD
/// instead of rejecting the file.
pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<RawTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let mut lossy = 0usize;

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| decode_cell(h, &mut lossy).trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeader {
            path: source.display().to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(|c| decode_cell(c, &mut lossy)).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    if lossy > 0 {
        log::warn!(
            "{}: {} cells contained invalid UTF-8 and were decoded lossily",
            source.display(),
            lossy
        );
    }

    Ok(RawTable {
        source: source.to_path_buf(),
        headers,
        rows,
    })
}

fn decode_cell(bytes: &[u8], lossy: &mut usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            *lossy += 1;
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_headers_and_rows() {
        let table = from_reader(
            "Show_Id,Title\ns1,3%\ns2,7:19\n".as_bytes(),
            Path::new("inline.csv"),
        )
        .unwrap();
        assert_eq!(table.headers, vec!["Show_Id", "Title"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 1), "7:19");
    }

    #[test]
    fn test_strips_bom_and_pads_short_rows() {
        let table = from_reader(
            "\u{feff}a, b ,c\n1,2\n".as_bytes(),
            Path::new("inline.csv"),
        )
        .unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let second = write_file(dir.path(), "second.csv", "x\n1\n");
        let third = write_file(dir.path(), "third.csv", "y\n2\n3\n");

        let table = load_first(&[missing, second.clone(), third]).unwrap();
        assert_eq!(table.source, second);
        assert_eq!(table.headers, vec!["x"]);
    }

    #[test]
    fn test_unparsable_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_file(dir.path(), "bad.csv", "\n");
        let good = write_file(dir.path(), "good.csv", "x\n1\n");

        let table = load_first(&[bad, good.clone()]).unwrap();
        assert_eq!(table.source, good);
    }

    #[test]
    fn test_invalid_utf8_cell_keeps_file_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netflix_titles.csv");
        let mut bytes = b"show_id,type,title,description\ns1,Movie,Good,fine\ns2,Movie,Bad,caf".to_vec();
        bytes.push(0xE9);
        bytes.push(b'\n');
        std::fs::write(&path, bytes).unwrap();

        let table = load_first(&[path.clone()]).unwrap();
        assert_eq!(table.source, path);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 2), "Bad");
        assert_eq!(table.cell(1, 3), "caf\u{fffd}");
    }

    #[test]
    fn test_nothing_found_reports_checked_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let err = load_first(&[a.clone()]).unwrap_err();
        match &err {
            LoadError::DatasetNotFound { checked } => assert_eq!(checked, &vec![a]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Dataset not found"));
        assert!(err.to_string().contains("--data"));
    }
}
