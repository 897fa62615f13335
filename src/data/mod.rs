use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::category::Category;
use crate::error::ChartError;

pub const EXPECTED_COLUMNS: [&str; 3] = ["timestamp", "value", "classification"];

const CLASSIFICATION_ALIASES: [&str; 2] = ["classification", "value_classification"];
const SECONDARY_ALIASES: [&str; 3] = ["price", "close", "btc_price"];
const MAX_WARNINGS: usize = 20;

/// One index reading. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub classification: String,
    /// Second series for the combined chart (e.g. BTC close).
    pub secondary: Option<f64>,
}

impl Record {
    pub fn from_epoch(ts_secs: i64, value: f64, classification: &str) -> Self {
        Self {
            timestamp: DateTime::<Utc>::from_timestamp(ts_secs, 0).unwrap_or_default(),
            value,
            classification: classification.to_string(),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: f64) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.classification)
    }
}

/// Column positions resolved from the CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub timestamp: usize,
    pub value: usize,
    pub classification: usize,
    pub secondary: Option<usize>,
}

impl ColumnMap {
    pub fn from_header(header: &[String]) -> Result<Self, String> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };
        let timestamp = find(&["timestamp"]).ok_or("missing column: timestamp")?;
        let value = find(&["value"]).ok_or("missing column: value")?;
        let classification = find(&CLASSIFICATION_ALIASES).ok_or("missing column: classification")?;
        Ok(Self {
            timestamp,
            value,
            classification,
            secondary: find(&SECONDARY_ALIASES),
        })
    }

    fn width(&self) -> usize {
        [self.timestamp, self.value, self.classification]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub rows: u64,
    pub dropped_rows: u64,
    /// Rows kept whose classification matches no known category.
    pub unknown_labels: u64,
    pub ts_min: Option<i64>,
    pub ts_max: Option<i64>,
    pub warnings: Vec<String>,
}

/// Parsed dataset: valid records sorted by timestamp plus ingestion report.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub report: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub unknown_labels: u64,
    pub ts_min: Option<i64>,
    pub ts_max: Option<i64>,
    pub columns: Vec<String>,
    pub category_counts: BTreeMap<Category, u64>,
    pub warnings: Vec<String>,
    pub ttl_secs: u64,
    pub stale: bool,
    pub generated_at_epoch: u64,
}

fn split_row(line: &str) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim().to_string())
        .collect()
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

pub fn parse_row(line: &str, cols: &ColumnMap) -> Result<Record, String> {
    let parts = split_row(line);
    if parts.len() < cols.width() {
        return Err(format!("expected {}+ columns, got {}", cols.width(), parts.len()));
    }
    let ts: i64 = parts[cols.timestamp]
        .parse()
        .map_err(|e| format!("bad timestamp {:?}: {}", parts[cols.timestamp], e))?;
    let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| format!("timestamp out of range: {}", ts))?;
    let value: f64 = parts[cols.value]
        .parse()
        .map_err(|e| format!("bad value {:?}: {}", parts[cols.value], e))?;
    if !value.is_finite() {
        return Err(format!("non-finite value: {}", parts[cols.value]));
    }
    let classification = parts[cols.classification].clone();
    if classification.is_empty() {
        return Err("missing classification".to_string());
    }
    let secondary = cols
        .secondary
        .and_then(|i| parts.get(i))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite());
    Ok(Record {
        timestamp,
        value,
        classification,
        secondary,
    })
}

/// Parse CSV text into a dataset. Malformed rows are dropped and counted;
/// only a missing header or an empty result is an error.
pub fn parse_dataset(text: &str) -> Result<Dataset, ChartError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !is_skippable(l));
    let header = lines
        .next()
        .map(split_row)
        .ok_or_else(|| ChartError::NoData("dataset is empty".to_string()))?;
    let cols = ColumnMap::from_header(&header).map_err(ChartError::NoData)?;

    let mut report = DataQualityReport::default();
    let mut records = Vec::new();
    for line in lines {
        match parse_row(line, &cols) {
            Ok(rec) => {
                if rec.category().is_none() {
                    report.unknown_labels += 1;
                }
                records.push(rec);
            }
            Err(err) => {
                report.dropped_rows += 1;
                if report.warnings.len() < MAX_WARNINGS {
                    report.warnings.push(format!("bad_row: {}", err));
                }
            }
        }
    }

    if records.is_empty() {
        return Err(ChartError::NoData(format!(
            "no valid rows after filtering ({} dropped)",
            report.dropped_rows
        )));
    }

    records.sort_by_key(|r| r.timestamp);
    report.rows = records.len() as u64;
    report.ts_min = records.first().map(|r| r.timestamp.timestamp());
    report.ts_max = records.last().map(|r| r.timestamp.timestamp());

    Ok(Dataset { records, report })
}

pub fn category_counts(records: &[Record]) -> BTreeMap<Category, u64> {
    let mut counts = BTreeMap::new();
    for cat in records.iter().filter_map(Record::category) {
        *counts.entry(cat).or_insert(0) += 1;
    }
    counts
}

pub fn analyze_csv(
    path: &Path,
    ttl_secs: u64,
    now_ts: u64,
) -> Result<(DatasetManifest, DataQualityReport), ChartError> {
    let location = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| ChartError::data_load(&location, e))?;
    let hash = file_sha256(path).map_err(|e| ChartError::data_load(&location, e))?;
    let columns = read_header(&text);
    let dataset = parse_dataset(&text)?;
    let report = dataset.report;

    let stale = report
        .ts_max
        .map(|ts| now_ts.saturating_sub(ts.max(0) as u64) > ttl_secs)
        .unwrap_or(true);

    let manifest = DatasetManifest {
        path: location,
        hash_sha256: hash,
        row_count: report.rows,
        bad_rows: report.dropped_rows,
        unknown_labels: report.unknown_labels,
        ts_min: report.ts_min,
        ts_max: report.ts_max,
        columns,
        category_counts: category_counts(&dataset.records),
        warnings: report.warnings.clone(),
        ttl_secs,
        stale,
        generated_at_epoch: now_ts,
    };

    Ok((manifest, report))
}

pub fn read_header(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !is_skippable(l))
        .map(split_row)
        .unwrap_or_default()
}

pub fn validate_header(header: &[String]) -> Result<(), String> {
    ColumnMap::from_header(header).map(|_| ())
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "timestamp,value,classification\n\
        1700086400,25,Extreme Fear\n\
        1700000000,40,Fear\n\
        1700172800,not-a-number,Greed\n\
        1700259200,55,\n\
        1700345600,75,Greed\n";

    #[test]
    fn test_drops_malformed_rows() {
        let ds = parse_dataset(CSV).unwrap();
        assert_eq!(ds.records.len(), 3);
        assert_eq!(ds.report.dropped_rows, 2);
        assert_eq!(ds.report.warnings.len(), 2);
    }

    #[test]
    fn test_sorted_by_timestamp() {
        let ds = parse_dataset(CSV).unwrap();
        let ts: Vec<i64> = ds.records.iter().map(|r| r.timestamp.timestamp()).collect();
        assert_eq!(ts, vec![1700000000, 1700086400, 1700345600]);
        assert_eq!(ds.report.ts_min, Some(1700000000));
        assert_eq!(ds.report.ts_max, Some(1700345600));
    }

    #[test]
    fn test_header_aliases_and_secondary() {
        let text = "timestamp,value,value_classification,price\n1700000000,40,Fear,36500.5\n";
        let ds = parse_dataset(text).unwrap();
        assert_eq!(ds.records[0].category(), Some(Category::Fear));
        assert_eq!(ds.records[0].secondary, Some(36500.5));
    }

    #[test]
    fn test_missing_column_is_no_data() {
        let err = parse_dataset("timestamp,value\n1700000000,40\n").unwrap_err();
        assert_eq!(err, ChartError::NoData("missing column: classification".to_string()));
    }

    #[test]
    fn test_all_rows_bad_is_no_data() {
        let err = parse_dataset("timestamp,value,classification\nx,y,z\n").unwrap_err();
        assert!(matches!(err, ChartError::NoData(_)));
    }

    #[test]
    fn test_non_finite_value_dropped() {
        let ds = parse_dataset("timestamp,value,classification\n1,NaN,Fear\n2,inf,Fear\n3,10,Fear\n").unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.report.dropped_rows, 2);
    }

    #[test]
    fn test_empty_value_dropped_not_zeroed() {
        let ds = parse_dataset("timestamp,value,classification\n1,,Fear\n2,30,Fear\n").unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].value, 30.0);
        assert_eq!(ds.report.dropped_rows, 1);
    }

    #[test]
    fn test_unknown_labels_counted() {
        let ds = parse_dataset("timestamp,value,classification\n1,10,Panic\n2,20,Fear\n").unwrap();
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.report.unknown_labels, 1);
        assert_eq!(category_counts(&ds.records).get(&Category::Fear), Some(&1));
    }

    #[test]
    fn test_default_manifest_path() {
        let p = default_manifest_path(Path::new("/tmp/fear_greed_index.csv"));
        assert_eq!(p, PathBuf::from("/tmp/fear_greed_index.csv.manifest.json"));
    }
}
