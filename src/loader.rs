use crate::filter::SelectorOptions;
use crate::types::{RawRow, SalesRecord, REQUIRED_COLUMNS};
use crate::util::{parse_bool_safe, parse_date_safe, parse_f64_safe, parse_i32_safe, parse_u32_safe};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("the uploaded file is empty")]
    Empty,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error("line {line}: cannot read {column} value {value:?}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// A parsed sales export, sorted by date, with its selector domains.
#[derive(Debug)]
pub struct SalesTable {
    pub digest: String,
    pub records: Vec<SalesRecord>,
    pub options: SelectorOptions,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Hex SHA-256 of the raw file content; the cache key for a load.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Parse CSV bytes into a date-sorted table. Any bad row fails the load.
pub fn parse_sales(bytes: &[u8]) -> Result<SalesTable, LoadError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(LoadError::Empty);
    }
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while rdr.read_record(&mut raw)? {
        // Line where the record starts; quoted fields may span several.
        let line = raw.position().map_or(0, |p| p.line());
        let row: RawRow = raw.deserialize(Some(&headers))?;
        records.push(clean_row(row, line)?);
    }

    // Stable: rows sharing a date keep file order.
    records.sort_by_key(|r| r.date);

    let options = SelectorOptions::from_records(&records);
    Ok(SalesTable {
        digest: content_digest(bytes),
        records,
        options,
    })
}

fn clean_row(row: RawRow, line: u64) -> Result<SalesRecord, LoadError> {
    fn field<T>(
        raw: &Option<String>,
        column: &'static str,
        line: u64,
        parse: impl Fn(Option<&str>) -> Option<T>,
    ) -> Result<T, LoadError> {
        parse(raw.as_deref()).ok_or_else(|| LoadError::InvalidField {
            line,
            column,
            value: raw.clone().unwrap_or_default(),
        })
    }

    let store_type = row.store_type.as_deref().map(str::trim).unwrap_or_default();
    if store_type.is_empty() {
        return Err(LoadError::InvalidField {
            line,
            column: "Type",
            value: String::new(),
        });
    }

    Ok(SalesRecord {
        store: field(&row.store, "Store", line, parse_u32_safe)?,
        size: field(&row.size, "Size", line, parse_f64_safe)?,
        store_type: store_type.to_string(),
        year: field(&row.year, "Year", line, parse_i32_safe)?,
        week: field(&row.week, "Week", line, parse_u32_safe)?,
        month: field(&row.month, "Month", line, parse_u32_safe)?,
        date: field(&row.date, "Date", line, parse_date_safe)?,
        weekly_sales: field(&row.weekly_sales, "Weekly_Sales", line, parse_f64_safe)?,
        sales_forecast: field(&row.sales_forecast, "sales_forec", line, parse_f64_safe)?,
        is_holiday: field(&row.is_holiday, "IsHoliday", line, parse_bool_safe)?,
    })
}

/// Memoized loads keyed by content digest. Entries are immutable once
/// inserted, so callers share them through `Arc`.
///
/// The map lock is held across a parse, so concurrent loads of the same bytes
/// parse once and the second caller gets the cached entry. Entries are never
/// evicted: the cache lives as long as the process.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<String, Arc<SalesTable>>>,
    parses: AtomicUsize,
    hits: AtomicUsize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for these bytes, parsing only on a miss.
    pub fn load(&self, bytes: &[u8]) -> Result<Arc<SalesTable>, LoadError> {
        let digest = content_digest(bytes);
        let mut entries = self.lock();
        if let Some(table) = entries.get(&digest) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(digest = &digest[..12], rows = table.len(), "load cache hit");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(parse_sales(bytes)?);
        self.parses.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            digest = &digest[..12],
            rows = table.len(),
            stores = table.options.stores.len(),
            parses = self.parse_count(),
            cache_hits = self.hit_count(),
            "parsed sales file"
        );
        entries.insert(digest, Arc::clone(&table));
        Ok(table)
    }

    /// Number of loads that actually ran the CSV parser.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<SalesTable>>> {
        // Entries are only ever inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Process-wide load cache shared by every request, like a memoized loader
// living for the lifetime of the server.
static LOAD_CACHE: Lazy<DatasetCache> = Lazy::new(DatasetCache::new);

pub fn load_cached(bytes: &[u8]) -> Result<Arc<SalesTable>, LoadError> {
    LOAD_CACHE.load(bytes)
}
