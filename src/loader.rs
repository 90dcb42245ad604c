//! Branch loading: one item export plus one period export per branch.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::NaiveTime;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::category::translate_category_column;
use crate::columns::{normalize_item_columns, normalize_period_columns};
use crate::config::AnalysisConfig;
use crate::error::{InsightsError, Result};
use crate::numeric::clean_numeric_column;
use crate::schema::{item, period};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet, // xlsx / xls / xlsb / ods
}

impl SourceFormat {
    /// Detect format from the file name extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// An uploaded export: its original file name and raw contents.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl RawUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// Cleaned tables of one branch.
#[derive(Debug, Clone)]
pub struct BranchTables {
    pub branch: String,
    /// `local, producto, rubro, unidades, ventas`; every row has `unidades > 0`.
    pub items: DataFrame,
    /// `local, mes, salon, mostrador, tickets`.
    pub periods: DataFrame,
}

// ── Reading ─────────────────────────────────────────────────────────────────

/// Read an export into a DataFrame with every column as raw text.
pub fn read_table(upload: &RawUpload) -> Result<DataFrame> {
    match SourceFormat::from_file_name(&upload.file_name) {
        Some(SourceFormat::Csv) => read_csv(&upload.bytes),
        Some(SourceFormat::Spreadsheet) => read_spreadsheet(&upload.file_name, &upload.bytes),
        None => Err(InsightsError::UnsupportedFormat(upload.file_name.clone())),
    }
}

fn read_csv(bytes: &[u8]) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .map_parse_options(|opts| opts.with_encoding(CsvEncoding::LossyUtf8))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;
    Ok(df)
}

/// `%Y-%m-%d`, plus the time of day when there is one. Durations and
/// serials outside the calendar keep the raw serial number.
fn datetime_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt.to_string();
    }
    match dt.as_datetime() {
        Some(d) if d.time() == NaiveTime::MIN => d.format("%Y-%m-%d").to_string(),
        Some(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.to_string(),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(datetime_text(dt)),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

/// First sheet, row 1 as header, cells as text.
fn read_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InsightsError::EmptyWorkbook(file_name.to_string()))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let mut headers: Vec<String> = Vec::with_capacity(header_row.len());
    for (i, cell) in header_row.iter().enumerate() {
        let mut name = cell_text(cell)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("column_{}", i + 1));
        if headers.contains(&name) {
            name = format!("{name}_duplicated_{i}");
        }
        headers.push(name);
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get(i).and_then(cell_text));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name.as_str().into(), vals))
        .collect();
    Ok(DataFrame::new(columns)?)
}

// ── Cleaning ────────────────────────────────────────────────────────────────

fn require_columns(df: &DataFrame, table: &'static str, required: &[&str]) -> Result<()> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(InsightsError::MissingColumn {
                table,
                column: col_name.to_string(),
            });
        }
    }
    Ok(())
}

/// Replace `column` with trimmed text; nulls become empty strings.
fn clean_text_column(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .with_column(
            col(column)
                .cast(DataType::String)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .fill_null(lit("")),
        )
        .collect()?;
    Ok(out)
}

fn tag_branch(mut df: DataFrame, column: &str, branch: &str) -> Result<DataFrame> {
    let labels = vec![branch; df.height()];
    df.with_column(Column::new(column.into(), labels))?;
    Ok(df)
}

/// Normalize a raw item table. Rows with `unidades <= 0` are dropped here,
/// once, so nothing downstream divides by a non-positive unit count.
pub fn clean_items(raw: &DataFrame, branch: &str, config: &AnalysisConfig) -> Result<DataFrame> {
    let df = normalize_item_columns(raw, &config.missing_category)?;
    require_columns(&df, "item", &item::REQUIRED)?;

    let df = clean_text_column(&df, item::PRODUCT)?;
    let df = translate_category_column(&df, item::CATEGORY, &config.missing_category)?;
    let df = clean_numeric_column(&df, item::UNITS)?;
    let df = clean_numeric_column(&df, item::REVENUE)?;

    let before = df.height();
    let df = df
        .lazy()
        .filter(col(item::UNITS).gt(lit(0.0)))
        .collect()?;
    let dropped = before - df.height();
    if dropped > 0 {
        warn!(branch, dropped, "dropped item rows without positive units");
    }

    Ok(tag_branch(df, item::BRANCH, branch)?.select(item::ALL)?)
}

/// Normalize a raw period table.
pub fn clean_periods(raw: &DataFrame, branch: &str) -> Result<DataFrame> {
    let df = normalize_period_columns(raw)?;
    require_columns(&df, "period", &period::REQUIRED)?;

    let df = clean_text_column(&df, period::PERIOD)?;
    let df = clean_numeric_column(&df, period::DINING)?;
    let df = clean_numeric_column(&df, period::COUNTER)?;
    let df = clean_numeric_column(&df, period::TICKETS)?;

    Ok(tag_branch(df, period::BRANCH, branch)?.select(period::ALL)?)
}

/// Clean an already-parsed pair of tables for one branch.
pub fn load_branch_frames(
    items: &DataFrame,
    periods: &DataFrame,
    branch: &str,
    config: &AnalysisConfig,
) -> Result<BranchTables> {
    let items = clean_items(items, branch, config)?;
    let periods = clean_periods(periods, branch)?;
    info!(
        branch,
        items = items.height(),
        periods = periods.height(),
        "branch loaded"
    );
    Ok(BranchTables {
        branch: branch.to_string(),
        items,
        periods,
    })
}

/// Parse and clean the item and period exports of one branch.
pub fn load_branch(
    items: &RawUpload,
    periods: &RawUpload,
    branch: &str,
    config: &AnalysisConfig,
) -> Result<BranchTables> {
    debug!(branch, items = %items.file_name, periods = %periods.file_name, "reading exports");
    let item_df = read_table(items)?;
    let period_df = read_table(periods)?;
    load_branch_frames(&item_df, &period_df, branch, config)
}

// ── Branch collection ───────────────────────────────────────────────────────

/// The branches uploaded for one analysis pass, in upload order.
#[derive(Debug, Clone, Default)]
pub struct BranchSet {
    branches: Vec<BranchTables>,
}

impl BranchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch; a label can only be loaded once.
    pub fn insert(&mut self, tables: BranchTables) -> Result<()> {
        if self.get(&tables.branch).is_some() {
            return Err(InsightsError::DuplicateBranch(tables.branch));
        }
        self.branches.push(tables);
        Ok(())
    }

    pub fn get(&self, branch: &str) -> Option<&BranchTables> {
        self.branches.iter().find(|b| b.branch == branch)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.branch.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchTables> {
        self.branches.iter()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
