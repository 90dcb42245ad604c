//! Header canonicalization for POS exports.
//!
//! Headers arrive with arbitrary case, stray whitespace and Spanish accents.
//! They are folded to lowercase ASCII vowels, then known synonyms are renamed
//! to the names in [`crate::schema`].

use std::collections::HashSet;

use polars::prelude::*;
use tracing::warn;

use crate::error::{InsightsError, Result};
use crate::schema::{item, period, raw};

/// Item-table header synonyms, `(found, canonical)`.
pub const ITEM_SYNONYMS: [(&str, &str); 2] =
    [(raw::NAME, item::PRODUCT), (raw::SALE, item::REVENUE)];

/// Period-table header synonyms, `(found, canonical)`.
pub const PERIOD_SYNONYMS: [(&str, &str); 2] =
    [(raw::DATE, period::PERIOD), (raw::DINING_ACCENTED, period::DINING)];

/// Where a period table's ticket counts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketSource {
    /// A `tickets` column was present.
    Dedicated,
    /// No `tickets` column; the `ventas` column was renamed to `tickets`.
    SalesColumn,
    /// Neither column was present; every row counts as one ticket.
    Defaulted,
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ö' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        other => other,
    }
}

/// Trimmed, lowercased, accent-folded header.
pub fn canonical_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect()
}

/// Rename synonyms in place. A synonym is left alone when its canonical
/// name is already taken.
fn apply_synonyms(headers: &mut [String], synonyms: &[(&str, &str)]) {
    for (found, canonical) in synonyms {
        if headers.iter().any(|h| h.as_str() == *canonical) {
            continue;
        }
        if let Some(h) = headers.iter_mut().find(|h| h.as_str() == *found) {
            *h = canonical.to_string();
        }
    }
}

fn check_unique(headers: &[String], table: &'static str) -> Result<()> {
    let mut seen = HashSet::new();
    for h in headers {
        if !seen.insert(h.as_str()) {
            return Err(InsightsError::DuplicateColumn {
                table,
                column: h.clone(),
            });
        }
    }
    Ok(())
}

/// Canonical item-table headers.
pub fn item_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut out: Vec<String> = headers.iter().map(|h| canonical_header(h.as_ref())).collect();
    apply_synonyms(&mut out, &ITEM_SYNONYMS);
    out
}

/// Canonical period-table headers and the ticket source they imply.
pub fn period_headers<S: AsRef<str>>(headers: &[S]) -> (Vec<String>, TicketSource) {
    let mut out: Vec<String> = headers.iter().map(|h| canonical_header(h.as_ref())).collect();
    apply_synonyms(&mut out, &PERIOD_SYNONYMS);

    let source = if out.iter().any(|h| h.as_str() == period::TICKETS) {
        TicketSource::Dedicated
    } else if let Some(h) = out.iter_mut().find(|h| h.as_str() == raw::SALES) {
        // Some exports label the ticket-count column "ventas".
        *h = period::TICKETS.to_string();
        TicketSource::SalesColumn
    } else {
        TicketSource::Defaulted
    };
    (out, source)
}

fn renamed(df: &DataFrame, headers: Vec<String>, table: &'static str) -> Result<DataFrame> {
    check_unique(&headers, table)?;
    let mut out = df.clone();
    out.set_column_names(headers.as_slice())?;
    Ok(out)
}

/// Canonical headers plus a sentinel-filled category column when the export has none.
pub fn normalize_item_columns(df: &DataFrame, missing_category: &str) -> Result<DataFrame> {
    let headers = item_headers(&df.get_column_names_str());
    let mut out = renamed(df, headers, "item")?;

    if out.column(item::CATEGORY).is_err() {
        warn!(sentinel = missing_category, "item export has no category column");
        let fill = vec![missing_category; out.height()];
        out.with_column(Column::new(item::CATEGORY.into(), fill))?;
    }
    Ok(out)
}

/// Canonical headers plus a ticket column, falling back to `ventas` and then to one per row.
pub fn normalize_period_columns(df: &DataFrame) -> Result<DataFrame> {
    let (headers, source) = period_headers(&df.get_column_names_str());
    let mut out = renamed(df, headers, "period")?;

    match source {
        TicketSource::Dedicated => {}
        TicketSource::SalesColumn => {
            warn!("period export has no tickets column; reading ticket counts from 'ventas'");
        }
        TicketSource::Defaulted => {
            warn!("period export has no ticket counts; counting one ticket per row");
            let fill = vec![1.0f64; out.height()];
            out.with_column(Column::new(period::TICKETS.into(), fill))?;
        }
    }
    Ok(out)
}
