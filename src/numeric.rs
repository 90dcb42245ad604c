//! Numeric coercion for POS export cells.
//!
//! Exports mix plain numbers, currency-formatted text ("$1,234.50") and the
//! odd corrupt cell. Every cell becomes a finite `f64`; anything unparseable
//! becomes `0.0`.

use polars::prelude::*;

use crate::error::Result;

/// Parse loosely formatted numeric text. Never fails.
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Lazy form of [`parse_number`] for one column. Text goes through the same
/// cleanup; numeric dtypes are only cast. Nulls, failures and non-finite
/// results become `0.0`.
pub fn numeric_expr(column: &str, dtype: &DataType) -> Expr {
    let parsed = match dtype {
        DataType::String => col(column)
            .str()
            .replace_all(lit("[$,]"), lit(""), false)
            .str()
            .strip_chars(lit(" \t\r\n"))
            .cast(DataType::Float64),
        _ => col(column).cast(DataType::Float64),
    };
    when(parsed.clone().is_finite())
        .then(parsed)
        .otherwise(lit(0.0))
        .alias(column)
}

/// Replace `column` with its cleaned Float64 version.
pub fn clean_numeric_column(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let dtype = df.column(column)?.dtype().clone();
    let out = df
        .clone()
        .lazy()
        .with_column(numeric_expr(column, &dtype))
        .collect()?;
    Ok(out)
}
