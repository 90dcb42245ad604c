//! Category-code translation.
//!
//! The POS exports carry the category ("rubro") as a numeric code. Codes are
//! resolved through a closed table; anything outside it passes through.

use polars::prelude::*;

use crate::error::Result;

/// POS category codes and their display names.
pub const CATEGORY_NAMES: [(&str, &str); 27] = [
    ("1", "Cafetería"),
    ("2", "Entradas"),
    ("3", "Postres"),
    ("4", "Tapas"),
    ("5", "Platos Principales"),
    ("6", "Sándwiches"),
    ("7", "Embutidos"),
    ("8", "Combos"),
    ("9", "Venta por Kg"),
    ("10", "Fiambres"),
    ("11", "Sobres"),
    ("12", "Tablas"),
    ("13", "Quesos"),
    ("14", "Ensaladas"),
    ("15", "Adicionales"),
    ("16", "Tragos"),
    ("17", "Bebidas C/A"),
    ("18", "Cervezas"),
    ("19", "Bebidas S/A"),
    ("20", "Conservas"),
    ("21", "Tienda"),
    ("22", "Vinos Tintos"),
    ("23", "Vinos Blancos"),
    ("24", "Vinos Rosados"),
    ("25", "Espumantes"),
    ("26", "Vermut"),
    ("27", "Raciones"),
];

/// Lookup key for a raw category: trimmed, with one float-serialization `.0` removed.
pub fn category_key(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).trim()
}

pub fn translate_category(raw: &str) -> Option<&'static str> {
    let key = category_key(raw);
    CATEGORY_NAMES
        .iter()
        .find(|(code, _)| *code == key)
        .map(|(_, name)| *name)
}

/// Display name for a raw category, the raw value itself when unknown,
/// or `missing` when the cell is blank.
pub fn resolve_category(raw: Option<&str>, missing: &str) -> String {
    match raw {
        Some(r) if !r.trim().is_empty() => translate_category(r)
            .map(str::to_string)
            .unwrap_or_else(|| r.to_string()),
        _ => missing.to_string(),
    }
}

/// Text form of a category cell of any dtype.
fn category_text(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Float64(f) => Some(f.to_string()),
        AnyValue::Float32(f) => Some(f.to_string()),
        other => Some(other.to_string()),
    }
}

/// Replace `column` with resolved category names.
pub fn translate_category_column(df: &DataFrame, column: &str, missing: &str) -> Result<DataFrame> {
    let names: Vec<String> = df
        .column(column)?
        .as_materialized_series()
        .rechunk()
        .iter()
        .map(|v| resolve_category(category_text(&v).as_deref(), missing))
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(column.into(), names))?;
    Ok(out)
}
