//! Precomputed slices handed to the reporting layer.

use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::abc::{tier, AbcClass};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::schema::item;

/// Best sellers of one of the leading categories.
#[derive(Debug, Clone)]
pub struct CategorySlice {
    pub category: String,
    pub revenue: f64,
    /// `producto, ventas`, by revenue descending.
    pub items: DataFrame,
}

fn by_revenue_desc(df: LazyFrame) -> LazyFrame {
    df.sort(
        [item::REVENUE],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )
}

/// First `limit` tier-A items: `producto, rubro, unidades, precio_promedio, ventas`.
pub fn top_a_items(ranked: &DataFrame, limit: usize) -> Result<DataFrame> {
    let a = tier(ranked, AbcClass::A)?;
    let df = a.head(Some(limit)).select([
        item::PRODUCT,
        item::CATEGORY,
        item::UNITS,
        item::AVG_PRICE,
        item::REVENUE,
    ])?;
    Ok(df)
}

/// Every tier-A item: `producto, rubro, ventas`.
pub fn a_catalog(ranked: &DataFrame) -> Result<DataFrame> {
    let df = tier(ranked, AbcClass::A)?.select([item::PRODUCT, item::CATEGORY, item::REVENUE])?;
    Ok(df)
}

/// The categories with the most revenue (the missing-category sentinel excluded),
/// each with its best-selling items.
pub fn top_categories(items: &DataFrame, config: &AnalysisConfig) -> Result<Vec<CategorySlice>> {
    let ranking = by_revenue_desc(
        items
            .clone()
            .lazy()
            .filter(col(item::CATEGORY).neq(lit(config.missing_category.as_str())))
            .group_by_stable([col(item::CATEGORY)])
            .agg([col(item::REVENUE).sum()]),
    )
    .limit(config.top_categories as IdxSize)
    .collect()?;

    let names = ranking.column(item::CATEGORY)?.str()?;
    let totals = ranking.column(item::REVENUE)?.f64()?;

    let mut slices = Vec::with_capacity(ranking.height());
    for (name, total) in names.into_iter().zip(totals.into_iter()) {
        let Some(name) = name else { continue };
        let best = by_revenue_desc(
            items
                .clone()
                .lazy()
                .filter(col(item::CATEGORY).eq(lit(name))),
        )
        .limit(config.items_per_category as IdxSize)
        .select([col(item::PRODUCT), col(item::REVENUE)])
        .collect()?;

        slices.push(CategorySlice {
            category: name.to_string(),
            revenue: total.unwrap_or(0.0),
            items: best,
        });
    }
    Ok(slices)
}

/// Items that sold at most `max_units`: `producto, rubro, ventas`, by revenue descending.
pub fn dead_stock(items: &DataFrame, max_units: f64) -> Result<DataFrame> {
    let df = by_revenue_desc(
        items
            .clone()
            .lazy()
            .filter(col(item::UNITS).lt_eq(lit(max_units))),
    )
    .select([col(item::PRODUCT), col(item::CATEGORY), col(item::REVENUE)])
    .collect()?;
    Ok(df)
}

fn json_value(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float64(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}

/// Rows of `df` as JSON objects keyed by column name.
pub fn frame_to_json(df: &DataFrame) -> Result<Value> {
    let names = df.get_column_names_str();
    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut row = Map::new();
        for (name, column) in names.iter().zip(df.get_columns()) {
            row.insert(name.to_string(), json_value(column.get(i)?));
        }
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}

/// JSON form of a [`CategorySlice`].
#[derive(Debug, Serialize)]
pub struct CategorySliceJson {
    pub category: String,
    pub revenue: f64,
    pub items: Value,
}

impl CategorySlice {
    pub fn to_json(&self) -> Result<CategorySliceJson> {
        Ok(CategorySliceJson {
            category: self.category.clone(),
            revenue: self.revenue,
            items: frame_to_json(&self.items)?,
        })
    }
}
