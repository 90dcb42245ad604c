//! One analysis pass: view selection, derived columns, KPIs, ABC and slices.

use polars::prelude::*;
use serde_json::{json, Value};
use tracing::info;

use crate::abc::{classify, AbcAnalysis};
use crate::config::AnalysisConfig;
use crate::consolidate::{select_view, View};
use crate::error::Result;
use crate::loader::BranchSet;
use crate::metrics::{compute_kpis, with_item_derived, with_period_derived, Kpis};
use crate::report::{a_catalog, dead_stock, frame_to_json, top_a_items, top_categories, CategorySlice};

/// Everything the reporting layer renders for one view.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub view: View,
    /// Item rows with `precio_promedio`.
    pub items: DataFrame,
    /// Period rows with revenue, average ticket and channel mix.
    pub periods: DataFrame,
    pub kpis: Kpis,
    pub abc: AbcAnalysis,
    pub top_a: DataFrame,
    pub top_categories: Vec<CategorySlice>,
    pub dead_stock: DataFrame,
    pub a_catalog: DataFrame,
}

/// Run the whole pipeline for `view`. Fails without partial output when the
/// view's inputs are missing.
pub fn analyze(branches: &BranchSet, view: &View, config: &AnalysisConfig) -> Result<DashboardReport> {
    config.validate()?;
    let tables = select_view(branches, view, config)?;

    let items = with_item_derived(&tables.items)?;
    let periods = with_period_derived(&tables.periods)?;
    let kpis = compute_kpis(&items, &periods)?;
    let abc = classify(&items, config)?;

    let report = DashboardReport {
        view: view.clone(),
        top_a: top_a_items(&abc.ranked, config.top_a_limit)?,
        top_categories: top_categories(&items, config)?,
        dead_stock: dead_stock(&items, config.dead_stock_max_units)?,
        a_catalog: a_catalog(&abc.ranked)?,
        items,
        periods,
        kpis,
        abc,
    };

    info!(
        %view,
        revenue = report.kpis.total_revenue,
        items = report.items.height(),
        periods = report.periods.height(),
        "analysis complete"
    );
    Ok(report)
}

impl DashboardReport {
    pub fn to_json(&self) -> Result<Value> {
        let categories = self
            .top_categories
            .iter()
            .map(|c| c.to_json())
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "view": self.view.to_string(),
            "kpis": self.kpis,
            "abc_summary": frame_to_json(&self.abc.summary)?,
            "top_a": frame_to_json(&self.top_a)?,
            "top_categories": categories,
            "dead_stock": frame_to_json(&self.dead_stock)?,
            "a_catalog": frame_to_json(&self.a_catalog)?,
            "items": frame_to_json(&self.abc.ranked)?,
            "periods": frame_to_json(&self.periods)?,
        }))
    }
}
