//! ABC (Pareto) classification of items by revenue contribution.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::schema::{abc, abc_summary, item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub const ALL: [AbcClass; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];

    /// Tier for a cumulative revenue share; each boundary belongs to the lower tier.
    pub fn from_percent(cumulative_percent: f64, config: &AnalysisConfig) -> Self {
        if cumulative_percent <= config.a_max_percent {
            Self::A
        } else if cumulative_percent <= config.b_max_percent {
            Self::B
        } else {
            Self::C
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked items and their per-tier totals.
#[derive(Debug, Clone)]
pub struct AbcAnalysis {
    /// Items by revenue, descending, with `acumulado`, `pct_acumulado`, `clase`.
    pub ranked: DataFrame,
    /// `clase, productos, facturacion`, one row per non-empty tier in A, B, C order.
    pub summary: DataFrame,
}

/// Classify `items` (needs `ventas`). Items with equal revenue keep their input order.
pub fn classify(items: &DataFrame, config: &AnalysisConfig) -> Result<AbcAnalysis> {
    let ranked = items
        .clone()
        .lazy()
        .sort(
            [item::REVENUE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let revenue = ranked.column(item::REVENUE)?.f64()?;
    let total = revenue.sum().unwrap_or(0.0);

    let n = ranked.height();
    let mut cumulative = Vec::with_capacity(n);
    let mut cumulative_pct = Vec::with_capacity(n);
    let mut classes = Vec::with_capacity(n);
    let mut counts = [0u32; 3];
    let mut sums = [0.0f64; 3];

    let mut running = 0.0;
    for value in revenue.into_iter() {
        let value = value.unwrap_or(0.0);
        running += value;
        // Without revenue there is no share to rank by; nothing qualifies as A or B.
        let (pct, class) = if total > 0.0 {
            let pct = running / total * 100.0;
            (pct, AbcClass::from_percent(pct, config))
        } else {
            (0.0, AbcClass::C)
        };

        cumulative.push(running);
        cumulative_pct.push(pct);
        classes.push(class.as_str());
        counts[class as usize] += 1;
        sums[class as usize] += value;
    }

    let mut ranked = ranked.clone();
    ranked.with_column(Column::new(abc::CUMULATIVE.into(), cumulative))?;
    ranked.with_column(Column::new(abc::CUMULATIVE_PCT.into(), cumulative_pct))?;
    ranked.with_column(Column::new(abc::CLASS.into(), classes))?;

    let present: Vec<AbcClass> = AbcClass::ALL
        .into_iter()
        .filter(|c| counts[*c as usize] > 0)
        .collect();
    let summary = DataFrame::new(vec![
        Column::new(
            abc_summary::CLASS.into(),
            present.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            abc_summary::ITEMS.into(),
            present.iter().map(|c| counts[*c as usize]).collect::<Vec<_>>(),
        ),
        Column::new(
            abc_summary::REVENUE.into(),
            present.iter().map(|c| sums[*c as usize]).collect::<Vec<_>>(),
        ),
    ])?;

    debug!(a = counts[0], b = counts[1], c = counts[2], total, "abc classified");
    Ok(AbcAnalysis { ranked, summary })
}

/// Rows of `ranked` in tier `class`, in rank order.
pub fn tier(ranked: &DataFrame, class: AbcClass) -> Result<DataFrame> {
    let df = ranked
        .clone()
        .lazy()
        .filter(col(abc::CLASS).eq(lit(class.as_str())))
        .collect()?;
    Ok(df)
}
