//! Scalar KPIs and per-row derived columns.
//!
//! Every ratio whose denominator can legitimately be zero is guarded so that
//! no NaN or infinity reaches the reporting layer.

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::schema::{item, period};

/// Headline figures of one view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_units: f64,
    pub total_counter_sales: f64,
    pub total_dining_sales: f64,
    pub total_tickets: f64,
    pub avg_ticket: f64,
    /// Cross-sell index: items per ticket.
    pub units_per_ticket: f64,
    /// Counter sales as a share of item revenue, in percent.
    pub counter_share_pct: f64,
    /// Dining-room sales as a share of item revenue, in percent.
    pub dining_share_pct: f64,
}

/// `numerator / denominator`, or 0 when that is not a finite number.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

fn column_sum(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(df.column(name)?.f64()?.sum().unwrap_or(0.0))
}

/// KPIs of a view from its item and period tables.
pub fn compute_kpis(items: &DataFrame, periods: &DataFrame) -> Result<Kpis> {
    let total_revenue = column_sum(items, item::REVENUE)?;
    let total_units = column_sum(items, item::UNITS)?;
    let total_counter_sales = column_sum(periods, period::COUNTER)?;
    let total_dining_sales = column_sum(periods, period::DINING)?;
    let total_tickets = column_sum(periods, period::TICKETS)?;

    Ok(Kpis {
        total_revenue,
        total_units,
        total_counter_sales,
        total_dining_sales,
        total_tickets,
        avg_ticket: safe_ratio(total_revenue, total_tickets),
        units_per_ticket: safe_ratio(total_units, total_tickets),
        counter_share_pct: safe_ratio(total_counter_sales, total_revenue) * 100.0,
        dining_share_pct: safe_ratio(total_dining_sales, total_revenue) * 100.0,
    })
}

/// Adds `precio_promedio`. Item rows always have positive units.
pub fn with_item_derived(items: &DataFrame) -> Result<DataFrame> {
    let df = items
        .clone()
        .lazy()
        .with_column((col(item::REVENUE) / col(item::UNITS)).alias(item::AVG_PRICE))
        .collect()?;
    Ok(df)
}

/// Adds period revenue, average ticket and channel mix.
///
/// The average ticket divides by `max(tickets, 1)`; the channel shares treat
/// a period without revenue as 1. The stored ticket count is left as is.
pub fn with_period_derived(periods: &DataFrame) -> Result<DataFrame> {
    let revenue = col(period::DINING) + col(period::COUNTER);
    let ticket_divisor = when(col(period::TICKETS).lt(lit(1.0)))
        .then(lit(1.0))
        .otherwise(col(period::TICKETS));
    let revenue_divisor = when(col(period::REVENUE).eq(lit(0.0)))
        .then(lit(1.0))
        .otherwise(col(period::REVENUE));

    let df = periods
        .clone()
        .lazy()
        .with_column(revenue.alias(period::REVENUE))
        .with_columns([
            (col(period::REVENUE) / ticket_divisor).alias(period::AVG_TICKET),
            (col(period::DINING) / revenue_divisor.clone() * lit(100.0)).alias(period::DINING_PCT),
            (col(period::COUNTER) / revenue_divisor * lit(100.0)).alias(period::COUNTER_PCT),
        ])
        .collect()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> DataFrame {
        DataFrame::new(vec![
            Column::new(item::UNITS.into(), &[10.0, 5.0]),
            Column::new(item::REVENUE.into(), &[1000.0, 500.0]),
        ])
        .unwrap()
    }

    fn periods(tickets: &[f64]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(period::PERIOD.into(), &["Enero", "Febrero"]),
            Column::new(period::DINING.into(), &[600.0, 0.0]),
            Column::new(period::COUNTER.into(), &[300.0, 0.0]),
            Column::new(period::TICKETS.into(), tickets),
        ])
        .unwrap()
    }

    fn f64s(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name).unwrap().f64().unwrap().into_iter().map(|v| v.unwrap()).collect()
    }

    #[test]
    fn safe_ratio_guards() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
        assert_eq!(safe_ratio(f64::MAX, f64::MIN_POSITIVE), 0.0);
        assert_eq!(safe_ratio(9.0, 3.0), 3.0);
    }

    #[test]
    fn kpis_from_tables() {
        let k = compute_kpis(&items(), &periods(&[20.0, 10.0])).unwrap();
        assert_eq!(k.total_revenue, 1500.0);
        assert_eq!(k.total_units, 15.0);
        assert_eq!(k.total_dining_sales, 600.0);
        assert_eq!(k.total_counter_sales, 300.0);
        assert_eq!(k.total_tickets, 30.0);
        assert_eq!(k.avg_ticket, 50.0);
        assert_eq!(k.units_per_ticket, 0.5);
        assert_eq!(k.dining_share_pct, 40.0);
        assert_eq!(k.counter_share_pct, 20.0);
    }

    #[test]
    fn zero_tickets_give_zero_ratios() {
        let k = compute_kpis(&items(), &periods(&[0.0, 0.0])).unwrap();
        assert_eq!(k.avg_ticket, 0.0);
        assert_eq!(k.units_per_ticket, 0.0);
    }

    #[test]
    fn average_price_per_item() {
        let df = with_item_derived(&items()).unwrap();
        assert_eq!(f64s(&df, item::AVG_PRICE), vec![100.0, 100.0]);
    }

    #[test]
    fn period_ratios_never_divide_by_zero() {
        let df = with_period_derived(&periods(&[0.0, 0.0])).unwrap();
        assert_eq!(f64s(&df, period::REVENUE), vec![900.0, 0.0]);
        assert_eq!(f64s(&df, period::AVG_TICKET), vec![900.0, 0.0]);
        let dining = f64s(&df, period::DINING_PCT);
        assert!((dining[0] - 66.666_666).abs() < 1e-4);
        assert_eq!(dining[1], 0.0);
        assert!(f64s(&df, period::COUNTER_PCT).iter().all(|v| v.is_finite()));
        // stored counts are untouched
        assert_eq!(f64s(&df, period::TICKETS), vec![0.0, 0.0]);
    }
}
