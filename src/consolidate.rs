//! View selection over the loaded branches.

use std::fmt;

use polars::prelude::*;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{InsightsError, Result};
use crate::loader::BranchSet;
use crate::schema::{item, period};

/// Branches a consolidated view needs.
pub const MIN_CONSOLIDATED_BRANCHES: usize = 2;

/// Which rows an analysis pass looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// One branch, unmodified.
    Branch(String),
    /// All branches summed by product and by period.
    Consolidated,
}

impl View {
    /// `"consolidated"` / `"consolidado"` (any case) selects the consolidated view;
    /// anything else names a branch.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "consolidated" | "consolidado" => Self::Consolidated,
            _ => Self::Branch(name.trim().to_string()),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(label) => write!(f, "{label}"),
            Self::Consolidated => write!(f, "consolidated"),
        }
    }
}

/// The item and period tables of the selected view.
#[derive(Debug, Clone)]
pub struct ViewTables {
    pub items: DataFrame,
    pub periods: DataFrame,
}

fn stack<'a>(frames: impl Iterator<Item = &'a DataFrame>) -> Result<Option<DataFrame>> {
    let mut acc: Option<DataFrame> = None;
    for df in frames {
        match acc.as_mut() {
            Some(a) => {
                a.vstack_mut(df)?;
            }
            None => acc = Some(df.clone()),
        }
    }
    Ok(acc)
}

fn single_branch(branches: &BranchSet, label: &str) -> Result<ViewTables> {
    let tables = branches
        .get(label)
        .ok_or_else(|| InsightsError::UnknownBranch(label.to_string()))?;
    Ok(ViewTables {
        items: tables.items.clone(),
        periods: tables.periods.clone(),
    })
}

/// Sum like-keyed rows across branches. Keys keep their first-seen order and a
/// key present in only one branch keeps that branch's contribution.
fn consolidated(branches: &BranchSet, config: &AnalysisConfig) -> Result<ViewTables> {
    if branches.len() < MIN_CONSOLIDATED_BRANCHES {
        return Err(InsightsError::InsufficientBranches {
            required: MIN_CONSOLIDATED_BRANCHES,
            loaded: branches.len(),
        });
    }

    let items = stack(branches.iter().map(|b| &b.items))?.unwrap_or_default();
    let periods = stack(branches.iter().map(|b| &b.periods))?.unwrap_or_default();
    let label = config.consolidated_label.as_str();

    let items = items
        .lazy()
        .group_by_stable([col(item::PRODUCT), col(item::CATEGORY)])
        .agg([col(item::UNITS).sum(), col(item::REVENUE).sum()])
        .with_column(lit(label).alias(item::BRANCH))
        .select(item::ALL.map(col))
        .collect()?;

    let periods = periods
        .lazy()
        .group_by_stable([col(period::PERIOD)])
        .agg([
            col(period::DINING).sum(),
            col(period::COUNTER).sum(),
            col(period::TICKETS).sum(),
        ])
        .with_column(lit(label).alias(period::BRANCH))
        .select(period::ALL.map(col))
        .collect()?;

    Ok(ViewTables { items, periods })
}

/// Tables for `view`. Missing input is reported instead of producing partial aggregates.
pub fn select_view(branches: &BranchSet, view: &View, config: &AnalysisConfig) -> Result<ViewTables> {
    let tables = match view {
        View::Branch(label) => single_branch(branches, label)?,
        View::Consolidated => consolidated(branches, config)?,
    };
    debug!(
        %view,
        items = tables.items.height(),
        periods = tables.periods.height(),
        "view selected"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_branch_frames;

    fn branch(label: &str, items: &[(&str, &str, f64, f64)], periods: &[(&str, f64, f64, f64)]) -> crate::loader::BranchTables {
        let items_df = DataFrame::new(vec![
            Column::new("producto".into(), items.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new("rubro".into(), items.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new("unidades".into(), items.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("ventas".into(), items.iter().map(|r| r.3).collect::<Vec<_>>()),
        ])
        .unwrap();
        let periods_df = DataFrame::new(vec![
            Column::new("mes".into(), periods.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new("salon".into(), periods.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new("mostrador".into(), periods.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("tickets".into(), periods.iter().map(|r| r.3).collect::<Vec<_>>()),
        ])
        .unwrap();
        load_branch_frames(&items_df, &periods_df, label, &AnalysisConfig::default()).unwrap()
    }

    fn two_branches() -> BranchSet {
        let mut set = BranchSet::new();
        set.insert(branch(
            "Local 1",
            &[("Jamón", "7", 10.0, 1000.0), ("Café", "1", 5.0, 500.0)],
            &[("Enero", 100.0, 50.0, 10.0), ("Febrero", 80.0, 40.0, 8.0)],
        ))
        .unwrap();
        set.insert(branch(
            "Local 2",
            &[("Café", "1", 3.0, 300.0), ("Vermut", "26", 2.0, 90.0)],
            &[("Febrero", 20.0, 10.0, 2.0), ("Marzo", 5.0, 5.0, 1.0)],
        ))
        .unwrap();
        set
    }

    fn f64s(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name).unwrap().f64().unwrap().into_iter().map(|v| v.unwrap()).collect()
    }

    fn strs(df: &DataFrame, name: &str) -> Vec<String> {
        df.column(name).unwrap().str().unwrap().into_iter().map(|v| v.unwrap().to_string()).collect()
    }

    #[test]
    fn parses_view_names() {
        assert_eq!(View::parse("Consolidado"), View::Consolidated);
        assert_eq!(View::parse(" consolidated "), View::Consolidated);
        assert_eq!(View::parse("Local 2"), View::Branch("Local 2".into()));
    }

    #[test]
    fn single_branch_view_is_the_branch_tables() {
        let set = two_branches();
        let view = select_view(&set, &View::Branch("Local 2".into()), &AnalysisConfig::default()).unwrap();
        assert_eq!(strs(&view.items, item::PRODUCT), vec!["Café", "Vermut"]);
        assert_eq!(strs(&view.periods, period::PERIOD), vec!["Febrero", "Marzo"]);
        assert!(strs(&view.items, item::BRANCH).iter().all(|b| b == "Local 2"));
        assert_eq!(view.items.get_column_names_str(), item::ALL.to_vec());
        assert_eq!(f64s(&view.items, item::REVENUE), vec![300.0, 90.0]);
    }

    #[test]
    fn unknown_branch_is_recoverable() {
        let set = two_branches();
        let err = select_view(&set, &View::Branch("Local 9".into()), &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn consolidated_view_sums_by_key() {
        let set = two_branches();
        let view = select_view(&set, &View::Consolidated, &AnalysisConfig::default()).unwrap();

        assert_eq!(view.items.get_column_names_str(), item::ALL.to_vec());
        assert_eq!(strs(&view.items, item::PRODUCT), vec!["Jamón", "Café", "Vermut"]);
        assert_eq!(f64s(&view.items, item::UNITS), vec![10.0, 8.0, 2.0]);
        assert_eq!(f64s(&view.items, item::REVENUE), vec![1000.0, 800.0, 90.0]);
        assert!(strs(&view.items, item::BRANCH).iter().all(|b| b == "Consolidado"));

        assert_eq!(strs(&view.periods, period::PERIOD), vec!["Enero", "Febrero", "Marzo"]);
        assert_eq!(f64s(&view.periods, period::DINING), vec![100.0, 100.0, 5.0]);
        assert_eq!(f64s(&view.periods, period::COUNTER), vec![50.0, 50.0, 5.0]);
        assert_eq!(f64s(&view.periods, period::TICKETS), vec![10.0, 10.0, 1.0]);
    }

    #[test]
    fn consolidated_view_needs_two_branches() {
        let mut set = BranchSet::new();
        set.insert(branch("Local 1", &[("Café", "1", 1.0, 10.0)], &[("Enero", 1.0, 1.0, 1.0)]))
            .unwrap();
        let err = select_view(&set, &View::Consolidated, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            InsightsError::InsufficientBranches { required: 2, loaded: 1 }
        ));
    }

    #[test]
    fn same_product_in_different_categories_stays_apart() {
        let mut set = BranchSet::new();
        set.insert(branch("A", &[("Tabla", "12", 1.0, 10.0)], &[("Enero", 1.0, 1.0, 1.0)]))
            .unwrap();
        set.insert(branch("B", &[("Tabla", "13", 1.0, 20.0)], &[("Enero", 1.0, 1.0, 1.0)]))
            .unwrap();
        let view = select_view(&set, &View::Consolidated, &AnalysisConfig::default()).unwrap();
        assert_eq!(view.items.height(), 2);
        assert_eq!(f64s(&view.items, item::REVENUE), vec![10.0, 20.0]);
    }
}
