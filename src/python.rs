use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use pyo3_polars::PyDataFrame;

use crate::category;
use crate::numeric;
use crate::config::InsightsConfig;
use crate::consolidate::View;
use crate::loader::{load_branch, BranchSet, RawUpload};
use crate::metrics::Kpis;
use crate::pipeline::analyze;

/// Uploaded branches plus the settings to analyze them with.
#[pyclass]
pub struct Dashboard {
    config: InsightsConfig,
    branches: BranchSet,
}

#[pymethods]
impl Dashboard {
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<PathBuf>) -> PyResult<Self> {
        let config = InsightsConfig::load(config_path.as_deref())?;
        Ok(Self {
            config,
            branches: BranchSet::new(),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load one branch from uploaded bytes. The file names pick the parser
    /// (.csv or a spreadsheet extension).
    fn add_branch(
        &mut self,
        branch: &str,
        items_name: &str,
        items_bytes: &[u8],
        periods_name: &str,
        periods_bytes: &[u8],
    ) -> PyResult<()> {
        let tables = load_branch(
            &RawUpload::new(items_name, items_bytes),
            &RawUpload::new(periods_name, periods_bytes),
            branch,
            &self.config.analysis,
        )?;
        self.branches.insert(tables)?;
        Ok(())
    }

    /// Load one branch from files on disk.
    fn add_branch_files(&mut self, branch: &str, items_path: PathBuf, periods_path: PathBuf) -> PyResult<()> {
        let tables = load_branch(
            &RawUpload::from_path(&items_path)?,
            &RawUpload::from_path(&periods_path)?,
            branch,
            &self.config.analysis,
        )?;
        self.branches.insert(tables)?;
        Ok(())
    }

    /// Labels of the loaded branches, in upload order.
    fn branches(&self) -> Vec<String> {
        self.branches.labels().into_iter().map(str::to_string).collect()
    }

    // ── Analysis ────────────────────────────────────────────────────────────

    /// Analyze a branch label or `"consolidated"`.
    ///
    /// Returns a dict of DataFrames (`items`, `periods`, `abc`, `abc_summary`,
    /// `top_a`, `dead_stock`, `a_catalog`), the `kpis` dict and `top_categories`,
    /// a list of `{category, revenue, items}` dicts.
    fn analyze<'py>(&self, py: Python<'py>, view: &str) -> PyResult<Bound<'py, PyDict>> {
        let report = analyze(&self.branches, &View::parse(view), &self.config.analysis)?;

        let out = PyDict::new(py);
        out.set_item("view", report.view.to_string())?;
        out.set_item("kpis", kpis_dict(py, &report.kpis)?)?;
        out.set_item("items", PyDataFrame(report.items))?;
        out.set_item("periods", PyDataFrame(report.periods))?;
        out.set_item("abc", PyDataFrame(report.abc.ranked))?;
        out.set_item("abc_summary", PyDataFrame(report.abc.summary))?;
        out.set_item("top_a", PyDataFrame(report.top_a))?;
        out.set_item("dead_stock", PyDataFrame(report.dead_stock))?;
        out.set_item("a_catalog", PyDataFrame(report.a_catalog))?;

        let categories = PyList::empty(py);
        for slice in report.top_categories {
            let entry = PyDict::new(py);
            entry.set_item("category", slice.category)?;
            entry.set_item("revenue", slice.revenue)?;
            entry.set_item("items", PyDataFrame(slice.items))?;
            categories.append(entry)?;
        }
        out.set_item("top_categories", categories)?;
        Ok(out)
    }
}

fn kpis_dict<'py>(py: Python<'py>, k: &Kpis) -> PyResult<Bound<'py, PyDict>> {
    let d = PyDict::new(py);
    d.set_item("total_revenue", k.total_revenue)?;
    d.set_item("total_units", k.total_units)?;
    d.set_item("total_counter_sales", k.total_counter_sales)?;
    d.set_item("total_dining_sales", k.total_dining_sales)?;
    d.set_item("total_tickets", k.total_tickets)?;
    d.set_item("avg_ticket", k.avg_ticket)?;
    d.set_item("units_per_ticket", k.units_per_ticket)?;
    d.set_item("counter_share_pct", k.counter_share_pct)?;
    d.set_item("dining_share_pct", k.dining_share_pct)?;
    Ok(d)
}

/// Category name for a code such as `"7"` or `"7.0"`; unknown codes come back unchanged.
#[pyfunction]
pub fn translate_category(code: &str) -> String {
    category::translate_category(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Number from a loosely formatted cell such as `"$1,234.50"`; unparseable text gives 0.0.
#[pyfunction]
pub fn parse_number(text: &str) -> f64 {
    numeric::parse_number(text)
}
