pub mod abc;
pub mod category;
pub mod columns;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod numeric;
pub mod pipeline;
pub mod report;
pub mod schema;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod property_tests;

pub use abc::{classify, AbcAnalysis, AbcClass};
pub use config::{AnalysisConfig, InsightsConfig, LoggingConfig};
pub use consolidate::{select_view, View};
pub use error::{InsightsError, Result};
pub use loader::{load_branch, BranchSet, BranchTables, RawUpload};
pub use metrics::Kpis;
pub use pipeline::{analyze, DashboardReport};
pub use report::CategorySlice;

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Items
    let items = PyModule::new(m.py(), "item")?;
    items.add("BRANCH", schema::item::BRANCH)?;
    items.add("PRODUCT", schema::item::PRODUCT)?;
    items.add("CATEGORY", schema::item::CATEGORY)?;
    items.add("UNITS", schema::item::UNITS)?;
    items.add("REVENUE", schema::item::REVENUE)?;
    items.add("AVG_PRICE", schema::item::AVG_PRICE)?;
    m.add_submodule(&items)?;

    // Periods
    let periods = PyModule::new(m.py(), "period")?;
    periods.add("BRANCH", schema::period::BRANCH)?;
    periods.add("PERIOD", schema::period::PERIOD)?;
    periods.add("DINING", schema::period::DINING)?;
    periods.add("COUNTER", schema::period::COUNTER)?;
    periods.add("TICKETS", schema::period::TICKETS)?;
    periods.add("REVENUE", schema::period::REVENUE)?;
    periods.add("AVG_TICKET", schema::period::AVG_TICKET)?;
    periods.add("DINING_PCT", schema::period::DINING_PCT)?;
    periods.add("COUNTER_PCT", schema::period::COUNTER_PCT)?;
    m.add_submodule(&periods)?;

    // ABC ranking
    let abc = PyModule::new(m.py(), "abc")?;
    abc.add("CUMULATIVE", schema::abc::CUMULATIVE)?;
    abc.add("CUMULATIVE_PCT", schema::abc::CUMULATIVE_PCT)?;
    abc.add("CLASS", schema::abc::CLASS)?;
    m.add_submodule(&abc)?;

    let abc_summary = PyModule::new(m.py(), "abc_summary")?;
    abc_summary.add("CLASS", schema::abc_summary::CLASS)?;
    abc_summary.add("ITEMS", schema::abc_summary::ITEMS)?;
    abc_summary.add("REVENUE", schema::abc_summary::REVENUE)?;
    m.add_submodule(&abc_summary)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn pos_insights(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::Dashboard>()?;
    m.add_function(wrap_pyfunction!(python::translate_category, m)?)?;
    m.add_function(wrap_pyfunction!(python::parse_number, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
