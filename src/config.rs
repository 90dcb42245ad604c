use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InsightsError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Knobs for one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Items up to this cumulative revenue share are tier A.
    pub a_max_percent: f64,
    /// Items up to this cumulative revenue share are tier B.
    pub b_max_percent: f64,
    pub top_a_limit: usize,
    pub top_categories: usize,
    pub items_per_category: usize,
    /// Items with at most this many units sold are dead stock.
    pub dead_stock_max_units: f64,
    /// Category shown when an export has no usable category.
    pub missing_category: String,
    /// Branch label carried by consolidated rows.
    pub consolidated_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            a_max_percent: 80.0,
            b_max_percent: 95.0,
            top_a_limit: 20,
            top_categories: 3,
            items_per_category: 10,
            dead_stock_max_units: 1.0,
            missing_category: "S/D".to_string(),
            consolidated_label: "Consolidado".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(self.a_max_percent) || !in_range(self.b_max_percent) {
            return Err(InsightsError::Config(format!(
                "ABC thresholds must lie in 0..=100 (got {} and {})",
                self.a_max_percent, self.b_max_percent
            )));
        }
        if self.a_max_percent > self.b_max_percent {
            return Err(InsightsError::Config(format!(
                "a_max_percent ({}) exceeds b_max_percent ({})",
                self.a_max_percent, self.b_max_percent
            )));
        }
        if self.missing_category.trim().is_empty() {
            return Err(InsightsError::Config(
                "missing_category must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl InsightsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; `None` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_toml_str(&std::fs::read_to_string(p)?),
            None => Ok(Self::default()),
        }
    }
}
