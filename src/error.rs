use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: &'static str, column: String },

    #[error("Columns in {table} table collide after normalization: '{column}'")]
    DuplicateColumn { table: &'static str, column: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Spreadsheet has no sheets: {0}")]
    EmptyWorkbook(String),

    #[error("Branch loaded twice: {0}")]
    DuplicateBranch(String),

    #[error("Branch not loaded: {0}")]
    UnknownBranch(String),

    #[error("Consolidated view needs {required} branches, {loaded} loaded")]
    InsufficientBranches { required: usize, loaded: usize },

    #[error("Config: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl InsightsError {
    /// Missing input the user can supply; rendering should stop and ask for it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBranches { .. } | Self::UnknownBranch(_)
        )
    }

    /// Message shown to the person who uploaded the files.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingColumn { table, column } => format!(
                "The {table} export has no '{column}' column. Check that row 1 of the \
                 file holds only the column titles and that the right report was uploaded."
            ),
            Self::DuplicateColumn { table, column } => format!(
                "The {table} export has two columns named '{column}'. Remove one and upload again."
            ),
            Self::UnsupportedFormat(name) => {
                format!("'{name}' is not a CSV or Excel file. Upload a .csv, .xlsx or .xls export.")
            }
            Self::InsufficientBranches { required, loaded } => format!(
                "The consolidated view needs the reports of at least {required} branches \
                 ({loaded} uploaded). Upload the missing branch to continue."
            ),
            Self::UnknownBranch(label) => {
                format!("No reports were uploaded for '{label}'. Upload them to see this view.")
            }
            other => format!(
                "Error processing the data. Check that row 1 of your files holds only the \
                 column titles. Technical detail: {other}"
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(feature = "python")]
impl From<InsightsError> for pyo3::PyErr {
    fn from(err: InsightsError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};
        if err.is_recoverable() {
            PyValueError::new_err(err.user_message())
        } else {
            PyRuntimeError::new_err(err.user_message())
        }
    }
}
