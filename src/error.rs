use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the dashboard before (or instead of) rendering.
///
/// Per-row problems (an unparsable date, a blank numeric cell) never show up
/// here: they degrade to missing values inside the data layer.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Configuration file unreadable or holding invalid values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset path does not exist.
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// Dataset file extension has no loader.
    #[error("unsupported dataset format: .{0}")]
    UnsupportedFormat(String),

    /// A column required by the column mapping is absent from the dataset.
    #[error("dataset is missing required column '{column}' (for {field})")]
    MissingColumn { column: String, field: String },

    /// Filter parameters that cannot describe a valid selection.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
