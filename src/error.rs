//! Error taxonomy for the chart core.
//!
//! Every variant is terminal for the view it affects. Callers surface it as a
//! visible message with a manual reload offer; nothing here retries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// Dataset fetch failed (file missing, HTTP error, network failure).
    #[error("failed to load dataset from {location}: {reason}")]
    DataLoad { location: String, reason: String },

    /// Statistics requested for a group with no usable values.
    #[error("cannot compute box statistics over an empty group")]
    EmptyInput,

    /// Nothing left to chart after filtering.
    #[error("no data: {0}")]
    NoData(String),
}

impl ChartError {
    pub fn data_load(location: impl Into<String>, reason: impl ToString) -> Self {
        ChartError::DataLoad {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label used in logs and error banners.
    pub fn kind(&self) -> &'static str {
        match self {
            ChartError::DataLoad { .. } => "data_load",
            ChartError::EmptyInput => "empty_input",
            ChartError::NoData(_) => "no_data",
        }
    }

    /// Troubleshooting hint shown under the error message, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ChartError::DataLoad { reason, .. } => {
                let lower = reason.to_lowercase();
                if lower.contains("404") || lower.contains("not found") {
                    Some("File not found. Make sure the dataset CSV exists at the configured location")
                } else if lower.contains("cors") || lower.contains("cross-origin") {
                    Some("Cross-origin request blocked. Serve the dataset from the same origin")
                } else if lower.contains("network")
                    || lower.contains("connect")
                    || lower.contains("timed out")
                    || lower.contains("dns")
                {
                    Some("Network error. Check your connection or use a local copy of the dataset")
                } else {
                    None
                }
            }
            ChartError::EmptyInput => None,
            ChartError::NoData(_) => {
                Some("Check that the CSV has timestamp, value and classification columns")
            }
        }
    }
}
