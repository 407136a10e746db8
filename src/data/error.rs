//! Errors raised while turning input data into a graph.

use thiserror::Error;

/// Every way a data load can fail.
///
/// All variants are recoverable: the caller keeps its previous rows and graph
/// and shows the message to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
	/// The selected file does not have a CSV extension. Nothing was parsed.
	#[error("Currently only CSV files are supported. Please convert your data to CSV format.")]
	UnsupportedFormat,

	/// The CSV decoder failed or produced no rows.
	#[error("Error parsing CSV: {0}")]
	Parse(String),

	/// Default column resolution needs source, type and target columns.
	#[error("Data must have at least 3 columns for default behavior (source, edge type, destination)")]
	ColumnCount,

	/// A programmatic payload was not a non-empty array of objects with enough keys.
	#[error(
		"Invalid data format. Expected a non-empty array of objects with at least 3 columns (source, edge type, destination){}",
		.detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
	)]
	PayloadShape { detail: Option<String> },

	/// Folding rows into nodes and edges failed.
	#[error("Error processing data: {0}")]
	GraphBuild(String),

	/// A bundled sample could not be fetched.
	#[error("Error loading sample data: {0}")]
	Fetch(String),
}

impl LoadError {
	pub(crate) fn payload_shape() -> Self {
		Self::PayloadShape { detail: None }
	}

	pub(crate) fn payload_detail(detail: impl Into<String>) -> Self {
		Self::PayloadShape {
			detail: Some(detail.into()),
		}
	}
}
