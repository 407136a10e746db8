//! Current rows, mapping and graph, replaced only by successful loads.

use std::sync::Arc;

use log::info;

use super::columns::{ColumnMapping, resolve_columns};
use super::error::LoadError;
use super::graph::{GraphModel, build_graph};
use super::row::{Row, headers};

/// Runs the column resolver and graph builder over a full row set.
pub fn process_rows(rows: &[Row], mapping: &ColumnMapping) -> Result<GraphModel, LoadError> {
	let sample = rows
		.first()
		.ok_or_else(|| LoadError::Parse("no data rows found".into()))?;
	let columns = resolve_columns(mapping, sample)?;
	build_graph(&columns, rows)
}

/// Data state of one visualization.
///
/// `load` and `remap` build the new graph before touching any field, so a
/// failure leaves the previous rows, mapping and graph in place.
#[derive(Clone, Debug, Default)]
pub struct DataSession {
	rows: Vec<Row>,
	headers: Vec<String>,
	mapping: ColumnMapping,
	graph: Option<Arc<GraphModel>>,
}

impl DataSession {
	/// Replaces the rows. `mapping` of `None` preselects canonical columns if present.
	pub fn load(&mut self, rows: Vec<Row>, mapping: Option<ColumnMapping>) -> Result<Arc<GraphModel>, LoadError> {
		let headers = rows.first().map(headers).unwrap_or_default();
		let mapping = mapping.unwrap_or_else(|| ColumnMapping::detect(&headers));
		let graph = Arc::new(process_rows(&rows, &mapping)?);

		info!("loaded {} rows, mapping {:?}", rows.len(), mapping);
		self.rows = rows;
		self.headers = headers;
		self.mapping = mapping;
		self.graph = Some(graph.clone());
		Ok(graph)
	}

	/// Rebuilds the graph from the current rows with a new mapping.
	pub fn remap(&mut self, mapping: ColumnMapping) -> Result<Arc<GraphModel>, LoadError> {
		let graph = Arc::new(process_rows(&self.rows, &mapping)?);
		self.mapping = mapping;
		self.graph = Some(graph.clone());
		Ok(graph)
	}

	pub fn headers(&self) -> &[String] {
		&self.headers
	}

	pub fn mapping(&self) -> &ColumnMapping {
		&self.mapping
	}

	pub fn graph(&self) -> Option<&Arc<GraphModel>> {
		self.graph.as_ref()
	}

	pub fn row_count(&self) -> usize {
		self.rows.len()
	}
}
