//! Folds rows into a deduplicated node set and an ordered edge list.

use indexmap::{IndexMap, IndexSet};
use log::info;

use super::columns::ResolvedColumns;
use super::error::LoadError;
use super::row::{Row, coerce_cell};

/// Number of color buckets nodes are spread across.
pub const GROUP_BUCKETS: u32 = 5;

/// Type label for edges without a type column or with an empty type cell.
pub const DEFAULT_EDGE_TYPE: &str = "default";

/// A unique entity taking part in at least one relationship.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
	pub id: String,
	/// Color bucket in `1..=GROUP_BUCKETS`, derived from the id alone.
	pub group: u32,
}

/// One relationship instance. Parallel and duplicate edges are all kept.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub source: String,
	pub target: String,
	pub edge_type: String,
	pub weight: f64,
}

impl Edge {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Immutable graph handed to the layout and renderer.
///
/// Nodes keep first-seen order; edges keep row order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	pub nodes: IndexMap<String, Node>,
	pub edges: Vec<Edge>,
}

/// Bucket for a node id: first UTF-16 code unit modulo the bucket count, plus one.
pub fn group_bucket(id: &str) -> u32 {
	let first = id.encode_utf16().next().map(u32::from).unwrap_or(0);
	first % GROUP_BUCKETS + 1
}

impl GraphModel {
	fn insert_node(&mut self, id: &str) {
		if !self.nodes.contains_key(id) {
			self.nodes.insert(
				id.to_string(),
				Node {
					id: id.to_string(),
					group: group_bucket(id),
				},
			);
		}
	}

	/// Distinct edge types in first-seen order.
	pub fn edge_types(&self) -> Vec<String> {
		let types: IndexSet<&str> = self.edges.iter().map(|e| e.edge_type.as_str()).collect();
		types.into_iter().map(str::to_string).collect()
	}

	/// Ids directly linked to `id` in either direction, `id` excluded.
	pub fn neighbors(&self, id: &str) -> IndexSet<&str> {
		let mut out = IndexSet::new();
		for edge in &self.edges {
			if edge.source == id && edge.target != id {
				out.insert(edge.target.as_str());
			} else if edge.target == id && edge.source != id {
				out.insert(edge.source.as_str());
			}
		}
		out
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Builds a graph from `rows` using the resolved column names.
///
/// Rows whose source or target is empty are skipped. Any cell that cannot be
/// read as a string aborts the whole build.
pub fn build_graph(columns: &ResolvedColumns, rows: &[Row]) -> Result<GraphModel, LoadError> {
	let mut graph = GraphModel::default();
	let mut dropped = 0usize;

	for row in rows {
		let source = coerce_cell(row, &columns.source).map_err(LoadError::GraphBuild)?;
		let target = coerce_cell(row, &columns.target).map_err(LoadError::GraphBuild)?;
		if source.is_empty() || target.is_empty() {
			dropped += 1;
			continue;
		}

		let edge_type = match &columns.edge_type {
			Some(column) => coerce_cell(row, column).map_err(LoadError::GraphBuild)?,
			None => String::new(),
		};
		let edge_type = if edge_type.is_empty() {
			DEFAULT_EDGE_TYPE.to_string()
		} else {
			edge_type
		};

		graph.insert_node(&source);
		graph.insert_node(&target);
		graph.edges.push(Edge {
			source,
			target,
			edge_type,
			weight: 1.0,
		});
	}

	info!(
		"graph built: {} nodes, {} edges ({} rows dropped)",
		graph.nodes.len(),
		graph.edges.len(),
		dropped
	);
	Ok(graph)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn rows(value: serde_json::Value) -> Vec<Row> {
		serde_json::from_value(value).unwrap()
	}

	fn columns(edge_type: Option<&str>) -> ResolvedColumns {
		ResolvedColumns {
			source: "s".into(),
			target: "t".into(),
			edge_type: edge_type.map(str::to_string),
		}
	}

	#[test]
	fn bucket_uses_first_code_unit() {
		// 'A' = 65, 65 % 5 = 0
		assert_eq!(group_bucket("Alice"), 1);
		// 'B' = 66
		assert_eq!(group_bucket("Bob"), 2);
		assert_eq!(group_bucket("Bob"), group_bucket("Bobby"));
		assert!((1..=GROUP_BUCKETS).contains(&group_bucket("é")));
	}

	#[test]
	fn nodes_are_deduplicated_and_edges_kept() {
		let data = rows(json!([
			{"s": "a", "t": "b", "k": "x"},
			{"s": "a", "t": "b", "k": "x"},
			{"s": "b", "t": "a", "k": "y"},
		]));
		let graph = build_graph(&columns(Some("k")), &data).unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 3);
		assert_eq!(graph.edge_types(), vec!["x", "y"]);
	}

	#[test]
	fn rows_missing_an_endpoint_are_dropped() {
		let data = rows(json!([
			{"s": "", "t": "b"},
			{"s": "a", "t": null},
			{"t": "c"},
			{"s": "d", "t": "e"},
		]));
		let graph = build_graph(&columns(None), &data).unwrap();
		assert_eq!(graph.nodes.keys().collect::<Vec<_>>(), vec!["d", "e"]);
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.edges[0].edge_type, DEFAULT_EDGE_TYPE);
	}

	#[test]
	fn empty_type_cell_gets_default_label() {
		let data = rows(json!([{"s": "a", "t": "b", "k": ""}, {"s": 1, "t": 2, "k": "num"}]));
		let graph = build_graph(&columns(Some("k")), &data).unwrap();
		assert_eq!(graph.edges[0].edge_type, DEFAULT_EDGE_TYPE);
		assert_eq!(graph.edges[1].source, "1");
	}

	#[test]
	fn self_loops_are_permitted() {
		let data = rows(json!([{"s": "a", "t": "a"}]));
		let graph = build_graph(&columns(None), &data).unwrap();
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges[0].is_self_loop());
		assert!(graph.neighbors("a").is_empty());
	}

	#[test]
	fn non_scalar_cell_aborts_build() {
		let data = rows(json!([{"s": "a", "t": "b"}, {"s": {"nested": true}, "t": "b"}]));
		let err = build_graph(&columns(None), &data).unwrap_err();
		assert!(matches!(err, LoadError::GraphBuild(msg) if msg.contains("\"s\"")));
	}

	#[test]
	fn neighbors_cover_both_directions() {
		let data = rows(json!([
			{"s": "a", "t": "b"},
			{"s": "c", "t": "a"},
			{"s": "b", "t": "c"},
		]));
		let graph = build_graph(&columns(None), &data).unwrap();
		let n: Vec<&str> = graph.neighbors("a").into_iter().collect();
		assert_eq!(n, vec!["b", "c"]);
	}
}
