//! Browser-free data pipeline: rows in, immutable graph out.
//!
//! Rows come from the CSV decoder or a programmatic payload, pass through the
//! column resolver and are folded into a [`GraphModel`]. Nothing here touches
//! the DOM, so the whole pipeline is testable natively.

pub mod columns;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod prepare;
pub mod row;
pub mod session;

pub use columns::{ColumnMapping, ColumnRole, ResolvedColumns, resolve_columns};
pub use error::LoadError;
pub use graph::{DEFAULT_EDGE_TYPE, Edge, GraphModel, Node, build_graph, group_bucket};
pub use ingest::{
	Payload, SAMPLES, SampleDataset, check_extension, parse_csv, parse_payload, payload_from_query,
};
pub use row::Row;
pub use session::{DataSession, process_rows};
