//! Decides which row fields supply the source, target and type of each edge.

use super::error::LoadError;
use super::row::Row;

/// Canonical column names used by the bundled sample and by prepared payloads.
pub const SOURCE_COLUMN: &str = "Source";
pub const TARGET_COLUMN: &str = "Target";
pub const TYPE_COLUMN: &str = "RelationshipType";

/// User-selected column roles. Unset roles fall back to positional defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMapping {
	pub source: Option<String>,
	pub target: Option<String>,
	pub edge_type: Option<String>,
}

impl ColumnMapping {
	/// Explicit mapping for all three roles.
	pub fn explicit(
		source: impl Into<String>,
		target: impl Into<String>,
		edge_type: Option<&str>,
	) -> Self {
		Self {
			source: Some(source.into()),
			target: Some(target.into()),
			edge_type: edge_type.map(str::to_string),
		}
	}

	/// Preselects the canonical columns when the headers contain them.
	///
	/// Returns an empty mapping (default mode) otherwise.
	pub fn detect(headers: &[String]) -> Self {
		let has = |name: &str| headers.iter().any(|h| h == name);
		if has(SOURCE_COLUMN) && has(TARGET_COLUMN) {
			Self::explicit(
				SOURCE_COLUMN,
				TARGET_COLUMN,
				has(TYPE_COLUMN).then_some(TYPE_COLUMN),
			)
		} else {
			Self::default()
		}
	}

	/// True when no role is pinned to a column.
	pub fn is_empty(&self) -> bool {
		self.source.is_none() && self.target.is_none() && self.edge_type.is_none()
	}

	pub fn get(&self, role: ColumnRole) -> Option<&str> {
		match role {
			ColumnRole::Source => self.source.as_deref(),
			ColumnRole::Target => self.target.as_deref(),
			ColumnRole::Type => self.edge_type.as_deref(),
		}
	}

	/// Pins `role` to `column`, or releases it with `None`.
	pub fn set(&mut self, role: ColumnRole, column: Option<String>) {
		let slot = match role {
			ColumnRole::Source => &mut self.source,
			ColumnRole::Target => &mut self.target,
			ColumnRole::Type => &mut self.edge_type,
		};
		*slot = column;
	}
}

/// One of the three roles a column can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
	Source,
	Target,
	Type,
}

/// Effective column names read for every row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedColumns {
	pub source: String,
	pub target: String,
	/// `None` means every edge gets the default type label.
	pub edge_type: Option<String>,
}

/// Turns a mapping plus the shape of the first row into concrete column names.
///
/// An explicit source and target are used verbatim. Otherwise the first three
/// fields of `sample` are taken by position as source, type and target.
pub fn resolve_columns(mapping: &ColumnMapping, sample: &Row) -> Result<ResolvedColumns, LoadError> {
	if let (Some(source), Some(target)) = (&mapping.source, &mapping.target) {
		return Ok(ResolvedColumns {
			source: source.clone(),
			target: target.clone(),
			edge_type: mapping.edge_type.clone(),
		});
	}

	let mut fields = sample.keys();
	match (fields.next(), fields.next(), fields.next()) {
		(Some(source), Some(edge_type), Some(target)) => Ok(ResolvedColumns {
			source: source.clone(),
			target: target.clone(),
			edge_type: Some(edge_type.clone()),
		}),
		_ => Err(LoadError::ColumnCount),
	}
}
