//! Row filtering, truncation and column standardisation ahead of a graph build.
//!
//! Used by the payload envelope form of programmatic ingestion, where a
//! notebook or script sends a wide table and names the columns it wants
//! visualised.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use super::columns::{SOURCE_COLUMN, TARGET_COLUMN, TYPE_COLUMN};
use super::error::LoadError;
use super::row::Row;

/// Cap on rows kept by [`prepare_rows`] unless the caller sets another.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Type label used when rows are standardised without a type column.
pub const DEFAULT_PREPARED_TYPE: &str = "connection";

/// Comparison applied by a [`RowFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
	Eq,
	Ne,
	Gt,
	Ge,
	Lt,
	Le,
	In,
	NotIn,
}

impl FilterOp {
	fn parse(op: &str) -> Option<Self> {
		Some(match op {
			"==" | "=" => Self::Eq,
			"!=" => Self::Ne,
			">" => Self::Gt,
			">=" => Self::Ge,
			"<" => Self::Lt,
			"<=" => Self::Le,
			"in" => Self::In,
			"not in" => Self::NotIn,
			_ => return None,
		})
	}
}

/// Keeps rows whose `column` satisfies `op` against `value`.
#[derive(Clone, Debug, PartialEq)]
pub struct RowFilter {
	pub column: String,
	pub op: FilterOp,
	pub value: Value,
}

impl RowFilter {
	/// Reads a filter from its JSON form.
	///
	/// A bare value means equality; an object with `operator` and `value`
	/// keys selects a comparison.
	pub fn from_json(column: &str, condition: &Value) -> Result<Self, LoadError> {
		let (op, value) = match condition {
			Value::Object(obj) if obj.contains_key("operator") => {
				let op = obj.get("operator").and_then(Value::as_str).unwrap_or_default();
				let op = FilterOp::parse(op)
					.ok_or_else(|| LoadError::payload_detail(format!("unsupported operator: {op}")))?;
				(op, obj.get("value").cloned().unwrap_or(Value::Null))
			}
			other => (FilterOp::Eq, other.clone()),
		};
		if matches!(op, FilterOp::In | FilterOp::NotIn) && !value.is_array() {
			return Err(LoadError::payload_detail(format!(
				"filter on \"{column}\" needs an array value"
			)));
		}
		Ok(Self {
			column: column.to_string(),
			op,
			value,
		})
	}

	pub fn matches(&self, row: &Row) -> bool {
		let cell = row.get(&self.column).unwrap_or(&Value::Null);
		match self.op {
			FilterOp::Eq => loose_eq(cell, &self.value),
			FilterOp::Ne => !loose_eq(cell, &self.value),
			FilterOp::Gt => loose_cmp(cell, &self.value) == Some(Ordering::Greater),
			FilterOp::Ge => matches!(
				loose_cmp(cell, &self.value),
				Some(Ordering::Greater | Ordering::Equal)
			),
			FilterOp::Lt => loose_cmp(cell, &self.value) == Some(Ordering::Less),
			FilterOp::Le => matches!(
				loose_cmp(cell, &self.value),
				Some(Ordering::Less | Ordering::Equal)
			),
			FilterOp::In => self.in_list(cell),
			FilterOp::NotIn => !self.in_list(cell),
		}
	}

	fn in_list(&self, cell: &Value) -> bool {
		self.value
			.as_array()
			.is_some_and(|items| items.iter().any(|v| loose_eq(cell, v)))
	}
}

/// Numeric view of a cell. CSV cells arrive as strings, so numeric text counts.
fn as_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

fn loose_eq(a: &Value, b: &Value) -> bool {
	match (as_number(a), as_number(b)) {
		(Some(x), Some(y)) => x == y,
		_ => a == b,
	}
}

fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
	if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
		return x.partial_cmp(&y);
	}
	match (a, b) {
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		_ => None,
	}
}

/// What to do with rows before they reach the column resolver.
#[derive(Clone, Debug)]
pub struct PrepareOptions {
	pub source: Option<String>,
	pub target: Option<String>,
	pub edge_type: Option<String>,
	pub default_type: String,
	pub filters: Vec<RowFilter>,
	pub max_records: usize,
}

impl Default for PrepareOptions {
	fn default() -> Self {
		Self {
			source: None,
			target: None,
			edge_type: None,
			default_type: DEFAULT_PREPARED_TYPE.to_string(),
			filters: Vec::new(),
			max_records: DEFAULT_MAX_RECORDS,
		}
	}
}

impl PrepareOptions {
	/// True when rows will be rewritten to the canonical column names.
	pub fn standardises(&self) -> bool {
		self.source.is_some() && self.target.is_some()
	}
}

/// Filters, truncates and (when source and target are named) rewrites rows to
/// the canonical `Source` / `Target` / `RelationshipType` columns.
pub fn prepare_rows(rows: Vec<Row>, options: &PrepareOptions) -> Vec<Row> {
	let mut kept: Vec<Row> = rows
		.into_iter()
		.filter(|row| options.filters.iter().all(|f| f.matches(row)))
		.collect();

	if kept.len() > options.max_records {
		warn!(
			"dataset truncated from {} to {} records",
			kept.len(),
			options.max_records
		);
		kept.truncate(options.max_records);
	}

	let (Some(source), Some(target)) = (&options.source, &options.target) else {
		return kept;
	};

	kept.into_iter()
		.map(|row| {
			let cell = |column: &str| row.get(column).cloned().unwrap_or(Value::Null);
			let edge_type = match &options.edge_type {
				Some(column) => cell(column),
				None => Value::String(options.default_type.clone()),
			};
			let mut out: Row = IndexMap::with_capacity(3);
			out.insert(SOURCE_COLUMN.to_string(), cell(source));
			out.insert(TARGET_COLUMN.to_string(), cell(target));
			out.insert(TYPE_COLUMN.to_string(), edge_type);
			out
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn rows(value: Value) -> Vec<Row> {
		serde_json::from_value(value).unwrap()
	}

	fn people() -> Vec<Row> {
		rows(json!([
			{"user": "ann", "friend": "bo", "kind": "close", "score": 0.9, "active": true},
			{"user": "bo", "friend": "cy", "kind": "work", "score": "0.4", "active": true},
			{"user": "cy", "friend": "ann", "kind": "close", "score": 0.75, "active": false},
		]))
	}

	#[test]
	fn comparison_filters_are_numeric_aware() {
		let f = RowFilter::from_json("score", &json!({"operator": ">", "value": 0.7})).unwrap();
		let kept: Vec<_> = people().into_iter().filter(|r| f.matches(r)).collect();
		assert_eq!(kept.len(), 2);

		let f = RowFilter::from_json("score", &json!({"operator": "<=", "value": "0.4"})).unwrap();
		assert_eq!(people().iter().filter(|r| f.matches(r)).count(), 1);
	}

	#[test]
	fn bare_value_means_equality() {
		let f = RowFilter::from_json("active", &json!(true)).unwrap();
		assert_eq!(f.op, FilterOp::Eq);
		assert_eq!(people().iter().filter(|r| f.matches(r)).count(), 2);
	}

	#[test]
	fn membership_filters() {
		let f = RowFilter::from_json("kind", &json!({"operator": "not in", "value": ["work"]})).unwrap();
		assert_eq!(people().iter().filter(|r| f.matches(r)).count(), 2);

		let err = RowFilter::from_json("kind", &json!({"operator": "in", "value": "work"}));
		assert!(err.is_err());
	}

	#[test]
	fn unknown_operator_is_rejected() {
		let err = RowFilter::from_json("score", &json!({"operator": "~", "value": 1})).unwrap_err();
		assert!(err.to_string().contains("unsupported operator: ~"));
	}

	#[test]
	fn standardises_to_canonical_columns() {
		let options = PrepareOptions {
			source: Some("user".into()),
			target: Some("friend".into()),
			..Default::default()
		};
		let out = prepare_rows(people(), &options);
		assert_eq!(out.len(), 3);
		let keys: Vec<&str> = out[0].keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["Source", "Target", "RelationshipType"]);
		assert_eq!(out[0]["RelationshipType"], json!("connection"));
		assert_eq!(out[2]["Target"], json!("ann"));
	}

	#[test]
	fn truncates_to_max_records() {
		let options = PrepareOptions {
			max_records: 2,
			..Default::default()
		};
		let out = prepare_rows(people(), &options);
		assert_eq!(out.len(), 2);
		// Without source and target names, columns are left alone.
		assert_eq!(out[0].len(), 5);
	}
}
