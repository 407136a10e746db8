//! Row records as produced by the CSV decoder or a programmatic payload.

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// One input record: column name to scalar cell, in column order.
///
/// Column order matters. Default column resolution reads fields by position.
pub type Row = IndexMap<String, Value>;

/// Reads a cell as a string, treating absent and null cells as empty.
///
/// Booleans use their display form. Integral numbers print without a
/// fractional part, so `5` and `5.0` name the same entity. Arrays and objects have no
/// sensible string form and are rejected with a description of the offending
/// cell.
pub fn coerce_cell(row: &Row, column: &str) -> Result<String, String> {
	match row.get(column) {
		None | Some(Value::Null) => Ok(String::new()),
		Some(Value::String(s)) => Ok(s.clone()),
		Some(Value::Number(n)) => Ok(number_to_string(n)),
		Some(Value::Bool(b)) => Ok(b.to_string()),
		Some(other) => Err(format!(
			"column \"{column}\" holds a non-scalar value: {other}"
		)),
	}
}

fn number_to_string(n: &Number) -> String {
	if let Some(i) = n.as_i64() {
		i.to_string()
	} else if let Some(u) = n.as_u64() {
		u.to_string()
	} else {
		n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
	}
}

/// Column names of a row, in order.
pub fn headers(row: &Row) -> Vec<String> {
	row.keys().cloned().collect()
}
