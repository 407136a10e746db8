//! Ingestion channels: CSV files, bundled samples and programmatic payloads.

use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use serde_json::Value;

use super::columns::{ColumnMapping, SOURCE_COLUMN, TARGET_COLUMN, TYPE_COLUMN};
use super::error::LoadError;
use super::prepare::{DEFAULT_MAX_RECORDS, DEFAULT_PREPARED_TYPE, PrepareOptions, RowFilter, prepare_rows};
use super::row::Row;

/// Query parameter carrying a URL-encoded JSON payload.
pub const DATA_QUERY_PARAM: &str = "data";

/// A dataset shipped with the app, fetched by relative path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleDataset {
	pub label: &'static str,
	pub path: &'static str,
	/// Whether the sample uses the canonical column names and an explicit mapping.
	pub canonical: bool,
}

impl SampleDataset {
	pub fn mapping(&self) -> ColumnMapping {
		if self.canonical {
			ColumnMapping::explicit(SOURCE_COLUMN, TARGET_COLUMN, Some(TYPE_COLUMN))
		} else {
			ColumnMapping::default()
		}
	}
}

pub const SAMPLES: [SampleDataset; 2] = [
	SampleDataset {
		label: "Sample: canonical columns",
		path: "samples/relationships.csv",
		canonical: true,
	},
	SampleDataset {
		label: "Sample: custom columns",
		path: "samples/custom-columns.csv",
		canonical: false,
	},
];

/// Rows plus the mapping the producer asked for, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
	pub rows: Vec<Row>,
	pub mapping: Option<ColumnMapping>,
}

/// Rejects file names that do not end in `.csv` (any case).
pub fn check_extension(file_name: &str) -> Result<(), LoadError> {
	if file_name.to_ascii_lowercase().ends_with(".csv") {
		Ok(())
	} else {
		Err(LoadError::UnsupportedFormat)
	}
}

/// Decodes delimited text with a header row into rows.
///
/// Short records are accepted; their missing trailing columns are absent from
/// the row.
pub fn parse_csv(text: &str) -> Result<Vec<Row>, LoadError> {
	let mut reader = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::Headers)
		.from_reader(text.as_bytes());
	let headers = reader
		.headers()
		.map_err(|e| LoadError::Parse(e.to_string()))?
		.clone();

	let mut rows = Vec::new();
	for record in reader.records() {
		let record = record.map_err(|e| LoadError::Parse(e.to_string()))?;
		let row: Row = headers
			.iter()
			.zip(record.iter())
			.map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
			.collect();
		rows.push(row);
	}

	if rows.is_empty() {
		return Err(LoadError::Parse("no data rows found".into()));
	}
	info!("parsed {} CSV rows with {} columns", rows.len(), headers.len());
	Ok(rows)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadEnvelope {
	data: Value,
	source: Option<String>,
	target: Option<String>,
	#[serde(rename = "type")]
	edge_type: Option<String>,
	default_type: Option<String>,
	#[serde(default)]
	filters: IndexMap<String, Value>,
	max_records: Option<usize>,
}

/// Interprets a programmatic payload.
///
/// Accepts an array of row objects, a JSON string encoding one, or an
/// envelope object `{ data, source, target, type, filters, maxRecords }`.
pub fn parse_payload(value: Value) -> Result<Payload, LoadError> {
	match value {
		Value::String(text) => parse_payload_str(&text),
		Value::Array(items) => {
			let rows = rows_from_array(items)?;
			check_key_count(&rows)?;
			Ok(Payload { rows, mapping: None })
		}
		Value::Object(obj) if obj.contains_key("data") => {
			let envelope: PayloadEnvelope = serde_json::from_value(Value::Object(obj))
				.map_err(|e| LoadError::payload_detail(e.to_string()))?;
			parse_envelope(envelope)
		}
		_ => Err(LoadError::payload_shape()),
	}
}

/// Parses a JSON-encoded payload.
pub fn parse_payload_str(text: &str) -> Result<Payload, LoadError> {
	let value: Value =
		serde_json::from_str(text).map_err(|e| LoadError::payload_detail(e.to_string()))?;
	if value.is_string() {
		// A string inside a string is not a payload.
		return Err(LoadError::payload_shape());
	}
	parse_payload(value)
}

/// Extracts a payload from a query string such as `?data=%5B...%5D`.
///
/// Returns `Ok(None)` when the parameter is absent.
pub fn payload_from_query(search: &str) -> Result<Option<Payload>, LoadError> {
	let query = search.strip_prefix('?').unwrap_or(search);
	let Some((_, decoded)) =
		url::form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == DATA_QUERY_PARAM)
	else {
		return Ok(None);
	};
	parse_payload_str(&decoded).map(Some)
}

fn parse_envelope(envelope: PayloadEnvelope) -> Result<Payload, LoadError> {
	let rows = match envelope.data {
		Value::Array(items) => rows_from_array(items)?,
		Value::String(text) => parse_payload_str(&text)?.rows,
		_ => return Err(LoadError::payload_shape()),
	};

	let filters = envelope
		.filters
		.iter()
		.map(|(column, condition)| RowFilter::from_json(column, condition))
		.collect::<Result<Vec<_>, _>>()?;

	let options = PrepareOptions {
		source: envelope.source,
		target: envelope.target,
		edge_type: envelope.edge_type,
		default_type: envelope
			.default_type
			.unwrap_or_else(|| DEFAULT_PREPARED_TYPE.to_string()),
		filters,
		max_records: envelope.max_records.unwrap_or(DEFAULT_MAX_RECORDS),
	};
	let standardised = options.standardises();
	let rows = prepare_rows(rows, &options);
	if rows.is_empty() {
		return Err(LoadError::payload_detail("no rows left after filtering"));
	}
	check_key_count(&rows)?;

	Ok(Payload {
		rows,
		mapping: standardised
			.then(|| ColumnMapping::explicit(SOURCE_COLUMN, TARGET_COLUMN, Some(TYPE_COLUMN))),
	})
}

fn rows_from_array(items: Vec<Value>) -> Result<Vec<Row>, LoadError> {
	if items.is_empty() {
		return Err(LoadError::payload_shape());
	}
	items
		.into_iter()
		.map(|item| match item {
			Value::Object(obj) => Ok(obj.into_iter().collect()),
			_ => Err(LoadError::payload_shape()),
		})
		.collect()
}

fn check_key_count(rows: &[Row]) -> Result<(), LoadError> {
	match rows.first() {
		Some(first) if first.len() >= 3 => Ok(()),
		_ => Err(LoadError::payload_shape()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn extension_check_is_case_insensitive() {
		assert!(check_extension("data.CSV").is_ok());
		assert!(check_extension("data.csv").is_ok());
		assert_eq!(check_extension("test.txt"), Err(LoadError::UnsupportedFormat));
		assert_eq!(check_extension("csv"), Err(LoadError::UnsupportedFormat));
	}

	#[test]
	fn csv_rows_keep_header_order() {
		let rows = parse_csv("Person1,ConnectionType,Person2\nAlex,friends,Beth\n").unwrap();
		assert_eq!(rows.len(), 1);
		let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["Person1", "ConnectionType", "Person2"]);
		assert_eq!(rows[0]["Person2"], json!("Beth"));
	}

	#[test]
	fn header_only_csv_is_a_parse_error() {
		let err = parse_csv("a,b,c\n").unwrap_err();
		assert_eq!(err.to_string(), "Error parsing CSV: no data rows found");
	}

	#[test]
	fn payload_shapes() {
		let ok = parse_payload(json!([{"a": "x", "b": "y", "c": "z"}])).unwrap();
		assert_eq!(ok.rows.len(), 1);
		assert_eq!(ok.mapping, None);

		assert!(parse_payload(json!([])).is_err());
		assert!(parse_payload(json!([1, 2])).is_err());
		assert!(parse_payload(json!([{"a": 1, "b": 2}])).is_err());
		assert!(parse_payload(json!({"not": "rows"})).is_err());
	}

	#[test]
	fn json_string_payload() {
		let ok = parse_payload(json!(r#"[{"s":"a","k":"t","d":"b"}]"#)).unwrap();
		assert_eq!(ok.rows[0]["d"], json!("b"));

		let err = parse_payload_str("[{").unwrap_err();
		assert!(matches!(err, LoadError::PayloadShape { detail: Some(_) }));
	}

	#[test]
	fn envelope_is_prepared_with_canonical_mapping() {
		let payload = parse_payload(json!({
			"data": [
				{"user": "ann", "friend": "bo", "score": 3},
				{"user": "bo", "friend": "cy", "score": 1},
			],
			"source": "user",
			"target": "friend",
			"filters": {"score": {"operator": ">=", "value": 2}},
		}))
		.unwrap();
		assert_eq!(payload.rows.len(), 1);
		assert_eq!(payload.rows[0]["Source"], json!("ann"));
		assert_eq!(
			payload.mapping,
			Some(ColumnMapping::explicit("Source", "Target", Some("RelationshipType")))
		);
	}

	#[test]
	fn query_payload_is_url_decoded() {
		let encoded: String = url::form_urlencoded::byte_serialize(
			r#"[{"from":"Ann Lee","kind":"knows","to":"Bo"}]"#.as_bytes(),
		)
		.collect();
		let payload = payload_from_query(&format!("?x=1&data={encoded}")).unwrap().unwrap();
		assert_eq!(payload.rows[0]["from"], json!("Ann Lee"));

		// Percent-encoded keys and `+` spaces decode like any form field.
		let plus = "?%64ata=%5B%7B%22from%22%3A%22Ann+Lee%22%2C%22kind%22%3A%22knows%22%2C%22to%22%3A%22Bo%22%7D%5D";
		let payload = payload_from_query(plus).unwrap().unwrap();
		assert_eq!(payload.rows[0]["from"], json!("Ann Lee"));

		assert_eq!(payload_from_query("?other=1").unwrap(), None);
		assert!(payload_from_query("?data=%5Bnot-json").is_err());
	}

	#[test]
	fn samples_cover_both_resolution_modes() {
		assert!(!SAMPLES[0].mapping().is_empty());
		assert!(SAMPLES[1].mapping().is_empty());
	}
}
