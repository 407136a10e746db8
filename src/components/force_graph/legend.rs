//! Relationship-type legend.
//!
//! Entries follow the first-seen order of types in the edge list, and colors
//! are assigned by that ordinal. Reordering input rows can therefore reorder
//! colors.

use crate::data::GraphModel;

use super::theme::{Color, Palette};

/// A (type, color) pair shown in the key and used as a filter control.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub edge_type: String,
	pub color: Color,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
	pub entries: Vec<LegendEntry>,
}

impl Legend {
	pub fn new(model: &GraphModel, palette: &Palette) -> Self {
		let entries = model
			.edge_types()
			.into_iter()
			.enumerate()
			.map(|(i, edge_type)| LegendEntry {
				edge_type,
				color: palette.get(i),
			})
			.collect();
		Self { entries }
	}

	/// Color assigned to a type, if it appears in the graph.
	pub fn color_for(&self, edge_type: &str) -> Option<Color> {
		self.entries
			.iter()
			.find(|e| e.edge_type == edge_type)
			.map(|e| e.color)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::{ColumnMapping, parse_csv, process_rows};

	fn legend(csv: &str) -> Legend {
		let model = process_rows(&parse_csv(csv).unwrap(), &ColumnMapping::default()).unwrap();
		Legend::new(&model, &Palette::category10())
	}

	#[test]
	fn entries_in_first_seen_order() {
		let l = legend("s,k,t\na,work,b\nb,family,c\nc,work,a\n");
		let types: Vec<&str> = l.entries.iter().map(|e| e.edge_type.as_str()).collect();
		assert_eq!(types, vec!["work", "family"]);
		assert_eq!(l.color_for("work"), Some(Palette::category10().get(0)));
		assert_eq!(l.color_for("missing"), None);
	}

	#[test]
	fn same_input_order_gives_same_colors() {
		let csv = "s,k,t\na,x,b\nb,y,c\nc,z,d\n";
		assert_eq!(legend(csv), legend(csv));
	}

	#[test]
	fn reordered_rows_can_reorder_colors() {
		let first = legend("s,k,t\na,x,b\nb,y,c\n");
		let second = legend("s,k,t\nb,y,c\na,x,b\n");
		assert_ne!(first.color_for("x"), second.color_for("x"));
	}
}
