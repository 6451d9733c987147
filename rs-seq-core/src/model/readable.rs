use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One candidate next item and how often it followed a prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextItem {
	pub item: String,
	pub count: u64,
}

/// Transition table keyed by raw item names.
///
/// Prefixes are ordered sequences of item names and are matched by plain
/// structural equality. The Python-style tuple string (`('Milk', 'Bread')`)
/// only appears when the model is serialized for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadableModel {
	order: usize,
	patterns: BTreeMap<Vec<String>, Vec<NextItem>>,
}

impl ReadableModel {
	pub fn new(order: usize) -> Self {
		Self { order, patterns: BTreeMap::new() }
	}

	/// Builds a model from literal patterns, mostly useful for callers that
	/// hold counts produced elsewhere.
	///
	/// The order is taken from the first prefix (1 if there is none).
	pub fn from_patterns<'a, P, N>(patterns: P) -> Self
	where
		P: IntoIterator<Item = (Vec<&'a str>, N)>,
		N: IntoIterator<Item = (&'a str, u64)>,
	{
		let mut model = Self::new(0);
		for (prefix, next_items) in patterns {
			if model.order == 0 {
				model.order = prefix.len();
			}
			model.insert(
				prefix.into_iter().map(str::to_owned).collect(),
				next_items.into_iter().map(|(item, count)| NextItem { item: item.to_owned(), count }).collect(),
			);
		}
		model.order = model.order.max(1);
		model
	}

	/// Inserts or replaces the next items of a prefix.
	///
	/// The order of `next_items` is kept and used to break ranking ties.
	pub fn insert(&mut self, prefix: Vec<String>, next_items: Vec<NextItem>) {
		self.patterns.insert(prefix, next_items);
	}

	/// Number of items in a prefix at training time.
	pub fn order(&self) -> usize {
		self.order
	}

	pub fn get(&self, prefix: &[String]) -> Option<&[NextItem]> {
		self.patterns.get(prefix).map(Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn patterns(&self) -> impl Iterator<Item = (&[String], &[NextItem])> {
		self.patterns.iter().map(|(prefix, next)| (prefix.as_slice(), next.as_slice()))
	}
}

/// Serialized as `{ "('A', 'B')": { "C": 2, "D": 1 }, ... }`.
impl Serialize for ReadableModel {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.patterns.len()))?;
		for (prefix, next_items) in &self.patterns {
			map.serialize_entry(&tuple_literal(prefix), &NextItems(next_items))?;
		}
		map.end()
	}
}

struct NextItems<'a>(&'a [NextItem]);

impl Serialize for NextItems<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for next in self.0 {
			map.serialize_entry(&next.item, &next.count)?;
		}
		map.end()
	}
}

/// Renders items the way a Python tuple of strings prints.
///
/// Examples:
/// - `["Milk"]` → `('Milk',)`
/// - `["Milk", "Bread"]` → `('Milk', 'Bread')`
/// - `["Kid's"]` → `("Kid's",)`
pub fn tuple_literal<S: AsRef<str>>(items: &[S]) -> String {
	let quoted: Vec<String> = items.iter().map(|item| quote(item.as_ref())).collect();
	match quoted.len() {
		1 => format!("({},)", quoted[0]),
		_ => format!("({})", quoted.join(", ")),
	}
}

fn quote(value: &str) -> String {
	let delimiter = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
	let mut out = String::with_capacity(value.len() + 2);
	out.push(delimiter);
	for c in value.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c if c == delimiter => {
				out.push('\\');
				out.push(c);
			}
			c => out.push(c),
		}
	}
	out.push(delimiter);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tuple_literal_matches_python_repr() {
		assert_eq!(tuple_literal(&["Milk"]), "('Milk',)");
		assert_eq!(tuple_literal(&["Milk", "Bread"]), "('Milk', 'Bread')");
		assert_eq!(tuple_literal(&["Kid's"]), "(\"Kid's\",)");
		assert_eq!(tuple_literal(&["a'b\"c"]), "('a\\'b\"c',)");
		assert_eq!(tuple_literal::<&str>(&[]), "()");
	}

	#[test]
	fn serializes_with_tuple_keys_in_item_order() {
		let model = ReadableModel::from_patterns([(vec!["Milk"], vec![("Eggs", 5), ("Bread", 3)])]);
		let json = serde_json::to_string(&model).unwrap();
		assert_eq!(json, r#"{"('Milk',)":{"Eggs":5,"Bread":3}}"#);
		assert_eq!(model.order(), 1);
	}

	#[test]
	fn lookup_is_structural() {
		let model = ReadableModel::from_patterns([(vec!["A", "B"], vec![("C", 1)])]);
		assert_eq!(model.order(), 2);
		assert!(model.get(&["A".to_owned(), "B".to_owned()]).is_some());
		assert!(model.get(&["B".to_owned()]).is_none());
	}
}
