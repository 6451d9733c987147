use std::fmt;

use serde::Serialize;

use super::query::{PrefixPolicy, RecommendQuery};
use super::readable::{tuple_literal, ReadableModel};

/// Outcome of a recommendation lookup.
///
/// Only `Items` carries recommendations. The other variants are expected
/// outcomes on sparse data or novel prefixes and are meant to be shown to
/// the user as-is.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendation {
	/// Ranked next items, best first.
	Items { items: Vec<String> },
	/// No prefix of the model equals the queried one.
	NoMatch { prefix: Vec<String> },
	/// The prefix exists but has no next item.
	NoNextItems { prefix: Vec<String> },
	/// The user supplied no item.
	EmptyInput,
	/// Fewer items than the trained order were supplied.
	PrefixTooShort { needed: usize, got: usize },
}

impl Recommendation {
	pub fn is_match(&self) -> bool {
		matches!(self, Self::Items { .. })
	}

	/// Recommended items, empty for diagnostics.
	pub fn items(&self) -> &[String] {
		match self {
			Self::Items { items } => items,
			_ => &[],
		}
	}

	/// The items, or a single line describing why there are none.
	pub fn to_lines(&self) -> Vec<String> {
		match self {
			Self::Items { items } => items.clone(),
			other => vec![other.to_string()],
		}
	}
}

impl fmt::Display for Recommendation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Items { items } => write!(f, "{}", items.join(", ")),
			Self::NoMatch { prefix } => {
				write!(f, "No matching pattern found for this sequence ({}).", tuple_literal(prefix))
			}
			Self::NoNextItems { prefix } => write!(f, "No next items found for {}.", tuple_literal(prefix)),
			Self::EmptyInput => write!(f, "Please enter at least one item."),
			Self::PrefixTooShort { needed, got } => {
				write!(f, "Please enter at least {needed} item(s), got {got}.")
			}
		}
	}
}

/// Recommends the next items after the last user item.
///
/// Only the last item is used as prefix, whatever the order the model was
/// trained with, so models of order > 1 never match here. Use [`recommend`]
/// with `PrefixPolicy::TrainedOrder` to query them.
///
/// Candidates are ranked by descending count; ties keep the model's item
/// order (first seen first). At most `top_n` items are returned.
pub fn recommend_next<S: AsRef<str>>(user_items: &[S], model: &ReadableModel, top_n: usize) -> Recommendation {
	let Some(last) = user_items.last() else {
		return Recommendation::EmptyInput;
	};
	lookup(vec![last.as_ref().to_owned()], model, top_n)
}

/// Recommends the next items using the query's prefix policy.
pub fn recommend<S: AsRef<str>>(user_items: &[S], model: &ReadableModel, query: &RecommendQuery) -> Recommendation {
	match query.prefix_policy {
		PrefixPolicy::LastItem => recommend_next(user_items, model, query.top_n()),
		PrefixPolicy::TrainedOrder => {
			if user_items.is_empty() {
				return Recommendation::EmptyInput;
			}
			let order = model.order();
			if user_items.len() < order {
				return Recommendation::PrefixTooShort { needed: order, got: user_items.len() };
			}
			let prefix = user_items[user_items.len() - order..].iter().map(|s| s.as_ref().to_owned()).collect();
			lookup(prefix, model, query.top_n())
		}
	}
}

fn lookup(prefix: Vec<String>, model: &ReadableModel, top_n: usize) -> Recommendation {
	let Some(next_items) = model.get(&prefix) else {
		return Recommendation::NoMatch { prefix };
	};
	if next_items.is_empty() {
		return Recommendation::NoNextItems { prefix };
	}

	let mut ranked: Vec<_> = next_items.iter().collect();
	ranked.sort_by(|a, b| b.count.cmp(&a.count));

	Recommendation::Items { items: ranked.into_iter().take(top_n).map(|next| next.item.clone()).collect() }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::readable::NextItem;

	fn grocery() -> ReadableModel {
		ReadableModel::from_patterns([
			(vec!["Milk"], vec![("Bread", 3), ("Eggs", 5)]),
			(vec!["Bread"], vec![("Butter", 2), ("Jam", 2), ("Milk", 4)]),
		])
	}

	#[test]
	fn ranks_by_count() {
		assert_eq!(recommend_next(&["Milk"], &grocery(), 1).to_lines(), vec!["Eggs"]);
		assert_eq!(recommend_next(&["Milk"], &grocery(), 10).items(), &["Eggs", "Bread"]);
	}

	#[test]
	fn ties_keep_model_order() {
		let result = recommend_next(&["Tea", "Bread"], &grocery(), 3);
		assert_eq!(result.items(), &["Milk", "Butter", "Jam"]);
	}

	#[test]
	fn unknown_prefix_is_a_diagnostic() {
		let result = recommend_next(&["Unknown"], &grocery(), 5);
		assert!(!result.is_match());
		let lines = result.to_lines();
		assert_eq!(lines.len(), 1);
		assert!(lines[0].contains("('Unknown',)"));
	}

	#[test]
	fn empty_table_and_empty_input() {
		let mut model = grocery();
		model.insert(vec!["Salt".to_owned()], Vec::<NextItem>::new());
		assert_eq!(
			recommend_next(&["Salt"], &model, 5),
			Recommendation::NoNextItems { prefix: vec!["Salt".to_owned()] }
		);
		assert_eq!(recommend_next::<&str>(&[], &model, 5), Recommendation::EmptyInput);
	}

	#[test]
	fn last_item_never_matches_higher_orders() {
		let model = ReadableModel::from_patterns([(vec!["Milk", "Bread"], vec![("Butter", 1)])]);
		assert!(matches!(recommend_next(&["Milk", "Bread"], &model, 5), Recommendation::NoMatch { .. }));

		let query = RecommendQuery::new(5).unwrap().with_policy(PrefixPolicy::TrainedOrder);
		assert_eq!(recommend(&["Tea", "Milk", "Bread"], &model, &query).items(), &["Butter"]);
		assert_eq!(
			recommend(&["Bread"], &model, &query),
			Recommendation::PrefixTooShort { needed: 2, got: 1 }
		);
	}
}
