use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Which user items form the lookup prefix.
///
/// # Variants
/// - `LastItem`: only the last item, whatever the trained order. This is the
///   historical behavior and only matches order-1 models.
/// - `TrainedOrder`: the last `order` items, matching the model's prefixes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrefixPolicy {
	#[default]
	LastItem,
	TrainedOrder,
}

impl FromStr for PrefixPolicy {
	type Err = SeqError;

	/// Accepts `last` / `last_item` and `order` / `trained_order`.
	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_lowercase().as_str() {
			"last" | "last_item" => Ok(Self::LastItem),
			"order" | "trained_order" => Ok(Self::TrainedOrder),
			other => Err(SeqError::InvalidConfig(format!(
				"Prefix policy must be 'last' or 'order', got '{other}'"
			))),
		}
	}
}

/// Parameters of a recommendation request.
///
/// # Invariants
/// - `top_n` is always >= 1
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendQuery {
	/// Maximum number of items returned.
	top_n: usize,

	/// How the prefix is taken from the user items.
	pub prefix_policy: PrefixPolicy,
}

impl RecommendQuery {
	/// Creates a query using the `LastItem` policy.
	///
	/// # Errors
	/// Returns an error if `top_n` is 0.
	pub fn new(top_n: usize) -> Result<Self> {
		let mut query = Self { top_n: 1, prefix_policy: PrefixPolicy::default() };
		query.set_top_n(top_n)?;
		Ok(query)
	}

	pub fn with_policy(mut self, prefix_policy: PrefixPolicy) -> Self {
		self.prefix_policy = prefix_policy;
		self
	}

	pub fn top_n(&self) -> usize {
		self.top_n
	}

	/// Sets the number of recommendations.
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_top_n(&mut self, top_n: usize) -> Result<()> {
		if top_n < 1 {
			return Err(SeqError::InvalidConfig("top_n must be >= 1".to_owned()));
		}
		self.top_n = top_n;
		Ok(())
	}
}

/// Splits a free-text list such as `"Milk, Bread"` into trimmed, non-empty items.
pub fn parse_user_items(input: &str) -> Vec<String> {
	input.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn top_n_must_be_positive() {
		assert!(RecommendQuery::new(0).is_err());
		let mut query = RecommendQuery::new(5).unwrap();
		assert_eq!(query.prefix_policy, PrefixPolicy::LastItem);
		assert!(query.set_top_n(0).is_err());
		assert_eq!(query.top_n(), 5);
	}

	#[test]
	fn policy_from_str() {
		assert_eq!("order".parse::<PrefixPolicy>().unwrap(), PrefixPolicy::TrainedOrder);
		assert_eq!(" Last ".parse::<PrefixPolicy>().unwrap(), PrefixPolicy::LastItem);
		assert!("first".parse::<PrefixPolicy>().is_err());
	}

	#[test]
	fn user_items_are_split_and_trimmed() {
		assert_eq!(parse_user_items(" Milk, Bread ,, "), vec!["Milk", "Bread"]);
		assert!(parse_user_items("").is_empty());
	}
}
