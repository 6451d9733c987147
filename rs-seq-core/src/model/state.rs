use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Represents a state in the transition model.
///
/// A `State` corresponds to a fixed prefix of `order` encoded items (`key`)
/// and stores how often each next item followed it.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during counting
/// - Drop transitions below a support threshold
/// - Rank next items by frequency
/// - Merge with another state having the same key (parallel counting)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// Encoded prefix identifying the state.
	key: Vec<u32>,
	/// Outgoing transitions indexed by the next item id.
	/// Example: { 4 => 42, 7 => 3 }
	transitions: BTreeMap<u32, u64>,
}

impl State {
	/// Creates a new empty state for the given prefix.
	pub fn new(key: &[u32]) -> Self {
		Self { key: key.to_vec(), transitions: BTreeMap::new() }
	}

	pub fn key(&self) -> &[u32] {
		&self.key
	}

	/// Records an occurrence of a transition toward `next_item`.
	pub fn add_transition(&mut self, next_item: u32) {
		*self.transitions.entry(next_item).or_insert(0) += 1;
	}

	/// Occurrence count of `next_item` after this prefix (0 if never seen).
	pub fn count(&self, next_item: u32) -> u64 {
		self.transitions.get(&next_item).copied().unwrap_or(0)
	}

	/// Transitions in ascending id order, i.e. first-seen order.
	pub fn transitions(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
		self.transitions.iter().map(|(next, count)| (*next, *count))
	}

	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Removes every transition seen fewer than `min_support` times.
	pub fn prune(&mut self, min_support: u64) {
		self.transitions.retain(|_, count| *count >= min_support);
	}

	/// Next items sorted by descending count, ties by ascending id.
	pub fn ranked(&self) -> Vec<(u32, u64)> {
		let mut ranked: Vec<(u32, u64)> = self.transitions().collect();
		// Stable sort over id order keeps first-seen items first on ties
		ranked.sort_by(|a, b| b.1.cmp(&a.1));
		ranked
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same prefix (`key`).
	/// Transition occurrence counts are summed.
	///
	/// # Errors
	/// Returns `KeyMismatch` if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(SeqError::KeyMismatch);
		}

		for (next_item, occurrence) in &other.transitions {
			*self.transitions.entry(*next_item).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_and_prunes() {
		let mut state = State::new(&[1]);
		state.add_transition(2);
		state.add_transition(2);
		state.add_transition(3);
		assert_eq!(state.count(2), 2);
		assert_eq!(state.count(9), 0);

		state.prune(2);
		assert_eq!(state.transitions().collect::<Vec<_>>(), vec![(2, 2)]);
		state.prune(3);
		assert!(state.is_empty());
	}

	#[test]
	fn ranking_breaks_ties_by_id() {
		let mut state = State::new(&[0]);
		for next in [5, 3, 3, 1, 5, 4] {
			state.add_transition(next);
		}
		assert_eq!(state.ranked(), vec![(3, 2), (5, 2), (1, 1), (4, 1)]);
	}

	#[test]
	fn merge_requires_same_key() {
		let mut left = State::new(&[0, 1]);
		left.add_transition(2);
		let mut right = State::new(&[0, 1]);
		right.add_transition(2);
		right.add_transition(3);

		left.merge(&right).unwrap();
		assert_eq!(left.count(2), 2);
		assert_eq!(left.count(3), 1);

		assert!(matches!(left.merge(&State::new(&[1, 0])), Err(SeqError::KeyMismatch)));
	}
}
