use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::codec::ItemCodec;
use super::readable::{NextItem, ReadableModel};
use super::state::State;
use crate::error::{Result, SeqError};

/// Below this number of sequences counting stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// Chunks per CPU when counting in parallel.
const CHUNK_FACTOR: usize = 8;

/// Represents an order-`k` transition model over encoded items.
///
/// The `TransitionModel` stores one state per observed prefix of `order`
/// consecutive items, each holding the counts of the items that followed it.
///
/// # Responsibilities
/// - Count transitions from encoded sequences
/// - Prune transitions below a minimum support
/// - Merge with another model of the same order
/// - Decode itself into a readable model through an `ItemCodec`
///
/// # Invariants
/// - Each state in `states` corresponds to a unique prefix of length `order`
/// - After pruning, no state is empty
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransitionModel {
	/// Number of items in a prefix.
	order: usize,

	/// Mapping from an encoded prefix to its corresponding state
	states: HashMap<Vec<u32>, State>,
}

impl TransitionModel {
	/// Creates an empty model of the given order.
	///
	/// The order is not validated here; see `TrainConfig::validate`.
	pub fn new(order: usize) -> Self {
		Self { order, states: HashMap::new() }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of prefixes.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn get(&self, prefix: &[u32]) -> Option<&State> {
		self.states.get(prefix)
	}

	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.values()
	}

	/// Adds an encoded sequence to the model.
	///
	/// Every window of `order + 1` consecutive items increments the count of
	/// its last item under the prefix formed by the others. Sequences of
	/// `order` items or fewer contribute nothing.
	pub fn add_sequence(&mut self, sequence: &[u32]) {
		if sequence.len() <= self.order {
			return;
		}

		for window in sequence.windows(self.order + 1) {
			let (prefix, next) = window.split_at(self.order);
			let state = self.states.entry(prefix.to_vec()).or_insert_with(|| State::new(prefix));
			state.add_transition(next[0]);
		}
	}

	/// Keeps only transitions seen at least `min_support` times and drops
	/// the prefixes left without any.
	pub fn prune(&mut self, min_support: u64) {
		for state in self.states.values_mut() {
			state.prune(min_support);
		}
		self.states.retain(|_, state| !state.is_empty());
	}

	/// Merges another transition model into this one.
	///
	/// # Notes
	/// - Both models must have the same order.
	/// - Occurrence counts for matching states and transitions are summed.
	///
	/// # Errors
	/// Returns `OrderMismatch` if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(SeqError::OrderMismatch { left: self.order, right: other.order });
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	/// Translates every prefix and next item back to raw item names.
	///
	/// Next items keep their id order, which is first-seen order.
	///
	/// # Errors
	/// Returns `CorruptModel` if an id is unknown to the codec.
	pub fn decode(&self, codec: &ItemCodec) -> Result<ReadableModel> {
		let unknown = || SeqError::CorruptModel("Transition references an unknown item id".to_owned());

		let mut readable = ReadableModel::new(self.order);
		for state in self.states.values() {
			let prefix = codec.decode(state.key()).ok_or_else(unknown)?;
			let next_items = state
				.transitions()
				.map(|(id, count)| {
					codec.item_of(id).map(|item| NextItem { item: item.to_owned(), count })
				})
				.collect::<Option<Vec<_>>>()
				.ok_or_else(unknown)?;
			readable.insert(prefix, next_items);
		}
		Ok(readable)
	}
}

/// Builds a transition model from encoded sequences.
///
/// # Behavior
/// - Counts every (prefix, next item) pair over all sequences.
/// - Large inputs are split in chunks counted on scoped threads
///   (CPU cores * factor), then merged.
/// - Prunes with `min_support` only once all counts are accumulated.
///
/// # Notes
/// - `order >= 1` and `min_support >= 1` are caller preconditions.
/// - Counts are exact sums, so the chunking does not change the result.
pub fn build_transitions(encoded_sequences: &[Vec<u32>], order: usize, min_support: u64) -> TransitionModel {
	let mut model = if encoded_sequences.len() < PARALLEL_THRESHOLD {
		count_chunk(encoded_sequences, order)
	} else {
		count_parallel(encoded_sequences, order)
	};

	let before = model.len();
	model.prune(min_support);
	info!(
		"Built order-{} transitions: {} prefix(es), {} after min_support={}",
		order,
		before,
		model.len(),
		min_support
	);
	model
}

fn count_chunk(sequences: &[Vec<u32>], order: usize) -> TransitionModel {
	let mut model = TransitionModel::new(order);
	for sequence in sequences {
		model.add_sequence(sequence);
	}
	model
}

fn count_parallel(sequences: &[Vec<u32>], order: usize) -> TransitionModel {
	let chunks = num_cpus::get() * CHUNK_FACTOR;
	let chunk_size = sequences.len().div_ceil(chunks).max(1);
	debug!("Counting {} sequences in chunks of {}", sequences.len(), chunk_size);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for chunk in sequences.chunks(chunk_size) {
			let tx = tx.clone();
			scope.spawn(move || {
				// The receiver outlives the scope, sending cannot fail
				let _ = tx.send(count_chunk(chunk, order));
			});
		}
	});
	drop(tx);

	let mut model = TransitionModel::new(order);
	for partial in rx.iter() {
		// Same order everywhere, merge cannot fail
		let _ = model.merge(&partial);
	}
	model
}
