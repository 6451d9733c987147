use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Bidirectional mapping between raw item identifiers and compact ids.
///
/// Ids are assigned from 0 in first-seen order over the flattened sequences,
/// so a smaller id always means the item was observed earlier. The codec is
/// only meaningful for the training run that built it.
///
/// # Invariants
/// - `id_to_item[item_to_id[x]] == x` for every known item
/// - Both directions have the same length
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemCodec {
	item_to_id: HashMap<String, u32>,
	id_to_item: Vec<String>,
}

/// On-disk form of the codec: both directions, string keyed.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct CodecRecord {
	item_to_id: BTreeMap<String, String>,
	id_to_item: BTreeMap<String, String>,
}

impl ItemCodec {
	/// Builds the codec from every item of every sequence.
	pub fn build<I, S>(sequences: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[String]>,
	{
		let mut codec = Self::default();
		for sequence in sequences {
			for item in sequence.as_ref() {
				codec.insert(item);
			}
		}
		codec
	}

	fn insert(&mut self, item: &str) -> u32 {
		if let Some(id) = self.item_to_id.get(item) {
			return *id;
		}
		let id = self.id_to_item.len() as u32;
		self.item_to_id.insert(item.to_owned(), id);
		self.id_to_item.push(item.to_owned());
		id
	}

	pub fn id_of(&self, item: &str) -> Option<u32> {
		self.item_to_id.get(item).copied()
	}

	pub fn item_of(&self, id: u32) -> Option<&str> {
		self.id_to_item.get(id as usize).map(String::as_str)
	}

	/// Number of distinct items.
	pub fn len(&self) -> usize {
		self.id_to_item.len()
	}

	pub fn is_empty(&self) -> bool {
		self.id_to_item.is_empty()
	}

	/// Items in id order.
	pub fn items(&self) -> &[String] {
		&self.id_to_item
	}

	/// Encodes a sequence. Items unknown to the codec are skipped.
	pub fn encode(&self, sequence: &[String]) -> Vec<u32> {
		sequence
			.iter()
			.filter_map(|item| {
				let id = self.id_of(item);
				if id.is_none() {
					warn!("Skipping item {item:?} absent from the codec");
				}
				id
			})
			.collect()
	}

	/// Encodes every sequence.
	pub fn encode_all<I, S>(&self, sequences: I) -> Vec<Vec<u32>>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[String]>,
	{
		sequences.into_iter().map(|s| self.encode(s.as_ref())).collect()
	}

	/// Decodes a sequence of ids. Returns `None` if any id is unknown.
	pub fn decode(&self, ids: &[u32]) -> Option<Vec<String>> {
		ids.iter().map(|id| self.item_of(*id).map(str::to_owned)).collect()
	}

	pub(crate) fn to_record(&self) -> CodecRecord {
		CodecRecord {
			item_to_id: self.item_to_id.iter().map(|(item, id)| (item.clone(), id.to_string())).collect(),
			id_to_item: self.id_to_item.iter().enumerate().map(|(id, item)| (id.to_string(), item.clone())).collect(),
		}
	}

	/// Rebuilds a codec from its persisted record.
	///
	/// # Errors
	/// Returns `CorruptModel` if ids are not dense from 0 or the two
	/// directions disagree.
	pub(crate) fn from_record(record: CodecRecord) -> Result<Self> {
		let mut by_id: BTreeMap<u32, String> = BTreeMap::new();
		for (id, item) in record.id_to_item {
			let id: u32 = id
				.parse()
				.map_err(|_| SeqError::CorruptModel(format!("Invalid item id {id:?}")))?;
			by_id.insert(id, item);
		}

		let mut codec = Self::default();
		for (expected, (id, item)) in by_id.into_iter().enumerate() {
			if id as usize != expected {
				return Err(SeqError::CorruptModel(format!("Item ids are not contiguous at {id}")));
			}
			codec.insert(&item);
		}

		if codec.item_to_id.len() != record.item_to_id.len()
			|| record.item_to_id.iter().any(|(item, id)| codec.id_of(item).map(|i| i.to_string()).as_ref() != Some(id))
		{
			return Err(SeqError::CorruptModel("Item mapping directions disagree".to_owned()));
		}
		Ok(codec)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn seqs(data: &[&[&str]]) -> Vec<Vec<String>> {
		data.iter().map(|s| s.iter().map(|i| i.to_string()).collect()).collect()
	}

	#[test]
	fn ids_follow_first_occurrence() {
		let codec = ItemCodec::build(&seqs(&[&["Milk", "Bread"], &["Tea", "Milk", "Sugar"]]));
		assert_eq!(codec.items(), &["Milk", "Bread", "Tea", "Sugar"]);
		assert_eq!(codec.id_of("Tea"), Some(2));
		assert_eq!(codec.item_of(3), Some("Sugar"));
		assert_eq!(codec.id_of("Coffee"), None);
	}

	#[test]
	fn codec_is_a_bijection() {
		let sequences = seqs(&[&["A", "B", "A", "C"], &["C", "D"]]);
		let codec = ItemCodec::build(&sequences);
		for item in sequences.iter().flatten() {
			let id = codec.id_of(item).unwrap();
			assert_eq!(codec.item_of(id), Some(item.as_str()));
		}
		assert_eq!(codec.len(), 4);
		assert_eq!(codec.to_record().item_to_id.len(), codec.to_record().id_to_item.len());
	}

	#[test]
	fn encode_skips_unknown_items() {
		let codec = ItemCodec::build(&seqs(&[&["A", "B"]]));
		let encoded = codec.encode(&seqs(&[&["A", "X", "B"]])[0]);
		assert_eq!(encoded, vec![0, 1]);
		assert_eq!(codec.decode(&encoded), Some(vec!["A".to_owned(), "B".to_owned()]));
		assert_eq!(codec.decode(&[7]), None);
	}

	#[test]
	fn record_round_trip_and_corruption() {
		let codec = ItemCodec::build(&seqs(&[&["x", "y", "z"]]));
		assert_eq!(ItemCodec::from_record(codec.to_record()).unwrap(), codec);

		let mut record = codec.to_record();
		record.id_to_item.remove("1");
		assert!(matches!(ItemCodec::from_record(record), Err(SeqError::CorruptModel(_))));
	}
}
