//! Save / load tests for the model artifacts.

use std::fs;

use rs_seq_core::SeqError;
use rs_seq_core::model::codec::ItemCodec;
use rs_seq_core::model::ngram_model::build_transitions;
use rs_seq_core::model::persistence::{self, ModelMetadata, META_FILE, MODEL_FILE};

fn sequences() -> Vec<Vec<String>> {
	[["Milk", "Bread", "Butter"], ["Milk", "Bread", "Jam"], ["Tea", "Milk", "Bread"]]
		.iter()
		.map(|s| s.iter().map(|i| i.to_string()).collect())
		.collect()
}

fn metadata(codec: &ItemCodec) -> ModelMetadata {
	ModelMetadata { order: 1, min_support: 1, num_sequences: 3, unique_items: codec.len() }
}

#[test]
fn round_trip_reproduces_encoded_transitions() {
	let dir = tempfile::tempdir().unwrap();
	let codec = ItemCodec::build(&sequences());
	let transitions = build_transitions(&codec.encode_all(&sequences()), 1, 1);

	let paths = persistence::save(&transitions, &codec, &metadata(&codec), dir.path()).unwrap();
	for path in [&paths.model, &paths.mapping, &paths.readable, &paths.metadata] {
		assert!(path.exists(), "{} missing", path.display());
	}

	let loaded = persistence::load(dir.path()).unwrap();
	assert_eq!(loaded.transitions, transitions);
	assert_eq!(loaded.codec, codec);
	assert_eq!(loaded.metadata, metadata(&codec));
	assert_eq!(loaded.readable().unwrap(), transitions.decode(&codec).unwrap());
}

#[test]
fn readable_and_metadata_files_are_json() {
	let dir = tempfile::tempdir().unwrap();
	let codec = ItemCodec::build(&sequences());
	let transitions = build_transitions(&codec.encode_all(&sequences()), 1, 1);
	let paths = persistence::save(&transitions, &codec, &metadata(&codec), dir.path()).unwrap();

	let readable: serde_json::Value = serde_json::from_slice(&fs::read(&paths.readable).unwrap()).unwrap();
	assert_eq!(readable["('Milk',)"]["Bread"], 3);
	assert_eq!(readable["('Bread',)"]["Butter"], 1);
	assert_eq!(readable["('Bread',)"]["Jam"], 1);
	assert!(readable.get("('Butter',)").is_none());

	let meta: serde_json::Value = serde_json::from_slice(&fs::read(&paths.metadata).unwrap()).unwrap();
	assert_eq!(meta["order"], 1);
	assert_eq!(meta["min_support"], 1);
	assert_eq!(meta["num_sequences"], 3);
	assert_eq!(meta["unique_items"], 5);

	assert_eq!(persistence::load_metadata(dir.path()).unwrap().unique_items, 5);
}

#[test]
fn save_overwrites_previous_model() {
	let dir = tempfile::tempdir().unwrap();
	let codec = ItemCodec::build(&sequences());
	let encoded = codec.encode_all(&sequences());

	let first = build_transitions(&encoded, 1, 1);
	persistence::save(&first, &codec, &metadata(&codec), dir.path()).unwrap();

	let second = build_transitions(&encoded, 1, 3);
	let meta = ModelMetadata { min_support: 3, ..metadata(&codec) };
	persistence::save(&second, &codec, &meta, dir.path()).unwrap();

	let loaded = persistence::load(dir.path()).unwrap();
	assert_eq!(loaded.transitions, second);
	assert_eq!(loaded.metadata.min_support, 3);
	let leftovers: Vec<_> = fs::read_dir(dir.path())
		.unwrap()
		.filter_map(|e| e.ok())
		.filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
		.collect();
	assert!(leftovers.is_empty());
}

#[test]
fn missing_artifacts_are_not_found() {
	let dir = tempfile::tempdir().unwrap();
	match persistence::load(dir.path()) {
		Err(SeqError::NotFound { path }) => assert!(path.ends_with(MODEL_FILE)),
		other => panic!("unexpected result: {other:?}"),
	}

	let codec = ItemCodec::build(&sequences());
	let transitions = build_transitions(&codec.encode_all(&sequences()), 1, 1);
	persistence::save(&transitions, &codec, &metadata(&codec), dir.path()).unwrap();
	fs::remove_file(dir.path().join(META_FILE)).unwrap();

	assert!(matches!(persistence::load(dir.path()), Err(SeqError::NotFound { .. })));
	assert!(matches!(persistence::load_metadata(dir.path()), Err(SeqError::NotFound { .. })));
}

#[test]
fn order_mismatch_between_files_is_corrupt() {
	let dir = tempfile::tempdir().unwrap();
	let codec = ItemCodec::build(&sequences());
	let transitions = build_transitions(&codec.encode_all(&sequences()), 2, 1);
	persistence::save(&transitions, &codec, &metadata(&codec), dir.path()).unwrap();

	assert!(matches!(persistence::load(dir.path()), Err(SeqError::CorruptModel(_))));
}
