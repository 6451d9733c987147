use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Date-time layouts accepted for timestamp cells, tried in order.
const DATETIME_FORMATS: [&str; 8] = [
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M",
	"%Y/%m/%d %H:%M:%S",
	"%Y/%m/%d %H:%M",
	"%d/%m/%Y %H:%M:%S",
	"%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// A tabular record set with named columns.
///
/// Every cell is optional: `None` stands for a null value. Rows are kept in
/// insertion order, which is the order used to break timestamp ties.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RowSet {
	columns: Vec<String>,
	rows: Vec<Vec<Option<String>>>,
}

impl RowSet {
	/// Creates an empty row set with the given column names.
	pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
		Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
	}

	/// Appends a row. Cells beyond the known columns are never read.
	pub fn push_row(&mut self, cells: Vec<Option<String>>) {
		self.rows.push(cells);
	}

	/// Convenience for rows where every cell is present.
	pub fn push_values(&mut self, cells: &[&str]) {
		self.rows.push(cells.iter().map(|c| Some((*c).to_owned())).collect());
	}

	/// Returns the position of a column, if it exists.
	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c == name)
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn rows(&self) -> &[Vec<Option<String>>] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

/// The time-ordered items of one session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionSequence {
	pub session_id: String,
	pub items: Vec<String>,
}

impl AsRef<[String]> for SessionSequence {
	fn as_ref(&self) -> &[String] {
		&self.items
	}
}

/// Parses a timestamp cell into a comparable date-time.
///
/// Accepts RFC 3339, common `date time` layouts, bare dates (midnight) and
/// bare times. Bare times are anchored on 1970-01-01 so they only compare
/// meaningfully with each other.
///
/// Returns `None` when no layout matches.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
	let value = value.trim();

	if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
		return Some(dt.naive_utc());
	}
	if let Some(dt) = DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(value, f).ok()) {
		return Some(dt);
	}
	if let Some(date) = DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(value, f).ok()) {
		return date.and_hms_opt(0, 0, 0);
	}
	let time = TIME_FORMATS.iter().find_map(|f| NaiveTime::parse_from_str(value, f).ok())?;
	Some(NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time))
}

fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
	row.get(idx).and_then(|c| c.as_deref())
}

/// Converts raw event rows into ordered per-session item sequences.
///
/// - Rows with a null session, timestamp or item are dropped.
/// - Rows whose timestamp cannot be parsed are dropped the same way.
/// - Sessions appear in the order they are first encountered.
/// - Items within a session are sorted by timestamp; ties keep row order.
///
/// # Errors
/// - `Schema` if one of the three columns does not exist.
/// - `EmptyResult` if no sequence survives the filtering.
pub fn build_sequences(
	rows: &RowSet,
	session_col: &str,
	time_col: &str,
	item_col: &str,
) -> Result<Vec<SessionSequence>> {
	let mut missing: Vec<String> = Vec::new();
	for name in [session_col, time_col, item_col] {
		if rows.column_index(name).is_none() && !missing.iter().any(|m| m == name) {
			missing.push(name.to_owned());
		}
	}
	let (Some(session_idx), Some(time_idx), Some(item_idx)) =
		(rows.column_index(session_col), rows.column_index(time_col), rows.column_index(item_col))
	else {
		return Err(SeqError::Schema(missing));
	};

	let mut positions: HashMap<&str, usize> = HashMap::new();
	let mut groups: Vec<(&str, Vec<(NaiveDateTime, &str)>)> = Vec::new();
	let mut dropped = 0usize;

	for row in rows.rows() {
		let (Some(session), Some(time), Some(item)) =
			(cell(row, session_idx), cell(row, time_idx), cell(row, item_idx))
		else {
			dropped += 1;
			continue;
		};
		let Some(timestamp) = parse_timestamp(time) else {
			debug!("Dropping row with unparseable timestamp {time:?}");
			dropped += 1;
			continue;
		};

		let position = *positions.entry(session).or_insert_with(|| {
			groups.push((session, Vec::new()));
			groups.len() - 1
		});
		groups[position].1.push((timestamp, item));
	}

	let sequences: Vec<SessionSequence> = groups
		.into_iter()
		.map(|(session, mut events)| {
			// sort_by_key is stable, equal timestamps keep row order
			events.sort_by_key(|(timestamp, _)| *timestamp);
			SessionSequence {
				session_id: session.to_owned(),
				items: events.into_iter().map(|(_, item)| item.to_owned()).collect(),
			}
		})
		.collect();

	if sequences.is_empty() {
		return Err(SeqError::EmptyResult(
			"No valid sequences found. Please check your columns or data.".to_owned(),
		));
	}

	info!("Built {} sequence(s) from {} row(s), {} dropped", sequences.len(), rows.len(), dropped);
	Ok(sequences)
}
