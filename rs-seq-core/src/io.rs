use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use log::debug;

use crate::model::sequence::RowSet;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Loads a delimited text file into a `RowSet`.
///
/// The first non-empty line holds the column names. Cells are trimmed and
/// empty cells become nulls. Quoting is not interpreted: a cell cannot
/// contain the delimiter. Short rows are padded with nulls, extra cells
/// are ignored.
pub fn load_rows<P: AsRef<Path>>(filename: P, delimiter: char) -> io::Result<RowSet> {
	let lines = read_file(&filename)?;
	let mut lines = lines.iter().filter(|line| !line.trim().is_empty());

	let header = lines.next().ok_or_else(|| {
		io::Error::new(io::ErrorKind::InvalidData, "Input file has no header line")
	})?;
	let columns: Vec<String> = header.split(delimiter).map(|c| c.trim().to_owned()).collect();
	let width = columns.len();

	let mut rows = RowSet::new(columns);
	for line in lines {
		let mut cells: Vec<Option<String>> = line
			.split(delimiter)
			.take(width)
			.map(|cell| {
				let cell = cell.trim();
				if cell.is_empty() { None } else { Some(cell.to_owned()) }
			})
			.collect();
		cells.resize(width, None);
		rows.push_row(cells);
	}

	debug!("Loaded {} row(s) from {}", rows.len(), filename.as_ref().display());
	Ok(rows)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Builds the sibling path a file is staged at before being renamed into place.
///
/// Example:
/// `models/meta.json` → `models/meta.json.tmp`
pub(crate) fn staging_path<P: AsRef<Path>>(target: P) -> io::Result<PathBuf> {
	let target = target.as_ref();
	let file_name = target
		.file_name()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Target path has no filename"))?;

	let mut staged = OsString::from(file_name);
	staged.push(".tmp");
	Ok(target.with_file_name(staged))
}

/// Writes a set of files so that they land together.
///
/// Every payload is first written to its staging path. If any of those
/// writes fails, the files staged so far are removed and the error is
/// returned, leaving the previous targets untouched. Once all payloads are
/// staged they are renamed over their targets.
///
/// A failure during the rename phase is still reported, but targets renamed
/// before it keep their new content.
pub(crate) fn write_all_staged(files: &[(PathBuf, Vec<u8>)]) -> io::Result<()> {
	let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

	for (target, bytes) in files {
		let result = staging_path(target).and_then(|tmp| fs::write(&tmp, bytes).map(|_| tmp));
		match result {
			Ok(tmp) => staged.push((tmp, target.as_path())),
			Err(e) => {
				for (tmp, _) in &staged {
					let _ = fs::remove_file(tmp);
				}
				if let Ok(tmp) = staging_path(target) {
					let _ = fs::remove_file(tmp);
				}
				return Err(e);
			}
		}
	}

	for (tmp, target) in staged {
		fs::rename(&tmp, target)?;
	}
	Ok(())
}
