//! Locating snapshots and their samples on disk.
//!
//! Storage is laid out as `<root>/<snapshot>/<sample>`, where sample names
//! are collection timestamps.

use std::path::{Path, PathBuf};

use tracing::instrument;
use walkdir::WalkDir;

use crate::error::SnapshotError;

/// Default storage root used by the collector.
pub const DEFAULT_STORAGE: &str = "/collection/snapshots";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
	root: PathBuf,
}

impl SnapshotStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Folder of one sample, which must exist.
	pub fn sample_folder(&self, snapshot: &str, sample: &str) -> Result<PathBuf, SnapshotError> {
		let path = self.root.join(snapshot).join(sample);
		if !path.is_dir() {
			return Err(SnapshotError::SampleNotFound {
				snapshot: snapshot.to_string(),
				sample: sample.to_string(),
				path,
			});
		}
		Ok(path)
	}

	/// Names of all snapshots, sorted.
	#[instrument(skip_all, fields(root = %self.root.display()))]
	pub fn list_snapshots(&self) -> Result<Vec<String>, SnapshotError> {
		list_dirs(&self.root)
	}

	/// Names of all samples of `snapshot`, oldest first.
	#[instrument(skip(self))]
	pub fn list_samples(&self, snapshot: &str) -> Result<Vec<String>, SnapshotError> {
		list_dirs(&self.root.join(snapshot))
	}
}

fn list_dirs(path: &Path) -> Result<Vec<String>, SnapshotError> {
	if !path.is_dir() {
		return Err(SnapshotError::FolderNotFound {
			path: path.to_path_buf(),
		});
	}

	let mut names = Vec::new();
	for entry in WalkDir::new(path)
		.min_depth(1)
		.max_depth(1)
		.sort_by_file_name()
	{
		let entry = entry.map_err(|source| SnapshotError::Walk {
			path: path.to_path_buf(),
			source,
		})?;
		if entry.file_type().is_dir() {
			names.push(entry.file_name().to_string_lossy().into_owned());
		}
	}
	Ok(names)
}
