//! Errors raised while reading samples and comparing them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or diffing snapshot samples.
///
/// Every variant is fatal for the current run.
#[derive(Debug, Error)]
pub enum SnapshotError {
	#[error("folder {} does not exist", path.display())]
	FolderNotFound { path: PathBuf },

	#[error("sample '{sample}' of snapshot '{snapshot}' not found at {}", path.display())]
	SampleNotFound {
		snapshot: String,
		sample: String,
		path: PathBuf,
	},

	#[error("reading {}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("walking {}", path.display())]
	Walk {
		path: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("decoding {kind} document {}", path.display())]
	Decode {
		kind: String,
		path: PathBuf,
		#[source]
		source: serde_yaml_with_quirks::Error,
	},

	#[error("owner {kind} {namespace}/{name} not found at {}", path.display())]
	OwnerNotFound {
		kind: String,
		namespace: String,
		name: String,
		path: PathBuf,
	},

	#[error(
		"no document in {owner_kind} {owner_namespace}/{owner_name} matches {kind} {namespace}/{name} (group '{group}')"
	)]
	FragmentNotFound {
		owner_kind: String,
		owner_namespace: String,
		owner_name: String,
		group: String,
		kind: String,
		namespace: String,
		name: String,
	},

	#[error("rendering diff for {what}")]
	Render {
		what: String,
		#[source]
		source: snapdiff_text::TextDiffError,
	},

	#[error("writing report")]
	Output(#[source] std::io::Error),
}
