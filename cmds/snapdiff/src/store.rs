//! Reading captured documents out of a sample folder.
//!
//! A sample folder holds one YAML file per captured object:
//! - `<kind>/<name>.yaml` for cluster-wide kinds
//! - `<namespace>/<kind>/<name>.yaml` for namespaced kinds

use std::{
	ffi::OsStr,
	path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::{
	error::SnapshotError,
	model::{ClusterConfiguration, FlatRecord},
};

pub const CLUSTER_CONFIGURATION_KIND: &str = "ClusterConfiguration";

/// Kinds captured per namespace. Anything else is captured flat.
const NAMESPACED_KINDS: &[&str] = &[CLUSTER_CONFIGURATION_KIND, "ConfigMap", "Secret"];

/// How a kind is laid out inside a sample folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
	/// `<namespace>/<kind>/<name>.yaml`
	Namespaced,

	/// `<kind>/<name>.yaml`
	ClusterWide,
}

impl ResourceScope {
	pub fn of(kind: &str) -> Self {
		if NAMESPACED_KINDS.contains(&kind) {
			ResourceScope::Namespaced
		} else {
			ResourceScope::ClusterWide
		}
	}
}

/// Raw text of one captured object.
#[derive(Debug, Clone)]
pub struct Document {
	pub kind: String,
	pub path: PathBuf,
	pub text: String,
}

impl Document {
	pub fn read(kind: &str, path: &Path) -> Result<Self, SnapshotError> {
		let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(Self {
			kind: kind.to_string(),
			path: path.to_path_buf(),
			text,
		})
	}

	/// Decode the document into its expected shape.
	pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SnapshotError> {
		serde_yaml_with_quirks::from_str(&self.text).map_err(|source| SnapshotError::Decode {
			kind: self.kind.clone(),
			path: self.path.clone(),
			source,
		})
	}

	/// Decode the document as an unstructured tree.
	pub fn value(&self) -> Result<Value, SnapshotError> {
		self.decode()
	}

	/// Name of the namespace directory a namespaced document was captured in.
	pub fn namespace_dir(&self) -> Option<&str> {
		self.path.parent()?.parent()?.file_name()?.to_str()
	}
}

fn is_yaml(path: &Path) -> bool {
	path.extension()
		.map(|ext| ext == "yaml" || ext == "yml")
		.unwrap_or(false)
}

/// Load every instance of `kind` captured in `folder`, in path order.
///
/// A kind that was never captured yields an empty list; a missing folder is
/// an error.
#[instrument(skip_all, fields(folder = %folder.display(), kind = %kind))]
pub fn load_all(folder: &Path, kind: &str) -> Result<Vec<Document>, SnapshotError> {
	if !folder.is_dir() {
		return Err(SnapshotError::FolderNotFound {
			path: folder.to_path_buf(),
		});
	}

	let scope = ResourceScope::of(kind);
	let (root, depth) = match scope {
		ResourceScope::Namespaced => (folder.to_path_buf(), 3),
		ResourceScope::ClusterWide => (folder.join(kind), 1),
	};
	if !root.is_dir() {
		debug!("kind not captured in sample");
		return Ok(Vec::new());
	}

	let mut documents = Vec::new();
	let walker = WalkDir::new(&root)
		.min_depth(depth)
		.max_depth(depth)
		.sort_by_file_name();

	for entry in walker {
		let entry = entry.map_err(|source| SnapshotError::Walk {
			path: root.clone(),
			source,
		})?;
		let path = entry.path();

		if !entry.file_type().is_file() || !is_yaml(path) {
			continue;
		}
		if scope == ResourceScope::Namespaced
			&& path.parent().and_then(Path::file_name) != Some(OsStr::new(kind))
		{
			continue;
		}

		debug!(path = %path.display(), "loading document");
		documents.push(Document::read(kind, path)?);
	}

	debug!(count = documents.len(), "loaded documents");
	Ok(documents)
}

/// Load every flatly-stored object of `kind`.
pub fn load_flat(folder: &Path, kind: &str) -> Result<Vec<FlatRecord>, SnapshotError> {
	load_all(folder, kind)?
		.iter()
		.map(|document| document.value().map(|value| FlatRecord::new(kind, value)))
		.collect()
}

/// Load every ClusterConfiguration, paired with the namespace it lives in.
///
/// The namespace comes from the object metadata, or from the directory it
/// was captured under when the metadata has none.
pub fn load_configurations(
	folder: &Path,
) -> Result<Vec<(String, ClusterConfiguration)>, SnapshotError> {
	load_all(folder, CLUSTER_CONFIGURATION_KIND)?
		.iter()
		.map(|document| -> Result<_, SnapshotError> {
			let configuration: ClusterConfiguration = document.decode()?;
			let namespace = if configuration.metadata.namespace.is_empty() {
				document.namespace_dir().unwrap_or_default().to_string()
			} else {
				configuration.metadata.namespace.clone()
			};
			Ok((namespace, configuration))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::test_utils::SampleDir;

	#[test]
	fn test_scope_of_kind() {
		assert_eq!(ResourceScope::of("ClusterConfiguration"), ResourceScope::Namespaced);
		assert_eq!(ResourceScope::of("Secret"), ResourceScope::Namespaced);
		assert_eq!(ResourceScope::of("Classifier"), ResourceScope::ClusterWide);
	}

	#[test]
	fn test_load_cluster_wide_sorted() {
		let sample = SampleDir::new()
			.with_file("Classifier/b.yaml", "metadata:\n  name: b\n")
			.with_file("Classifier/a.yaml", "metadata:\n  name: a\n")
			.with_file("Classifier/notes.txt", "ignored")
			.with_file("RoleRequest/r.yaml", "metadata:\n  name: r\n");

		let documents = load_all(sample.path(), "Classifier").unwrap();
		let names: Vec<_> = documents
			.iter()
			.map(|d| d.path.file_name().unwrap().to_str().unwrap())
			.collect();
		assert_eq!(names, vec!["a.yaml", "b.yaml"]);
	}

	#[test]
	fn test_load_namespaced_walks_every_namespace() {
		let sample = SampleDir::new()
			.with_file("ns2/ClusterConfiguration/c2.yaml", "metadata:\n  name: c2\n")
			.with_file("ns1/ClusterConfiguration/c1.yaml", "metadata:\n  name: c1\n")
			.with_file("ns1/ConfigMap/policies.yaml", "data: {}\n")
			.with_file("ClusterProfile/cp.yaml", "metadata:\n  name: cp\n");

		let documents = load_all(sample.path(), "ClusterConfiguration").unwrap();
		let namespaces: Vec<_> = documents.iter().filter_map(Document::namespace_dir).collect();
		assert_eq!(namespaces, vec!["ns1", "ns2"]);
	}

	#[test]
	fn test_missing_kind_is_empty() {
		let sample = SampleDir::new().with_file("Classifier/a.yaml", "metadata: {}\n");
		assert!(load_all(sample.path(), "RoleRequest").unwrap().is_empty());
		assert!(load_all(sample.path(), "ClusterConfiguration")
			.unwrap()
			.is_empty());
	}

	#[test]
	fn test_missing_folder() {
		let sample = SampleDir::new();
		let missing = sample.path().join("nope");
		assert_matches!(
			load_all(&missing, "Classifier"),
			Err(SnapshotError::FolderNotFound { path }) if path == missing
		);
	}

	#[test]
	fn test_undecodable_document() {
		let sample =
			SampleDir::new().with_file("ns1/ClusterConfiguration/bad.yaml", "status: [unclosed\n");
		assert_matches!(
			load_configurations(sample.path()),
			Err(SnapshotError::Decode { kind, .. }) if kind == "ClusterConfiguration"
		);
	}

	#[test]
	fn test_configuration_namespace_falls_back_to_directory() {
		let sample = SampleDir::new()
			.with_file("ns1/ClusterConfiguration/c1.yaml", "metadata:\n  name: c1\n")
			.with_file(
				"ns2/ClusterConfiguration/c2.yaml",
				"metadata:\n  name: c2\n  namespace: prod\n",
			);

		let configurations = load_configurations(sample.path()).unwrap();
		let namespaces: Vec<_> = configurations.iter().map(|(ns, _)| ns.as_str()).collect();
		assert_eq!(namespaces, vec!["ns1", "prod"]);
	}

	#[test]
	fn test_load_flat_records() {
		let sample = SampleDir::new().with_file(
			"RoleRequest/admin.yaml",
			"metadata:\n  name: admin\nspec:\n  serviceAccountName: sa\n",
		);

		let records = load_flat(sample.path(), "RoleRequest").unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].kind, "RoleRequest");
		assert_eq!(records[0].name, "admin");
		assert_eq!(records[0].spec()["serviceAccountName"], "sa");
	}
}
