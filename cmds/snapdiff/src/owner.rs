//! Locating a resource's manifest inside the ConfigMap or Secret that owns it.
//!
//! Owners hold arbitrary manifests as `---`-joined text in their data
//! values, so the differ cannot decode them. Instead the first document
//! mentioning the resource's group, kind, namespace and name is taken as
//! the resource's content.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
	error::SnapshotError,
	model::{OwnerReference, ResourceKey},
	store::Document,
};

const DOCUMENT_SEPARATOR: &str = "---";

/// The parts of a ConfigMap or Secret holding manifest text.
///
/// Secret values were decoded when the sample was collected, so both kinds
/// carry plain strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerBundle {
	#[serde(default)]
	data: BTreeMap<String, String>,
	#[serde(default)]
	string_data: BTreeMap<String, String>,
}

impl OwnerBundle {
	/// Every manifest fragment, in key order, `data` before `stringData`.
	fn fragments(&self) -> impl Iterator<Item = &str> {
		self.data
			.values()
			.chain(self.string_data.values())
			.flat_map(|value| value.split(DOCUMENT_SEPARATOR))
	}
}

fn matches(fragment: &str, key: &ResourceKey) -> bool {
	fragment.contains(&key.group)
		&& fragment.contains(&key.kind)
		&& fragment.contains(&key.namespace)
		&& fragment.contains(&key.name)
}

/// Path of the owner's capture inside a sample folder.
pub fn owner_path(folder: &Path, owner: &OwnerReference) -> std::path::PathBuf {
	folder
		.join(&owner.namespace)
		.join(&owner.kind)
		.join(format!("{}.yaml", owner.name))
}

/// Return the manifest text of `key` as stored by `owner` in `folder`.
///
/// The returned text has surrounding whitespace removed and ends with a
/// single newline, so a fragment's position in its bundle does not affect
/// comparisons.
#[instrument(skip_all, fields(owner = %format!("{}/{}/{}", owner.kind, owner.namespace, owner.name), resource = %key.display_name()))]
pub fn resolve_text(
	folder: &Path,
	owner: &OwnerReference,
	key: &ResourceKey,
) -> Result<String, SnapshotError> {
	let path = owner_path(folder, owner);
	if !path.is_file() {
		return Err(SnapshotError::OwnerNotFound {
			kind: owner.kind.clone(),
			namespace: owner.namespace.clone(),
			name: owner.name.clone(),
			path,
		});
	}

	let bundle: OwnerBundle = Document::read(&owner.kind, &path)?.decode()?;
	let fragment = bundle
		.fragments()
		.find(|fragment| matches(fragment, key))
		.ok_or_else(|| SnapshotError::FragmentNotFound {
			owner_kind: owner.kind.clone(),
			owner_namespace: owner.namespace.clone(),
			owner_name: owner.name.clone(),
			group: key.group.clone(),
			kind: key.kind.clone(),
			namespace: key.namespace.clone(),
			name: key.name.clone(),
		})?;

	debug!(bytes = fragment.len(), "resolved fragment");
	let mut text = fragment.trim().to_string();
	text.push('\n');
	Ok(text)
}
