//! Added/modified/deleted classification of keyed records.
//!
//! [`diff`] is the generic core; the `diff_*` functions plug in the identity
//! key and change detection for each record type.

use std::{collections::BTreeMap, convert::Infallible, path::Path};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
	error::SnapshotError,
	model::{ChartRecord, FlatRecord, ResourceRecord, Sourced},
	owner,
};

/// How a record changed between two samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	/// Short human readable description for the report.
	pub message: String,
	/// Unified diff of the content, when the record has textual content.
	pub diff: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modified<R> {
	pub from: R,
	pub to: R,
	pub change: Change,
}

/// Result of comparing two collections. Every list is sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct SetDiff<R> {
	pub added: Vec<R>,
	pub modified: Vec<Modified<R>>,
	pub deleted: Vec<R>,
}

impl<R> SetDiff<R> {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
	}
}

/// Classify the records of `from` and `to` by identity key.
///
/// Records sharing a key within one side overwrite each other, the last one
/// winning. `changed` is only consulted for keys present on both sides.
pub fn diff<R, K, E>(
	from: impl IntoIterator<Item = R>,
	to: impl IntoIterator<Item = R>,
	key: impl Fn(&R) -> K,
	mut changed: impl FnMut(&R, &R) -> Result<Option<Change>, E>,
) -> Result<SetDiff<R>, E>
where
	K: Ord,
{
	let mut from: BTreeMap<K, R> = from.into_iter().map(|r| (key(&r), r)).collect();
	let to: BTreeMap<K, R> = to.into_iter().map(|r| (key(&r), r)).collect();

	let mut result = SetDiff {
		added: Vec::new(),
		modified: Vec::new(),
		deleted: Vec::new(),
	};

	for (k, to_record) in to {
		match from.remove(&k) {
			None => result.added.push(to_record),
			Some(from_record) => {
				if let Some(change) = changed(&from_record, &to_record)? {
					result.modified.push(Modified {
						from: from_record,
						to: to_record,
						change,
					});
				}
			}
		}
	}
	result.deleted.extend(from.into_values());

	Ok(result)
}

/// One side of a comparison: the sample's name, used in diff headers, and
/// its folder, used to resolve owners.
#[derive(Debug, Clone, Copy)]
pub struct SampleRef<'a> {
	pub name: &'a str,
	pub folder: &'a Path,
}

impl SampleRef<'_> {
	fn label(&self, what: &str) -> String {
		format!("{}/{}", self.name, what)
	}
}

fn chart_change(from: &ChartRecord, to: &ChartRecord) -> Option<Change> {
	let strip = |chart: &ChartRecord| ChartRecord {
		last_applied_time: None,
		..chart.clone()
	};
	if strip(from) == strip(to) {
		return None;
	}

	let message = if from.chart_version != to.chart_version {
		format!(
			"chart version {} -> {}",
			from.chart_version, to.chart_version
		)
	} else {
		"chart settings changed".to_string()
	};
	Some(Change {
		message,
		diff: None,
	})
}

/// Compare Helm releases by (namespace, release name).
pub fn diff_charts(
	from: Vec<Sourced<ChartRecord>>,
	to: Vec<Sourced<ChartRecord>>,
) -> SetDiff<Sourced<ChartRecord>> {
	let result = diff(
		from,
		to,
		|chart| chart.record.key(),
		|a, b| Ok::<_, Infallible>(chart_change(&a.record, &b.record)),
	);
	match result {
		Ok(result) => result,
		Err(never) => match never {},
	}
}

/// Compare resources by (group, kind, namespace, name).
///
/// A resource present on both sides is modified when the manifest text its
/// owner holds differs; changes to the record alone are not reported.
#[instrument(skip_all, fields(from = from.name, to = to.name))]
pub fn diff_resources(
	from: SampleRef<'_>,
	from_records: Vec<Sourced<ResourceRecord>>,
	to: SampleRef<'_>,
	to_records: Vec<Sourced<ResourceRecord>>,
) -> Result<SetDiff<Sourced<ResourceRecord>>, SnapshotError> {
	diff(
		from_records,
		to_records,
		|resource| resource.record.key(),
		|a, b| {
			let key = a.record.key();
			let old = owner::resolve_text(from.folder, &a.record.owner, &key)?;
			let new = owner::resolve_text(to.folder, &b.record.owner, &key)?;
			if old == new {
				return Ok(None);
			}

			let name = key.display_name();
			debug!(resource = %name, "content changed");
			Ok(Some(Change {
				message: "use --raw-diff option to see diff".to_string(),
				diff: Some(snapdiff_text::diff_text(
					&from.label(&name),
					&old,
					&to.label(&name),
					&new,
				)),
			}))
		},
	)
}

/// Compare flatly stored documents of one kind by name, looking at `spec`
/// only.
#[instrument(skip_all, fields(from = from.name, to = to.name))]
pub fn diff_flat(
	from: SampleRef<'_>,
	from_records: Vec<FlatRecord>,
	to: SampleRef<'_>,
	to_records: Vec<FlatRecord>,
) -> Result<SetDiff<FlatRecord>, SnapshotError> {
	diff(
		from_records,
		to_records,
		|record| record.name.clone(),
		|a, b| {
			if a.spec() == b.spec() {
				return Ok(None);
			}

			let name = format!("{}/{}", a.kind, a.name);
			let diff = render_spec_diff(&from.label(&name), a.spec(), &to.label(&name), b.spec())
				.map_err(|source| SnapshotError::Render { what: name, source })?;
			Ok(Some(Change {
				message: "spec changed".to_string(),
				diff: Some(diff),
			}))
		},
	)
}

fn render_spec_diff(
	label_a: &str,
	a: &Value,
	label_b: &str,
	b: &Value,
) -> Result<String, snapdiff_text::TextDiffError> {
	snapdiff_text::diff_json(label_a, a, label_b, b)
}
