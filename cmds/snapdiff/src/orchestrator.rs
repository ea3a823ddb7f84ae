//! Comparing two samples of a snapshot end to end.

use std::{
	collections::{BTreeMap, BTreeSet},
	io::Write,
	path::Path,
};

use tracing::{debug, info, instrument};

use crate::{
	differ::{self, SampleRef, SetDiff},
	error::SnapshotError,
	flatten::{flatten, Flattened},
	model::{ClusterConfiguration, ResourceRecord, Sourced},
	report::{Action, ConfigurationRow, FlatRow, Report, ReportWriter},
	snapshot::SnapshotStore,
	store,
};

/// Kinds stored one file per object and compared on their spec.
pub const FLAT_KINDS: &[&str] = &["ClusterProfile", "Classifier", "RoleRequest"];

/// Value of the RESOURCE TYPE column for Helm releases.
pub const HELM_RELEASE_TYPE: &str = "helm release";

/// Which samples to compare and how to report them.
#[derive(Debug, Clone, Default)]
pub struct DiffRequest {
	pub snapshot: String,
	pub from_sample: String,
	pub to_sample: String,
	/// Only compare this namespace. `None` or empty compares all.
	pub namespace: Option<String>,
	/// Only compare this cluster. `None` or empty compares all.
	pub cluster: Option<String>,
	/// Print content diffs instead of "modified" rows.
	pub raw_diff: bool,
}

fn selected(filter: Option<&str>, value: &str) -> bool {
	match filter {
		None | Some("") => true,
		Some(filter) => filter == value,
	}
}

/// ClusterConfigurations of one sample by namespace, then cluster name.
type Configurations = BTreeMap<String, BTreeMap<String, ClusterConfiguration>>;

fn load_configurations(folder: &Path) -> Result<Configurations, SnapshotError> {
	let mut by_namespace = Configurations::new();
	for (namespace, configuration) in store::load_configurations(folder)? {
		let cluster = configuration.cluster_name().to_string();
		by_namespace
			.entry(namespace)
			.or_default()
			.insert(cluster, configuration);
	}
	Ok(by_namespace)
}

struct Run<'a, W: Write> {
	request: &'a DiffRequest,
	from: SampleRef<'a>,
	to: SampleRef<'a>,
	out: &'a mut ReportWriter<W>,
	report: Report,
}

impl<W: Write> Run<'_, W> {
	/// Print a content diff in raw mode. Returns false when the change
	/// should be reported as a row instead.
	fn stream(&mut self, diff: Option<&str>) -> Result<bool, SnapshotError> {
		match diff {
			Some(diff) if self.request.raw_diff => {
				self.out.write_diff(diff)?;
				self.report.streamed_diffs += 1;
				Ok(true)
			}
			_ => Ok(false),
		}
	}

	fn flat_kinds(&mut self) -> Result<(), SnapshotError> {
		for kind in FLAT_KINDS {
			let from = store::load_flat(self.from.folder, kind)?;
			let to = store::load_flat(self.to.folder, kind)?;
			let diff = differ::diff_flat(self.from, from, self.to, to)?;

			for record in diff.added {
				self.report.flat.push(FlatRow {
					kind: record.kind,
					name: record.name,
					action: Action::Added,
				});
			}
			for modified in diff.modified {
				if self.stream(modified.change.diff.as_deref())? {
					continue;
				}
				self.report.flat.push(FlatRow {
					kind: modified.to.kind,
					name: modified.to.name,
					action: Action::Modified,
				});
			}
			for record in diff.deleted {
				self.report.flat.push(FlatRow {
					kind: record.kind,
					name: record.name,
					action: Action::Deleted,
				});
			}
		}
		Ok(())
	}

	#[instrument(skip_all, fields(cluster = %cluster))]
	fn cluster(
		&mut self,
		cluster: &str,
		from: Option<&ClusterConfiguration>,
		to: Option<&ClusterConfiguration>,
	) -> Result<(), SnapshotError> {
		let from = from.map(flatten).unwrap_or_default();
		let to = to.map(flatten).unwrap_or_default();
		let Flattened {
			charts: from_charts,
			resources: from_resources,
		} = from;
		let Flattened {
			charts: to_charts,
			resources: to_resources,
		} = to;

		let charts = differ::diff_charts(from_charts, to_charts);
		for chart in charts.added {
			self.report.configuration.push(ConfigurationRow {
				cluster: cluster.to_string(),
				resource_type: HELM_RELEASE_TYPE.to_string(),
				namespace: chart.record.namespace,
				name: chart.record.release_name,
				action: Action::Added,
				message: chart.source.to_string(),
			});
		}
		for modified in charts.modified {
			self.report.configuration.push(ConfigurationRow {
				cluster: cluster.to_string(),
				resource_type: HELM_RELEASE_TYPE.to_string(),
				namespace: modified.to.record.namespace,
				name: modified.to.record.release_name,
				action: Action::Modified,
				message: modified.change.message,
			});
		}
		for chart in charts.deleted {
			self.report.configuration.push(ConfigurationRow {
				cluster: cluster.to_string(),
				resource_type: HELM_RELEASE_TYPE.to_string(),
				namespace: chart.record.namespace,
				name: chart.record.release_name,
				action: Action::Deleted,
				message: chart.source.to_string(),
			});
		}

		let resources = differ::diff_resources(self.from, from_resources, self.to, to_resources)?;
		self.resource_rows(cluster, resources)
	}

	fn resource_rows(
		&mut self,
		cluster: &str,
		resources: SetDiff<Sourced<ResourceRecord>>,
	) -> Result<(), SnapshotError> {
		let row = |resource: &ResourceRecord, action, message| ConfigurationRow {
			cluster: cluster.to_string(),
			resource_type: resource.key().resource_type(),
			namespace: resource.namespace.clone(),
			name: resource.name.clone(),
			action,
			message,
		};

		for resource in resources.added {
			let message = resource.source.to_string();
			self.report
				.configuration
				.push(row(&resource.record, Action::Added, message));
		}
		for modified in resources.modified {
			if self.stream(modified.change.diff.as_deref())? {
				continue;
			}
			self.report.configuration.push(row(
				&modified.to.record,
				Action::Modified,
				modified.change.message,
			));
		}
		for resource in resources.deleted {
			let message = resource.source.to_string();
			self.report
				.configuration
				.push(row(&resource.record, Action::Deleted, message));
		}
		Ok(())
	}

	fn configurations(&mut self) -> Result<(), SnapshotError> {
		let mut from = load_configurations(self.from.folder)?;
		let mut to = load_configurations(self.to.folder)?;

		let namespaces: BTreeSet<String> = from.keys().chain(to.keys()).cloned().collect();
		for namespace in namespaces {
			if !selected(self.request.namespace.as_deref(), &namespace) {
				debug!(%namespace, "namespace filtered out");
				continue;
			}

			let from_clusters = from.remove(&namespace).unwrap_or_default();
			let to_clusters = to.remove(&namespace).unwrap_or_default();
			let clusters: BTreeSet<&String> = from_clusters.keys().chain(to_clusters.keys()).collect();

			for cluster in clusters {
				if !selected(self.request.cluster.as_deref(), cluster) {
					continue;
				}
				self.cluster(
					&format!("{namespace}/{cluster}"),
					from_clusters.get(cluster),
					to_clusters.get(cluster),
				)?;
			}
		}
		Ok(())
	}
}

/// Compare the two samples named by `request`.
///
/// In raw mode content diffs are written to `out` as they are found. The
/// tables, or a "no changes detected" notice, follow once everything has
/// been compared.
#[instrument(skip_all, fields(snapshot = %request.snapshot, from = %request.from_sample, to = %request.to_sample))]
pub fn run<W: Write>(
	request: &DiffRequest,
	snapshots: &SnapshotStore,
	out: &mut ReportWriter<W>,
) -> Result<Report, SnapshotError> {
	let from_folder = snapshots.sample_folder(&request.snapshot, &request.from_sample)?;
	let to_folder = snapshots.sample_folder(&request.snapshot, &request.to_sample)?;

	let mut run = Run {
		request,
		from: SampleRef {
			name: &request.from_sample,
			folder: &from_folder,
		},
		to: SampleRef {
			name: &request.to_sample,
			folder: &to_folder,
		},
		out: &mut *out,
		report: Report::default(),
	};
	run.flat_kinds()?;
	run.configurations()?;

	let mut report = run.report;
	report.sort();

	let count = |action: Action| {
		report
			.configuration
			.iter()
			.map(|r| r.action)
			.chain(report.flat.iter().map(|r| r.action))
			.filter(|a| *a == action)
			.count()
	};
	info!(
		added = count(Action::Added),
		modified = count(Action::Modified) + report.streamed_diffs,
		deleted = count(Action::Deleted),
		"comparison finished"
	);

	if report.is_empty() {
		out.write_no_changes()?;
	} else {
		out.write_report(&report)?;
	}
	Ok(report)
}
