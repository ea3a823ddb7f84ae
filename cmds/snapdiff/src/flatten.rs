//! Flattening a ClusterConfiguration into plain chart and resource lists.

use crate::model::{
	ChartRecord, ClusterConfiguration, Feature, ProfileKind, ProfileRef, ResourceRecord, Sourced,
};

/// Everything a ClusterConfiguration says is deployed to its cluster.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flattened {
	pub charts: Vec<Sourced<ChartRecord>>,
	pub resources: Vec<Sourced<ResourceRecord>>,
}

impl Flattened {
	fn extend(&mut self, source: &ProfileRef, features: &[Feature]) {
		for feature in features {
			self.charts.extend(feature.charts.iter().map(|chart| Sourced {
				record: ChartRecord {
					last_applied_time: None,
					..chart.clone()
				},
				source: source.clone(),
			}));
			self.resources
				.extend(feature.resources.iter().map(|resource| Sourced {
					record: ResourceRecord {
						last_applied_time: None,
						..resource.clone()
					},
					source: source.clone(),
				}));
		}
	}
}

/// Collect charts and resources from every ClusterProfile entry, then every
/// Profile entry, in document order.
///
/// Apply timestamps are cleared, so a reapply alone never looks like a change.
pub fn flatten(configuration: &ClusterConfiguration) -> Flattened {
	let mut flattened = Flattened::default();
	let status = &configuration.status;

	for entry in &status.cluster_profile_resources {
		let source = ProfileRef {
			kind: ProfileKind::ClusterProfile,
			name: entry.cluster_profile_name.clone(),
		};
		flattened.extend(&source, &entry.features);
	}
	for entry in &status.profile_resources {
		let source = ProfileRef {
			kind: ProfileKind::Profile,
			name: entry.profile_name.clone(),
		};
		flattened.extend(&source, &entry.features);
	}

	flattened
}
