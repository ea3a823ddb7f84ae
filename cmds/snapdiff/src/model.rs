//! Records reconstructed from sample files.
//!
//! Only the fields the differ looks at are modeled; everything else in a
//! captured document is ignored on decode.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label carrying the managed cluster's name on a ClusterConfiguration.
pub const CLUSTER_NAME_LABEL: &str = "projectsveltos.io/cluster-name";

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectMeta {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub namespace: String,
	#[serde(default)]
	pub labels: BTreeMap<String, String>,
}

/// Per-cluster record of everything deployed by ClusterProfiles and Profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClusterConfiguration {
	#[serde(default)]
	pub metadata: ObjectMeta,
	#[serde(default)]
	pub status: ClusterConfigurationStatus,
}

impl ClusterConfiguration {
	/// Cluster name from the cluster-name label, falling back to the object name.
	pub fn cluster_name(&self) -> &str {
		self.metadata
			.labels
			.get(CLUSTER_NAME_LABEL)
			.map(String::as_str)
			.filter(|name| !name.is_empty())
			.unwrap_or(self.metadata.name.as_str())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigurationStatus {
	#[serde(default)]
	pub cluster_profile_resources: Vec<ClusterProfileResource>,
	#[serde(default)]
	pub profile_resources: Vec<ProfileResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfileResource {
	#[serde(default)]
	pub cluster_profile_name: String,
	#[serde(default, rename = "Features")]
	pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResource {
	#[serde(default)]
	pub profile_name: String,
	#[serde(default, rename = "Features")]
	pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Feature {
	#[serde(default, rename = "featureID")]
	pub feature_id: String,
	#[serde(default)]
	pub charts: Vec<ChartRecord>,
	#[serde(default)]
	pub resources: Vec<ResourceRecord>,
}

/// A Helm release deployed to a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
	#[serde(default, rename = "repoURL")]
	pub repo_url: String,
	#[serde(default)]
	pub release_name: String,
	#[serde(default)]
	pub namespace: String,
	#[serde(default)]
	pub chart_version: String,
	#[serde(default)]
	pub app_version: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_applied_time: Option<String>,
}

impl ChartRecord {
	pub fn key(&self) -> ChartKey {
		ChartKey {
			namespace: self.namespace.clone(),
			release_name: self.release_name.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartKey {
	pub namespace: String,
	pub release_name: String,
}

/// A Kubernetes resource deployed to a cluster, whose manifest text is kept
/// in an owner ConfigMap or Secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
	#[serde(default)]
	pub group: String,
	#[serde(default)]
	pub kind: String,
	#[serde(default)]
	pub version: String,
	#[serde(default)]
	pub namespace: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub owner: OwnerReference,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_applied_time: Option<String>,
}

impl ResourceRecord {
	pub fn key(&self) -> ResourceKey {
		ResourceKey {
			group: self.group.clone(),
			kind: self.kind.clone(),
			namespace: self.namespace.clone(),
			name: self.name.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
	pub group: String,
	pub kind: String,
	pub namespace: String,
	pub name: String,
}

impl ResourceKey {
	/// `group.kind.namespace.name`, group omitted when empty. The namespace
	/// is always present (empty for cluster-scoped resources).
	pub fn display_name(&self) -> String {
		let group_prefix = if self.group.is_empty() {
			String::new()
		} else {
			format!("{}.", self.group)
		};
		format!(
			"{}{}.{}.{}",
			group_prefix, self.kind, self.namespace, self.name
		)
	}

	/// Value of the RESOURCE TYPE report column.
	pub fn resource_type(&self) -> String {
		if self.group.is_empty() {
			self.kind.clone()
		} else {
			format!("{}:{}", self.group, self.kind)
		}
	}
}

/// Where a resource's manifest text is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
	#[serde(default)]
	pub kind: String,
	#[serde(default)]
	pub namespace: String,
	#[serde(default)]
	pub name: String,
}

/// Which kind of profile contributed a chart or resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileKind {
	ClusterProfile,
	Profile,
}

impl fmt::Display for ProfileKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProfileKind::ClusterProfile => write!(f, "ClusterProfile"),
			ProfileKind::Profile => write!(f, "Profile"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileRef {
	pub kind: ProfileKind,
	pub name: String,
}

impl fmt::Display for ProfileRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.kind, self.name)
	}
}

/// A flattened record together with the profile that deployed it.
///
/// The source is informational: two records are compared on `record` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
	pub record: T,
	pub source: ProfileRef,
}

/// A document of a kind that is stored flat, one file per object.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
	pub kind: String,
	pub name: String,
	pub document: Value,
}

impl FlatRecord {
	pub fn new(kind: impl Into<String>, document: Value) -> Self {
		let name = document
			.pointer("/metadata/name")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string();
		Self {
			kind: kind.into(),
			name,
			document,
		}
	}

	/// The `spec` sub-tree, or null when the document has none.
	pub fn spec(&self) -> &Value {
		self.document.get("spec").unwrap_or(&NULL)
	}
}
