//! Configuration file support for snapdiff
//!
//! Supports `.snapdiff.yaml` files that can be placed anywhere in the directory
//! hierarchy. snapdiff searches from the working directory upward to the
//! filesystem root.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{report::ColorMode, snapshot::DEFAULT_STORAGE};

/// The name of the config file snapdiff looks for
pub const CONFIG_FILE_NAME: &str = ".snapdiff.yaml";

/// Environment variable overriding the storage root
pub const STORAGE_ENV: &str = "SNAPDIFF_STORAGE";

/// Root configuration structure for .snapdiff.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapdiffConfig {
	/// Directory holding one folder per snapshot
	#[serde(default)]
	pub storage: Option<PathBuf>,

	/// Color mode used when `--color` is not given
	#[serde(default)]
	pub color: Option<ColorMode>,
}

impl SnapdiffConfig {
	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		if let Some(config_path) = find_config_file(start_dir) {
			let config = Self::load_from_file(&config_path)?;
			Ok(Some(config))
		} else {
			Ok(None)
		}
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		// An empty file is a valid, empty config.
		if content.trim().is_empty() {
			return Ok(Self::default());
		}
		let config: SnapdiffConfig = serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))?;
		Ok(config)
	}

	/// Pick the storage root: flag, then environment, then file, then default.
	pub fn storage(&self, flag: Option<&Path>, env: Option<&str>) -> PathBuf {
		if let Some(flag) = flag {
			return flag.to_path_buf();
		}
		if let Some(env) = env.filter(|env| !env.is_empty()) {
			return PathBuf::from(env);
		}
		self.storage
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE))
	}

	/// Pick the color mode: flag, then file, then auto.
	pub fn color(&self, flag: Option<ColorMode>) -> ColorMode {
		flag.or(self.color).unwrap_or_default()
	}
}

/// Load the config found from the working directory, or the default one.
pub fn load() -> Result<SnapdiffConfig> {
	let cwd = std::env::current_dir().context("getting current directory")?;
	Ok(SnapdiffConfig::load_from_directory(&cwd)?.unwrap_or_default())
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let mut current = start_dir.to_path_buf();

	// Canonicalize if possible to handle relative paths
	if let Ok(canonical) = current.canonicalize() {
		current = canonical;
	}

	loop {
		let config_path = current.join(CONFIG_FILE_NAME);
		if config_path.is_file() {
			return Some(config_path);
		}

		match current.parent() {
			Some(parent) if parent != current => current = parent.to_path_buf(),
			_ => return None,
		}
	}
}
