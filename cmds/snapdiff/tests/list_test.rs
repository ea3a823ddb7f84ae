//! Integration tests for the list command.

use std::fs;

use snapdiff::{
	commands::list::{run_with_config, ListArgs},
	config::{SnapdiffConfig, STORAGE_ENV},
};
use tempfile::TempDir;

#[test]
fn test_list_uses_storage_from_config() {
	// The environment outranks the config file.
	std::env::remove_var(STORAGE_ENV);

	let dir = TempDir::new().unwrap();
	fs::create_dir_all(dir.path().join("weekly/2024-01-07:00:00:00")).unwrap();
	fs::create_dir_all(dir.path().join("weekly/2024-01-14:00:00:00")).unwrap();
	fs::write(dir.path().join("weekly/notes.txt"), "not a sample").unwrap();

	let config = SnapdiffConfig {
		storage: Some(dir.path().to_path_buf()),
		color: None,
	};
	let args = ListArgs {
		snapshot: None,
		storage: None,
		log_level: None,
	};

	let mut output = Vec::new();
	run_with_config(args, &config, &mut output).unwrap();

	let rows: Vec<Vec<String>> = String::from_utf8(output)
		.unwrap()
		.lines()
		.map(|l| l.split_whitespace().map(str::to_string).collect())
		.collect();
	assert_eq!(
		rows,
		vec![
			vec!["SNAPSHOT", "SAMPLE"],
			vec!["weekly", "2024-01-07:00:00:00"],
			vec!["weekly", "2024-01-14:00:00:00"],
		]
	);
}

#[test]
fn test_list_missing_storage() {
	let dir = TempDir::new().unwrap();
	let args = ListArgs {
		snapshot: None,
		storage: Some(dir.path().join("missing")),
		log_level: None,
	};

	let mut output = Vec::new();
	let err = run_with_config(args, &SnapdiffConfig::default(), &mut output).unwrap_err();
	assert!(format!("{err:#}").contains("does not exist"));
}
