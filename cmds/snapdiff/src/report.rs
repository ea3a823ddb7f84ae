//! Rendering a diff as tables or as colored unified diffs.

use std::{
	fmt,
	io::{self, IsTerminal, Write},
};

use nu_ansi_term::{Color, Style};
use serde::Deserialize;
use tabwriter::TabWriter;
use tracing::instrument;

use crate::error::SnapshotError;

pub const NO_CHANGES: &str = "no changes detected";

/// Controls color in raw diff output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
	/// Color when stdout is a terminal
	#[default]
	Auto,
	Always,
	Never,
}

impl ColorMode {
	pub fn should_colorize(self) -> bool {
		match self {
			ColorMode::Auto => io::stdout().is_terminal(),
			ColorMode::Always => true,
			ColorMode::Never => false,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
	Added,
	Modified,
	Deleted,
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Added => write!(f, "added"),
			Action::Modified => write!(f, "modified"),
			Action::Deleted => write!(f, "deleted"),
		}
	}
}

/// A chart or resource change on one cluster.
///
/// Field order is the sort order of the report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConfigurationRow {
	pub cluster: String,
	pub resource_type: String,
	pub namespace: String,
	pub name: String,
	pub action: Action,
	pub message: String,
}

/// A change to a flatly stored object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlatRow {
	pub kind: String,
	pub name: String,
	pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
	pub configuration: Vec<ConfigurationRow>,
	pub flat: Vec<FlatRow>,
	/// Number of content diffs streamed in place of rows.
	pub streamed_diffs: usize,
}

impl Report {
	/// True when nothing changed at all, streamed diffs included.
	pub fn is_empty(&self) -> bool {
		self.configuration.is_empty() && self.flat.is_empty() && self.streamed_diffs == 0
	}

	pub fn sort(&mut self) {
		self.configuration.sort();
		self.flat.sort();
	}
}

/// Writes reports and diffs to an output stream.
pub struct ReportWriter<W: Write> {
	writer: W,
	use_color: bool,
}

impl<W: Write> ReportWriter<W> {
	pub fn new(writer: W, color_mode: ColorMode) -> Self {
		Self {
			writer,
			use_color: color_mode.should_colorize(),
		}
	}

	pub fn into_inner(self) -> W {
		self.writer
	}

	/// Write the flat and configuration tables, skipping empty ones.
	#[instrument(skip_all, fields(configuration = report.configuration.len(), flat = report.flat.len()))]
	pub fn write_report(&mut self, report: &Report) -> Result<(), SnapshotError> {
		self.write_tables(report).map_err(SnapshotError::Output)
	}

	/// Write one unified diff, colored when enabled.
	pub fn write_diff(&mut self, diff: &str) -> Result<(), SnapshotError> {
		self.write_colored_diff(diff).map_err(SnapshotError::Output)
	}

	pub fn write_no_changes(&mut self) -> Result<(), SnapshotError> {
		writeln!(self.writer, "{NO_CHANGES}").map_err(SnapshotError::Output)
	}

	fn write_tables(&mut self, report: &Report) -> io::Result<()> {
		let mut wrote_table = false;

		if !report.flat.is_empty() {
			let mut tw = TabWriter::new(&mut self.writer).padding(3);
			writeln!(tw, "KIND\tACTION")?;
			for row in &report.flat {
				writeln!(tw, "{}/{}\t{}", row.kind, row.name, row.action)?;
			}
			tw.flush()?;
			wrote_table = true;
		}

		if !report.configuration.is_empty() {
			if wrote_table {
				writeln!(self.writer)?;
			}
			let mut tw = TabWriter::new(&mut self.writer).padding(3);
			writeln!(tw, "CLUSTER\tRESOURCE TYPE\tNAMESPACE\tNAME\tACTION\tMESSAGE")?;
			for row in &report.configuration {
				writeln!(
					tw,
					"{}\t{}\t{}\t{}\t{}\t{}",
					row.cluster,
					row.resource_type,
					row.namespace,
					row.name,
					row.action,
					row.message
				)?;
			}
			tw.flush()?;
		}

		Ok(())
	}

	fn write_colored_diff(&mut self, diff: &str) -> io::Result<()> {
		if !self.use_color {
			write!(self.writer, "{diff}")?;
			if !diff.ends_with('\n') {
				writeln!(self.writer)?;
			}
			return Ok(());
		}

		for line in diff.lines() {
			let style = if line.starts_with("+++") || line.starts_with("---") {
				Style::new().bold()
			} else if line.starts_with('+') {
				Style::new().fg(Color::Green)
			} else if line.starts_with('-') {
				Style::new().fg(Color::Red)
			} else if line.starts_with("@@") {
				Style::new().fg(Color::Cyan)
			} else {
				Style::new()
			};
			writeln!(self.writer, "{}", style.paint(line))?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;
	use crate::test_utils::BrokenPipeWriter;

	#[test]
	fn test_color_mode_always() {
		assert!(ColorMode::Always.should_colorize());
	}

	#[test]
	fn test_color_mode_never() {
		assert!(!ColorMode::Never.should_colorize());
	}

	#[test]
	fn test_color_mode_from_config() {
		let mode: ColorMode = serde_yaml_with_quirks::from_str("always").unwrap();
		assert_eq!(mode, ColorMode::Always);
	}

	fn row(cluster: &str, name: &str, action: Action) -> ConfigurationRow {
		ConfigurationRow {
			cluster: cluster.to_string(),
			resource_type: "helm release".to_string(),
			namespace: "kyverno".to_string(),
			name: name.to_string(),
			action,
			message: "ClusterProfile/cp".to_string(),
		}
	}

	#[test]
	fn test_report_sort_order() {
		let mut report = Report {
			configuration: vec![
				row("ns/b", "x", Action::Added),
				row("ns/a", "z", Action::Deleted),
				row("ns/a", "y", Action::Added),
			],
			..Default::default()
		};
		report.sort();

		let keys: Vec<_> = report
			.configuration
			.iter()
			.map(|r| (r.cluster.as_str(), r.name.as_str()))
			.collect();
		assert_eq!(keys, vec![("ns/a", "y"), ("ns/a", "z"), ("ns/b", "x")]);
	}

	#[test]
	fn test_write_tables() {
		let report = Report {
			configuration: vec![row("default/cluster1", "kyverno", Action::Modified)],
			flat: vec![FlatRow {
				kind: "Classifier".to_string(),
				name: "large".to_string(),
				action: Action::Deleted,
			}],
			streamed_diffs: 0,
		};

		let mut output = Vec::new();
		ReportWriter::new(&mut output, ColorMode::Never)
			.write_report(&report)
			.unwrap();
		let output = String::from_utf8(output).unwrap();
		let lines: Vec<_> = output.lines().collect();

		assert!(lines[0].starts_with("KIND"));
		assert!(lines[1].starts_with("Classifier/large"));
		assert!(lines[1].ends_with("deleted"));
		assert_eq!(lines[2], "");
		assert!(lines[3].starts_with("CLUSTER"));
		assert!(lines[3].contains("RESOURCE TYPE"));
		let cells: Vec<_> = lines[4].split_whitespace().collect();
		assert_eq!(
			cells,
			vec!["default/cluster1", "helm", "release", "kyverno", "kyverno", "modified", "ClusterProfile/cp"]
		);
	}

	#[test]
	fn test_columns_are_aligned() {
		let report = Report {
			configuration: vec![
				row("default/a-very-long-cluster-name", "kyverno", Action::Added),
				row("default/c", "kyverno", Action::Added),
			],
			..Default::default()
		};

		let mut output = Vec::new();
		ReportWriter::new(&mut output, ColorMode::Never)
			.write_report(&report)
			.unwrap();
		let output = String::from_utf8(output).unwrap();

		let columns: Vec<_> = output.lines().map(|l| l.find("helm")).collect();
		assert_eq!(columns[1], columns[2]);
	}

	#[test]
	fn test_write_diff_plain_and_colored() {
		let diff = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n";

		let mut plain = Vec::new();
		ReportWriter::new(&mut plain, ColorMode::Never)
			.write_diff(diff)
			.unwrap();
		assert_eq!(String::from_utf8(plain).unwrap(), diff);

		let mut colored = Vec::new();
		ReportWriter::new(&mut colored, ColorMode::Always)
			.write_diff(diff)
			.unwrap();
		let colored = String::from_utf8(colored).unwrap();
		assert!(colored.contains(&Color::Green.paint("+new").to_string()));
		assert!(colored.contains(&Color::Red.paint("-old").to_string()));
	}

	#[test]
	fn test_no_changes_notice() {
		let mut output = Vec::new();
		ReportWriter::new(&mut output, ColorMode::Never)
			.write_no_changes()
			.unwrap();
		assert_eq!(String::from_utf8(output).unwrap(), "no changes detected\n");
	}

	#[test]
	fn test_empty_report() {
		assert!(Report::default().is_empty());
		let streamed = Report {
			streamed_diffs: 1,
			..Default::default()
		};
		assert!(!streamed.is_empty());
	}

	#[test]
	fn test_write_error_is_reported() {
		let mut writer = ReportWriter::new(BrokenPipeWriter, ColorMode::Never);
		assert_matches!(writer.write_no_changes(), Err(SnapshotError::Output(_)));
	}
}
