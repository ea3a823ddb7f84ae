//! Diff command handler.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::util::open_store;
use crate::{
	config::{self, SnapdiffConfig},
	orchestrator::{self, DiffRequest},
	report::{ColorMode, ReportWriter},
};

#[derive(Args)]
pub struct DiffArgs {
	/// Name of the snapshot
	#[arg(long)]
	pub snapshot: String,

	/// Sample to compare from
	#[arg(long)]
	pub from: String,

	/// Sample to compare to
	#[arg(long)]
	pub to: String,

	/// Only compare clusters in this namespace
	#[arg(long)]
	pub namespace: Option<String>,

	/// Only compare the cluster with this name
	#[arg(long)]
	pub cluster: Option<String>,

	/// Print content diffs of modified resources instead of summary rows
	#[arg(long)]
	pub raw_diff: bool,

	/// Controls color in diff output
	#[arg(long, value_enum)]
	pub color: Option<ColorMode>,

	/// Directory holding the snapshots
	#[arg(long)]
	pub storage: Option<PathBuf>,

	/// Log level (possible values: disabled, fatal, error, warn, info, debug, trace).
	/// Falls back to RUST_LOG, then info.
	#[arg(long)]
	pub log_level: Option<String>,
}

impl DiffArgs {
	fn request(&self) -> DiffRequest {
		DiffRequest {
			snapshot: self.snapshot.clone(),
			from_sample: self.from.clone(),
			to_sample: self.to.clone(),
			namespace: self.namespace.clone(),
			cluster: self.cluster.clone(),
			raw_diff: self.raw_diff,
		}
	}
}

/// Run the diff command.
pub fn run<W: Write>(args: DiffArgs, writer: W) -> Result<()> {
	let config = config::load()?;
	run_with_config(args, &config, writer)
}

/// Run the diff command with an already loaded config.
pub fn run_with_config<W: Write>(args: DiffArgs, config: &SnapdiffConfig, writer: W) -> Result<()> {
	let store = open_store(args.storage.clone(), config);
	let mut out = ReportWriter::new(writer, config.color(args.color));

	orchestrator::run(&args.request(), &store, &mut out).with_context(|| {
		format!(
			"comparing samples '{}' and '{}' of snapshot '{}'",
			args.from, args.to, args.snapshot
		)
	})?;

	out.into_inner().flush().context("flushing output")?;
	Ok(())
}
