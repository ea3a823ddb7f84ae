//! List command handler.

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tabwriter::TabWriter;

use super::util::open_store;
use crate::{
	config::{self, SnapdiffConfig},
	snapshot::SnapshotStore,
};

#[derive(Args)]
pub struct ListArgs {
	/// Only list samples of this snapshot
	#[arg(long)]
	pub snapshot: Option<String>,

	/// Directory holding the snapshots
	#[arg(long)]
	pub storage: Option<PathBuf>,

	/// Log level (possible values: disabled, fatal, error, warn, info, debug, trace).
	/// Falls back to RUST_LOG, then info.
	#[arg(long)]
	pub log_level: Option<String>,
}

/// Run the list command.
pub fn run<W: Write>(args: ListArgs, writer: W) -> Result<()> {
	let config = config::load()?;
	run_with_config(args, &config, writer)
}

/// Run the list command with an already loaded config.
pub fn run_with_config<W: Write>(args: ListArgs, config: &SnapdiffConfig, writer: W) -> Result<()> {
	let store = open_store(args.storage, config);
	let snapshots = match args.snapshot {
		Some(snapshot) => vec![snapshot],
		None => store
			.list_snapshots()
			.context("listing snapshots")?,
	};

	let mut tw = TabWriter::new(writer).padding(3);
	writeln!(tw, "SNAPSHOT\tSAMPLE")?;
	for snapshot in &snapshots {
		write_samples(&mut tw, &store, snapshot)?;
	}
	tw.flush()?;
	Ok(())
}

fn write_samples<W: Write>(writer: &mut W, store: &SnapshotStore, snapshot: &str) -> Result<()> {
	let samples = store
		.list_samples(snapshot)
		.with_context(|| format!("listing samples of snapshot '{snapshot}'"))?;
	if samples.is_empty() {
		writeln!(writer, "{snapshot}\t")?;
	}
	for sample in samples {
		writeln!(writer, "{snapshot}\t{sample}")?;
	}
	Ok(())
}
