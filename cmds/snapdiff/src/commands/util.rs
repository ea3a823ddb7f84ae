//! Utilities for command handlers.

use std::{
	io::{self, ErrorKind, Write},
	path::PathBuf,
};

use crate::{
	config::{SnapdiffConfig, STORAGE_ENV},
	snapshot::SnapshotStore,
};

/// A writer wrapper that silently handles broken pipe errors.
///
/// When the underlying writer returns a broken pipe error (EPIPE), this wrapper
/// converts it to a successful write. This allows commands to exit cleanly when
/// output is piped to a process that closes early (e.g., `snapdiff list | head -1`).
pub struct BrokenPipeGuard<W> {
	inner: W,
}

impl<W> BrokenPipeGuard<W> {
	pub fn new(inner: W) -> Self {
		Self { inner }
	}
}

impl<W: Write> Write for BrokenPipeGuard<W> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self.inner.write(buf) {
			Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(buf.len()),
			other => other,
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self.inner.flush() {
			Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
			other => other,
		}
	}
}

/// Open the snapshot store named by `--storage`, `SNAPDIFF_STORAGE`, the
/// config file, or the default location, in that order.
pub fn open_store(flag: Option<PathBuf>, config: &SnapdiffConfig) -> SnapshotStore {
	let env = std::env::var(STORAGE_ENV).ok();
	SnapshotStore::new(config.storage(flag.as_deref(), env.as_deref()))
}
