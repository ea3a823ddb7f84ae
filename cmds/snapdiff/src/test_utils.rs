//! Common test utilities.

use std::{
	fs,
	io::{self, ErrorKind, Write},
	path::Path,
};

use tempfile::TempDir;

/// A writer that simulates a broken pipe (SIGPIPE scenario).
///
/// This writer immediately returns `ErrorKind::BrokenPipe` on any write attempt,
/// simulating what happens when stdout is connected to a process that has exited.
pub struct BrokenPipeWriter;

impl Write for BrokenPipeWriter {
	fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
		Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
	}

	fn flush(&mut self) -> io::Result<()> {
		Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
	}
}

/// A throwaway sample folder on disk.
///
/// Files are written relative to the folder root, creating parent
/// directories as needed. The folder is removed on drop.
pub struct SampleDir {
	dir: TempDir,
}

impl Default for SampleDir {
	fn default() -> Self {
		Self::new()
	}
}

impl SampleDir {
	pub fn new() -> Self {
		Self {
			dir: TempDir::new().expect("create temp dir"),
		}
	}

	/// Write a file below the folder root.
	pub fn add_file(&self, rel: impl AsRef<Path>, content: &str) {
		let path = self.dir.path().join(rel);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).expect("create parent dirs");
		}
		fs::write(&path, content).expect("write sample file");
	}

	/// Builder-style method to add a file.
	pub fn with_file(self, rel: impl AsRef<Path>, content: &str) -> Self {
		self.add_file(rel, content);
		self
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}
}
