use anyhow::Result;
use clap::{Parser, Subcommand};
use snapdiff::{
	commands::{self, util::BrokenPipeGuard},
	telemetry,
};

#[cfg(all(
	target_os = "linux",
	feature = "mimalloc",
	not(feature = "system-alloc")
))]
#[global_allocator]
static GLOBAL: mimallocator::Mimalloc = mimallocator::Mimalloc;

#[derive(Parser)]
#[command(name = "snapdiff")]
#[command(about = "Compare samples of cluster configuration snapshots", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Differences between two samples of a snapshot
	Diff(commands::diff::DiffArgs),

	/// List snapshots and their samples
	List(commands::list::ListArgs),
}

/// Extract log level from command
fn get_log_level(cmd: &Commands) -> Option<&str> {
	match cmd {
		Commands::Diff(args) => args.log_level.as_deref(),
		Commands::List(args) => args.log_level.as_deref(),
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	match get_log_level(&cli.command) {
		None => telemetry::init(None)?,
		Some(level) => match telemetry::parse_level(level)? {
			Some(level) => telemetry::init(Some(level))?,
			None => telemetry::disable()?,
		},
	}

	let stdout = BrokenPipeGuard::new(std::io::stdout());

	match cli.command {
		Commands::Diff(args) => commands::diff::run(args, stdout),
		Commands::List(args) => commands::list::run(args, stdout),
	}
}
