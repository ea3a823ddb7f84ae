//! Tracing setup.

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Parse a `--log-level` value.
///
/// `disabled` turns logging off and yields `None`; `warning` and `fatal` are
/// accepted as aliases of `warn` and `error`.
pub fn parse_level(level: &str) -> Result<Option<Level>> {
	let level = match level.to_lowercase().as_str() {
		"disabled" | "off" => return Ok(None),
		"trace" => Level::TRACE,
		"debug" => Level::DEBUG,
		"info" => Level::INFO,
		"warn" | "warning" => Level::WARN,
		"error" | "fatal" => Level::ERROR,
		other => return Err(anyhow!("unknown log level '{other}'")),
	};
	Ok(Some(level))
}

/// Initialize tracing with the given log level.
///
/// Priority for log level:
/// 1. `log_level` argument (from --log-level CLI flag)
/// 2. `RUST_LOG` environment variable
/// 3. Default: info
///
/// Output format:
/// - Pretty format if stderr is a terminal
/// - JSON format otherwise
pub fn init(log_level: Option<Level>) -> Result<()> {
	// Build filter layer: CLI flag takes priority, then RUST_LOG, then default to info
	let filter_layer = match log_level {
		Some(level) => EnvFilter::new(level.as_str()),
		None => EnvFilter::builder()
			.with_default_directive(Level::INFO.into())
			.from_env_lossy(),
	};

	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.pretty()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(fmt_layer)
		.try_init()?;

	Ok(())
}

/// Turn logging off entirely.
pub fn disable() -> Result<()> {
	tracing_subscriber::registry()
		.with(EnvFilter::new("off"))
		.try_init()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("info", Some(Level::INFO))]
	#[case("DEBUG", Some(Level::DEBUG))]
	#[case("warning", Some(Level::WARN))]
	#[case("fatal", Some(Level::ERROR))]
	#[case("disabled", None)]
	fn test_parse_level(#[case] input: &str, #[case] expected: Option<Level>) {
		assert_eq!(parse_level(input).unwrap(), expected);
	}

	#[test]
	fn test_parse_unknown_level() {
		assert!(parse_level("loud").is_err());
	}
}
