//! Line-level unified diffs.
//!
//! Both helpers return an empty string when the inputs are identical, so
//! callers can use the result directly as a "did anything change" signal.

use serde_json::Value;
use similar::TextDiff;
use thiserror::Error;

/// Number of unchanged lines shown around each hunk.
pub const CONTEXT_RADIUS: usize = 3;

#[derive(Debug, Error)]
pub enum TextDiffError {
	#[error("serializing {label} as JSON")]
	Json {
		label: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Render a unified diff between two texts, headed by the two labels.
pub fn diff_text(label_a: &str, text_a: &str, label_b: &str, text_b: &str) -> String {
	if text_a == text_b {
		return String::new();
	}

	TextDiff::from_lines(text_a, text_b)
		.unified_diff()
		.context_radius(CONTEXT_RADIUS)
		.header(label_a, label_b)
		.to_string()
}

/// Render a unified diff between two JSON trees, each pretty-printed with
/// two-space indentation and sorted keys first.
pub fn diff_json(
	label_a: &str,
	value_a: &Value,
	label_b: &str,
	value_b: &Value,
) -> Result<String, TextDiffError> {
	let text_a = to_pretty_json(label_a, value_a)?;
	let text_b = to_pretty_json(label_b, value_b)?;
	Ok(diff_text(label_a, &text_a, label_b, &text_b))
}

/// Copy of `value` with every object's keys in sorted order, so key order
/// in the source document never shows up as a change.
fn sorted(value: &Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<_> = map.iter().collect();
			entries.sort_by(|(a, _), (b, _)| a.cmp(b));
			Value::Object(
				entries
					.into_iter()
					.map(|(key, value)| (key.clone(), sorted(value)))
					.collect(),
			)
		}
		Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
		other => other.clone(),
	}
}

fn to_pretty_json(label: &str, value: &Value) -> Result<String, TextDiffError> {
	let mut text = serde_json::to_string_pretty(&sorted(value)).map_err(|source| TextDiffError::Json {
		label: label.to_string(),
		source,
	})?;
	// Terminate the last line so the diff carries no "No newline" marker.
	text.push('\n');
	Ok(text)
}
