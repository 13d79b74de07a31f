//! Per-file summaries from a text-generation collaborator.
//!
//! The collaborator answers with free text that should contain a JSON
//! object. Parsing never fails: anything unreadable becomes a degraded
//! summary that still renders.

use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::FetchError;

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```")
		.expect("fenced JSON pattern is a valid regex")
});
static BRACED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\{[\s\S]*\})").expect("braced JSON pattern is a valid regex"));

const PURPOSE_FALLBACK: &str = "Analysis unavailable";
const DEFAULT_PRIORITY: u8 = 3;

/// What the detail view shows for a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSummary {
	/// Short description of the file's purpose.
	pub purpose: String,
	/// The most important functions or types.
	pub critical_functions: Vec<String>,
	/// 1 (leave alone) to 5 (refactor first).
	pub refactoring_priority: u8,
	/// File the summary is about.
	pub file_path: String,
}

impl CodeSummary {
	/// Summary used when the response could not be parsed.
	pub fn degraded(content: &str, file_path: &str) -> Self {
		Self {
			purpose: content.chars().take(200).collect(),
			critical_functions: vec!["Unable to parse functions".to_string()],
			refactoring_priority: DEFAULT_PRIORITY,
			file_path: file_path.to_string(),
		}
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
	#[serde(default)]
	purpose: Option<String>,
	#[serde(default)]
	critical_functions: Option<Vec<String>>,
	#[serde(default)]
	refactoring_priority: Option<f64>,
}

/// Extracts a summary from collaborator output, tolerating surrounding
/// prose and markdown fences.
pub fn parse_summary(content: &str, file_path: &str) -> CodeSummary {
	let json = FENCED
		.captures(content)
		.or_else(|| BRACED.captures(content))
		.and_then(|c| c.get(1))
		.map_or(content, |m| m.as_str());

	match serde_json::from_str::<RawSummary>(json) {
		Ok(raw) => CodeSummary {
			purpose: raw
				.purpose
				.filter(|p| !p.trim().is_empty())
				.unwrap_or_else(|| PURPOSE_FALLBACK.to_string()),
			critical_functions: raw.critical_functions.unwrap_or_default(),
			refactoring_priority: raw
				.refactoring_priority
				.filter(|p| *p >= 1.0)
				.map_or(DEFAULT_PRIORITY, |p| p.round().min(5.0) as u8),
			file_path: file_path.to_string(),
		},
		Err(err) => {
			warn!("unparseable summary for {file_path}: {err}");
			CodeSummary::degraded(content, file_path)
		}
	}
}

/// Source of file contents and raw summaries.
pub trait SummaryProvider {
	/// Raw text of a file.
	fn file_content(&self, file_path: &str) -> Result<String, FetchError>;

	/// Free-text summary of `content`.
	fn summarize(&self, file_path: &str, content: &str) -> Result<String, FetchError>;
}

/// Fetches a file and its summary. Transport failures propagate; a bad
/// summary body does not.
pub fn summarize_file(
	provider: &dyn SummaryProvider,
	file_path: &str,
) -> Result<(String, CodeSummary), FetchError> {
	let content = provider.file_content(file_path)?;
	let raw = provider.summarize(file_path, &content)?;
	let summary = parse_summary(&raw, file_path);
	Ok((content, summary))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fenced_json_is_extracted() {
		let raw = concat!(
			"Sure! Here you go:\n```json\n",
			r#"{"purpose": "Parses input.", "criticalFunctions": ["parse", "lex", "emit"], "#,
			r#""refactoringPriority": 4}"#,
			"\n```\nHope it helps.",
		);
		let s = parse_summary(raw, "src/parse.rs");
		assert_eq!(s.purpose, "Parses input.");
		assert_eq!(s.critical_functions, vec!["parse", "lex", "emit"]);
		assert_eq!(s.refactoring_priority, 4);
		assert_eq!(s.file_path, "src/parse.rs");
	}

	#[test]
	fn bare_object_with_noise_is_extracted_and_defaults_fill_gaps() {
		let raw = "result: {\"purpose\": \"\", \"refactoringPriority\": 9} (end)";
		let s = parse_summary(raw, "a.ts");
		assert_eq!(s.purpose, "Analysis unavailable");
		assert!(s.critical_functions.is_empty());
		assert_eq!(s.refactoring_priority, 5);

		let zero = parse_summary("{\"refactoringPriority\": 0}", "a.ts");
		assert_eq!(zero.refactoring_priority, 3);
	}

	#[test]
	fn unparseable_output_degrades() {
		let raw = "x".repeat(500);
		let s = parse_summary(&raw, "big.py");
		assert_eq!(s.purpose.len(), 200);
		assert_eq!(s.critical_functions, vec!["Unable to parse functions"]);
		assert_eq!(s.refactoring_priority, 3);
	}

	struct Canned(Result<String, FetchError>);

	impl SummaryProvider for Canned {
		fn file_content(&self, _file_path: &str) -> Result<String, FetchError> {
			Ok("fn main() {}".into())
		}
		fn summarize(&self, _file_path: &str, _content: &str) -> Result<String, FetchError> {
			self.0.clone()
		}
	}

	#[test]
	fn transport_failures_propagate_but_bad_bodies_do_not() {
		let failing = Canned(Err(FetchError::Network("offline".into())));
		assert_eq!(
			summarize_file(&failing, "main.rs"),
			Err(FetchError::Network("offline".into()))
		);

		let garbled = Canned(Ok("no json here".into()));
		let (content, summary) = summarize_file(&garbled, "main.rs").unwrap();
		assert_eq!(content, "fn main() {}");
		assert_eq!(summary.purpose, "no json here");
	}
}
