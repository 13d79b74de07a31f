//! Language tagging for file nodes.

/// Maps a repository path to a language tag.
pub trait LanguageClassifier {
	/// Language tag for `path`; lowercase, never empty.
	fn classify(&self, path: &str) -> String;
}

/// Tags a file by its lowercase extension, or `"other"` without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionClassifier;

impl LanguageClassifier for ExtensionClassifier {
	fn classify(&self, path: &str) -> String {
		extension(path).unwrap_or_else(|| "other".to_string())
	}
}

/// Lowercase extension of the last path segment.
pub fn extension(path: &str) -> Option<String> {
	let name = path.rsplit('/').next().unwrap_or(path);
	match name.rsplit_once('.') {
		Some((_, ext)) if !ext.is_empty() => Some(ext.to_ascii_lowercase()),
		_ => None,
	}
}
