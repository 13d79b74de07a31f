//! Failures at the configuration, export and provider boundaries.

use thiserror::Error;

/// Errors raised while loading configuration or exporting a graph.
#[derive(Debug, Error)]
pub enum GalaxyError {
	/// JSON could not be read or written.
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// Failures at the repository-tree provider boundary.
///
/// Providers classify their own failures; callers decide retry and
/// fallback policy from the variant alone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
	/// The requested branch has no tree.
	#[error("no repository tree on branch '{branch}'")]
	NotFound {
		/// Branch that was tried.
		branch: String,
	},

	/// The hosting API refused the request for quota reasons.
	#[error("rate limited by the repository host, try again later")]
	RateLimited,

	/// The request never produced a response.
	#[error("network error: {0}")]
	Network(String),

	/// An intermediate gateway or edge function answered with a failure.
	#[error("analysis gateway error: {0}")]
	Gateway(String),

	/// The repository locator could not be understood.
	#[error("invalid repository URL: {0}")]
	InvalidUrl(String),

	/// The provider answered with something that is not a tree listing.
	#[error("malformed provider response: {0}")]
	Malformed(String),
}

impl FetchError {
	/// Whether repeating the same request may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, FetchError::Gateway(_))
	}
}
