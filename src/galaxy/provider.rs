//! Repository-tree provider contract and the fetch policies around it.

use std::sync::LazyLock;

use log::{info, warn};
use rand::Rng;
use regex::Regex;
use serde::Deserialize;

use super::builder::{GraphBuilder, qualify_entries};
use super::config::GalaxyConfig;
use super::error::FetchError;
use super::links::LinkSynthesizer;
use super::types::{RepositoryGraph, TreeEntry};

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"github\.com/([^/?#\s]+)/([^/?#\s]+)")
		.expect("repository URL pattern is a valid regex")
});

/// Conventional default branch names, in the order they are tried.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// Ceiling on analysis attempts for retryable failures.
pub const MAX_ANALYSIS_ATTEMPTS: u32 = 4;

/// Supplies recursive tree listings.
pub trait TreeProvider {
	/// Tree of `owner/repo` at `branch`, in tree order.
	fn fetch_tree(
		&self,
		owner: &str,
		repo: &str,
		branch: &str,
	) -> Result<Vec<TreeEntry>, FetchError>;
}

/// `(owner, repo)` from a `https://github.com/<owner>/<repo>` URL.
pub fn parse_repo_url(url: &str) -> Result<(String, String), FetchError> {
	let url = url.trim();
	let caps = REPO_URL
		.captures(url)
		.ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;
	let owner = caps[1].to_string();
	let repo = caps[2].trim_end_matches(".git").to_string();
	if repo.is_empty() {
		return Err(FetchError::InvalidUrl(url.to_string()));
	}
	Ok((owner, repo))
}

#[derive(Deserialize)]
struct TreeListing {
	tree: Vec<TreeEntry>,
}

/// Decodes a `{"tree": [...]}` listing body.
pub fn parse_tree_listing(body: &str) -> Result<Vec<TreeEntry>, FetchError> {
	serde_json::from_str::<TreeListing>(body)
		.map(|l| l.tree)
		.map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Fetches the tree from the first default branch that exists.
pub fn fetch_default_tree(
	provider: &dyn TreeProvider,
	owner: &str,
	repo: &str,
) -> Result<(String, Vec<TreeEntry>), FetchError> {
	let mut last = None;
	for branch in DEFAULT_BRANCHES {
		match provider.fetch_tree(owner, repo, branch) {
			Ok(tree) => return Ok((branch.to_string(), tree)),
			Err(err @ FetchError::NotFound { .. }) => {
				warn!("{owner}/{repo}: no tree on '{branch}', trying next default branch");
				last = Some(err);
			}
			Err(err) => return Err(err),
		}
	}
	Err(last.unwrap_or(FetchError::NotFound {
		branch: DEFAULT_BRANCHES[DEFAULT_BRANCHES.len() - 1].to_string(),
	}))
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is spent. `op` receives the 1-based attempt number.
pub fn with_retries<T>(
	max_attempts: u32,
	mut op: impl FnMut(u32) -> Result<T, FetchError>,
) -> Result<T, FetchError> {
	let mut attempt = 1;
	loop {
		match op(attempt) {
			Ok(value) => return Ok(value),
			Err(err) if err.is_retryable() && attempt < max_attempts => {
				warn!("attempt {attempt}/{max_attempts} failed, retrying: {err}");
				attempt += 1;
			}
			Err(err) => return Err(err),
		}
	}
}

/// Fetches, qualifies and builds the graph for a repository URL.
pub fn analyze_repository<R: Rng>(
	provider: &dyn TreeProvider,
	url: &str,
	config: &GalaxyConfig,
	synthesizer: &dyn LinkSynthesizer,
	rng: &mut R,
) -> Result<RepositoryGraph, FetchError> {
	let (owner, repo) = parse_repo_url(url)?;
	info!("analyzing repository {owner}/{repo}");
	let (branch, tree) = with_retries(MAX_ANALYSIS_ATTEMPTS, |_| {
		fetch_default_tree(provider, &owner, &repo)
	})?;
	let entries = qualify_entries(&tree, &config.builder);
	info!(
		"{owner}/{repo}@{branch}: {} of {} entries qualify",
		entries.len(),
		tree.len()
	);
	Ok(GraphBuilder::new(&config.builder).build(&owner, &repo, &entries, synthesizer, rng))
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::galaxy::links::StructuralLinks;
	use crate::galaxy::types::EntryKind;

	/// Replays scripted responses and records the branches asked for.
	struct Scripted {
		responses: RefCell<Vec<Result<Vec<TreeEntry>, FetchError>>>,
		asked: RefCell<Vec<String>>,
	}

	impl Scripted {
		fn new(mut responses: Vec<Result<Vec<TreeEntry>, FetchError>>) -> Self {
			responses.reverse();
			Self {
				responses: RefCell::new(responses),
				asked: RefCell::new(Vec::new()),
			}
		}
	}

	impl TreeProvider for Scripted {
		fn fetch_tree(
			&self,
			_owner: &str,
			_repo: &str,
			branch: &str,
		) -> Result<Vec<TreeEntry>, FetchError> {
			self.asked.borrow_mut().push(branch.to_string());
			self.responses
				.borrow_mut()
				.pop()
				.unwrap_or(Err(FetchError::Network("script exhausted".into())))
		}
	}

	fn tree() -> Vec<TreeEntry> {
		vec![
			TreeEntry {
				path: "src/lib.rs".into(),
				kind: EntryKind::Blob,
				size: Some(800),
			},
			TreeEntry {
				path: "docs".into(),
				kind: EntryKind::Tree,
				size: None,
			},
		]
	}

	fn not_found(branch: &str) -> FetchError {
		FetchError::NotFound {
			branch: branch.into(),
		}
	}

	#[test]
	fn repo_urls_are_parsed_and_validated() {
		assert_eq!(
			parse_repo_url(" https://github.com/rust-lang/rust.git ").unwrap(),
			("rust-lang".to_string(), "rust".to_string())
		);
		assert_eq!(
			parse_repo_url("https://github.com/octo/demo/tree/main").unwrap(),
			("octo".to_string(), "demo".to_string())
		);
		assert_eq!(
			parse_repo_url("github.com/octo/demo").unwrap(),
			("octo".to_string(), "demo".to_string())
		);
		assert_eq!(
			parse_repo_url("https://www.github.com/octo/demo?tab=readme").unwrap(),
			("octo".to_string(), "demo".to_string())
		);
		assert!(matches!(
			parse_repo_url("https://gitlab.com/a/b"),
			Err(FetchError::InvalidUrl(_))
		));
		assert!(parse_repo_url("github.com/a").is_err());
	}

	#[test]
	fn falls_back_to_master_only_on_not_found() {
		let provider = Scripted::new(vec![Err(not_found("main")), Ok(tree())]);
		let (branch, entries) = fetch_default_tree(&provider, "o", "r").unwrap();
		assert_eq!(branch, "master");
		assert_eq!(entries.len(), 2);
		assert_eq!(*provider.asked.borrow(), vec!["main", "master"]);

		let limited = Scripted::new(vec![Err(FetchError::RateLimited)]);
		assert_eq!(fetch_default_tree(&limited, "o", "r"), Err(FetchError::RateLimited));
		assert_eq!(limited.asked.borrow().len(), 1);

		let missing = Scripted::new(vec![Err(not_found("main")), Err(not_found("master"))]);
		assert_eq!(fetch_default_tree(&missing, "o", "r"), Err(not_found("master")));
	}

	#[test]
	fn retries_stop_at_the_attempt_ceiling() {
		let mut calls = 0;
		let result: Result<(), FetchError> = with_retries(MAX_ANALYSIS_ATTEMPTS, |_| {
			calls += 1;
			Err(FetchError::Gateway("502".into()))
		});
		assert_eq!(result, Err(FetchError::Gateway("502".into())));
		assert_eq!(calls, 4);
	}

	#[test]
	fn validation_failures_are_not_retried() {
		let mut calls = 0;
		let result: Result<(), FetchError> = with_retries(MAX_ANALYSIS_ATTEMPTS, |_| {
			calls += 1;
			Err(FetchError::Malformed("bad body".into()))
		});
		assert!(result.is_err());
		assert_eq!(calls, 1);
	}

	#[test]
	fn analysis_recovers_from_a_transient_gateway_failure() {
		let provider = Scripted::new(vec![Err(FetchError::Gateway("edge".into())), Ok(tree())]);
		let graph = analyze_repository(
			&provider,
			"https://github.com/octo/demo",
			&GalaxyConfig::default(),
			&StructuralLinks::default(),
			&mut StdRng::seed_from_u64(1),
		)
		.unwrap();
		assert_eq!(graph.metadata.owner, "octo");
		assert_eq!(graph.metadata.total_files, 1);
		assert_eq!(graph.nodes[0].loc, 20);
		assert!(graph.nodes[0].is_star);
	}

	#[test]
	fn tree_listing_bodies_are_decoded_or_rejected() {
		let body = concat!(
			r#"{"sha": "x", "tree": ["#,
			r#"{"path": "a.ts", "type": "blob", "size": 12}, {"path": "b", "type": "tree"}]}"#,
		);
		let entries = parse_tree_listing(body).unwrap();
		assert_eq!(entries[0].size, Some(12));
		assert_eq!(entries[1].kind, EntryKind::Tree);
		assert!(matches!(parse_tree_listing("{}"), Err(FetchError::Malformed(_))));
	}
}
