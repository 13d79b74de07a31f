//! Graph model builder: repository entries to ranked file nodes.

use std::sync::LazyLock;

use log::{debug, info};
use rand::Rng;
use regex::Regex;

use super::config::BuilderConfig;
use super::language::{ExtensionClassifier, LanguageClassifier, extension};
use super::links::LinkSynthesizer;
use super::types::{EntryKind, FileNode, Metadata, RepoEntry, RepositoryGraph, Slot, TreeEntry};

static README: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)^(readme|read\.me|read_me)(\.(md|txt|rst|adoc))?$")
		.expect("README pattern is a valid regex")
});

/// Folder key for files at the top level of the repository.
pub const ROOT_FOLDER: &str = "root";

/// Keeps code-like blobs within the size limit, in tree order, capped.
pub fn qualify_entries(entries: &[TreeEntry], config: &BuilderConfig) -> Vec<RepoEntry> {
	let qualified: Vec<RepoEntry> = entries
		.iter()
		.filter(|e| e.kind == EntryKind::Blob)
		.filter_map(|e| {
			let size = e.size.unwrap_or(0);
			if size > config.max_file_size {
				return None;
			}
			let ext = extension(&e.path)?;
			config
				.code_extensions
				.iter()
				.any(|c| *c == ext)
				.then(|| RepoEntry::new(e.path.clone(), size))
		})
		.take(config.max_files)
		.collect();
	debug!(
		"qualified {} of {} tree entries",
		qualified.len(),
		entries.len()
	);
	qualified
}

/// Estimated line count at a fixed average line width.
pub fn estimate_lines(size_bytes: u64, chars_per_line: f64) -> u64 {
	(size_bytes as f64 / chars_per_line).ceil() as u64
}

/// Ranking score: line count dominates, raw size breaks near-ties.
pub fn importance(loc: u64, size_bytes: u64) -> f64 {
	loc as f64 * 1.5 + size_bytes as f64 / 1000.0
}

/// Whether a file name looks like a README.
pub fn is_readme(name: &str) -> bool {
	README.is_match(name)
}

/// Picks the focal node: the first README, else the first node of
/// strictly maximal importance.
pub fn select_focal(nodes: &[FileNode]) -> Option<Slot> {
	if let Some(slot) = nodes.iter().position(|n| is_readme(&n.name)) {
		return Some(slot);
	}
	let mut best: Option<Slot> = None;
	for (slot, node) in nodes.iter().enumerate() {
		match best {
			Some(b) if node.importance <= nodes[b].importance => {}
			_ => best = Some(slot),
		}
	}
	best
}

/// Recomputes `is_star` over `nodes`, leaving exactly one set on a
/// non-empty slice.
pub fn mark_star(nodes: &mut [FileNode]) -> Option<Slot> {
	let focal = select_focal(nodes);
	for (slot, node) in nodes.iter_mut().enumerate() {
		node.is_star = Some(slot) == focal;
	}
	focal
}

fn split_path(path: &str) -> (String, String) {
	match path.rsplit_once('/') {
		Some((folder, name)) if !folder.is_empty() => (name.to_string(), folder.to_string()),
		Some((_, name)) => (name.to_string(), ROOT_FOLDER.to_string()),
		None => (path.to_string(), ROOT_FOLDER.to_string()),
	}
}

/// Turns qualified entries into a [`RepositoryGraph`].
pub struct GraphBuilder<'a> {
	config: &'a BuilderConfig,
	classifier: &'a dyn LanguageClassifier,
}

impl<'a> GraphBuilder<'a> {
	/// Builder with the extension-based language classifier.
	pub fn new(config: &'a BuilderConfig) -> Self {
		Self {
			config,
			classifier: &ExtensionClassifier,
		}
	}

	/// Replaces the language classifier.
	pub fn with_classifier(mut self, classifier: &'a dyn LanguageClassifier) -> Self {
		self.classifier = classifier;
		self
	}

	/// One node per entry, in input order, star not yet marked.
	pub fn nodes<R: Rng + ?Sized>(
		&self,
		owner: &str,
		repo: &str,
		entries: &[RepoEntry],
		rng: &mut R,
	) -> Vec<FileNode> {
		entries
			.iter()
			.map(|entry| {
				let (name, folder) = split_path(&entry.path);
				let loc = estimate_lines(entry.size_bytes, self.config.chars_per_line);
				FileNode {
					id: entry.path.clone(),
					path: format!("{owner}/{repo}/{}", entry.path),
					name,
					size: entry.size_bytes,
					loc,
					language: self.classifier.classify(&entry.path),
					brightness: rng.gen_range(0.5..1.0),
					folder,
					importance: importance(loc, entry.size_bytes),
					is_star: false,
				}
			})
			.collect()
	}

	/// Builds nodes, marks the focal node and synthesizes links.
	pub fn build<R: Rng>(
		&self,
		owner: &str,
		repo: &str,
		entries: &[RepoEntry],
		synthesizer: &dyn LinkSynthesizer,
		rng: &mut R,
	) -> RepositoryGraph {
		let mut nodes = self.nodes(owner, repo, entries, rng);
		let focal = mark_star(&mut nodes);
		let links = synthesizer.synthesize(&nodes, rng);
		let metadata = Metadata {
			owner: owner.to_string(),
			repo: repo.to_string(),
			total_files: nodes.len(),
			total_loc: nodes.iter().map(|n| n.loc).sum(),
		};
		info!(
			"built {owner}/{repo}: {} files, {} links, star {:?}",
			nodes.len(),
			links.len(),
			focal.map(|s| nodes[s].id.as_str())
		);
		RepositoryGraph {
			nodes,
			links,
			metadata,
		}
	}
}
