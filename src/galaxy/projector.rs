//! Filter projection: the visible subset of a [`RepositoryGraph`].

use std::collections::HashMap;

use log::debug;

use super::builder::mark_star;
use super::types::{FileNode, Metadata, RepositoryGraph, Slot};

/// What the user currently wants to see. Replaced wholesale on every
/// interaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
	/// Case-insensitive substring of name, path or language; empty matches all.
	pub text: String,
	/// Accepted languages; empty accepts all.
	pub languages: Vec<String>,
	/// Inclusive lower bound on estimated lines.
	pub min_lines: u64,
	/// Inclusive upper bound on estimated lines; `None` is unbounded.
	pub max_lines: Option<u64>,
}

impl Filter {
	/// Filter on text only.
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			..Self::default()
		}
	}

	/// Whether `node` passes every criterion.
	pub fn matches(&self, node: &FileNode) -> bool {
		let query = self.text.trim().to_lowercase();
		let language = node.language.to_lowercase();
		let text_ok = query.is_empty()
			|| node.name.to_lowercase().contains(&query)
			|| node.path.to_lowercase().contains(&query)
			|| language.contains(&query);
		let language_ok = self.languages.is_empty()
			|| self.languages.iter().any(|l| l.to_lowercase() == language);
		let lines_ok =
			node.loc >= self.min_lines && self.max_lines.is_none_or(|max| node.loc <= max);
		text_ok && language_ok && lines_ok
	}
}

/// A link whose endpoints both survived projection.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewLink {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Weight in `(0, 1]`.
	pub strength: f64,
	/// Slot of the source in the view.
	pub source_slot: Slot,
	/// Slot of the target in the view.
	pub target_slot: Slot,
}

/// The projected `(nodes, links, focal)` triple.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphView {
	/// Surviving nodes, in graph order, with `is_star` recomputed.
	pub nodes: Vec<FileNode>,
	/// Surviving links with plain-id endpoints.
	pub links: Vec<ViewLink>,
	/// Slot of the focal node; `None` exactly when `nodes` is empty.
	pub focal: Option<Slot>,
	/// Metadata of the full graph.
	pub metadata: Metadata,
}

impl GraphView {
	/// Whether nothing survived.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The focal node.
	pub fn focal_node(&self) -> Option<&FileNode> {
		self.focal.and_then(|s| self.nodes.get(s))
	}

	/// Slot of the node with `id`.
	pub fn slot_of(&self, id: &str) -> Option<Slot> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Whether a node with `id` is visible. Hosts use this to drop a
	/// selection that no longer exists.
	pub fn contains(&self, id: &str) -> bool {
		self.slot_of(id).is_some()
	}
}

/// Projects `graph` through `filter`.
pub fn project(graph: &RepositoryGraph, filter: &Filter) -> GraphView {
	let mut nodes: Vec<FileNode> = graph
		.nodes
		.iter()
		.filter(|n| filter.matches(n))
		.cloned()
		.collect();
	let focal = mark_star(&mut nodes);

	let slots: HashMap<&str, Slot> = nodes
		.iter()
		.enumerate()
		.map(|(slot, n)| (n.id.as_str(), slot))
		.collect();
	let links: Vec<ViewLink> = graph
		.links
		.iter()
		.filter_map(|link| {
			let source = link.source.id()?;
			let target = link.target.id()?;
			Some(ViewLink {
				source_slot: *slots.get(source)?,
				target_slot: *slots.get(target)?,
				source: source.to_string(),
				target: target.to_string(),
				strength: link.strength,
			})
		})
		.collect();

	debug!(
		"projected {}/{} nodes, {}/{} links",
		nodes.len(),
		graph.nodes.len(),
		links.len(),
		graph.links.len()
	);
	GraphView {
		nodes,
		links,
		focal,
		metadata: graph.metadata.clone(),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::galaxy::builder::GraphBuilder;
	use crate::galaxy::config::BuilderConfig;
	use crate::galaxy::links::DependencyLinks;
	use crate::galaxy::types::{GraphLink, LinkEndpoint, RepoEntry};

	fn scenario_a() -> RepositoryGraph {
		let entries = vec![
			RepoEntry::new("a/x.ts", 400),
			RepoEntry::new("a/y.ts", 4000),
			RepoEntry::new("README.md", 100),
		];
		let edges = DependencyLinks::new(vec![
			GraphLink::new("a/x.ts", "a/y.ts", 1.0),
			GraphLink::new("a/y.ts", "README.md", 0.6),
			GraphLink::new("README.md", "a/x.ts", 0.8),
		]);
		let config = BuilderConfig::default();
		GraphBuilder::new(&config).build("o", "r", &entries, &edges, &mut StdRng::seed_from_u64(1))
	}

	fn assert_links_intact(view: &GraphView) {
		let ids: HashSet<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();
		for link in &view.links {
			assert!(ids.contains(link.source.as_str()));
			assert!(ids.contains(link.target.as_str()));
			assert_eq!(view.nodes[link.source_slot].id, link.source);
			assert_eq!(view.nodes[link.target_slot].id, link.target);
		}
	}

	#[test]
	fn identity_filter_keeps_everything() {
		let graph = scenario_a();
		let view = project(&graph, &Filter::default());
		assert_eq!(view.nodes.len(), 3);
		assert_eq!(view.links.len(), 3);
		assert_eq!(view.focal_node().map(|n| n.name.as_str()), Some("README.md"));
	}

	#[test]
	fn scenario_b_min_lines_moves_the_star() {
		let graph = scenario_a();
		let view = project(
			&graph,
			&Filter {
				min_lines: 50,
				..Filter::default()
			},
		);
		let names: Vec<&str> = view.nodes.iter().map(|n| n.name.as_str()).collect();
		assert_eq!(names, vec!["y.ts"]);
		assert_eq!(view.focal, Some(0));
		assert!(view.nodes[0].is_star);
		assert!(view.links.is_empty());
		assert!(!view.contains("README.md"));
	}

	#[test]
	fn filtering_everything_leaves_no_focal() {
		let graph = scenario_a();
		let view = project(&graph, &Filter::text("no-such-file"));
		assert!(view.is_empty());
		assert_eq!(view.focal, None);
		assert!(view.links.is_empty());
	}

	#[test]
	fn links_never_dangle_under_any_filter() {
		let graph = scenario_a();
		let filters = [
			Filter::default(),
			Filter::text("x"),
			Filter::text("A/"),
			Filter::text("ts"),
			Filter {
				languages: vec!["MD".into()],
				..Filter::default()
			},
			Filter {
				max_lines: Some(10),
				..Filter::default()
			},
			Filter {
				min_lines: 5,
				max_lines: Some(99),
				..Filter::default()
			},
		];
		for filter in &filters {
			let view = project(&graph, filter);
			assert_links_intact(&view);
			assert_eq!(
				view.nodes.iter().filter(|n| n.is_star).count(),
				usize::from(!view.is_empty())
			);
		}
	}

	#[test]
	fn object_endpoints_are_normalized_and_missing_ones_dropped() {
		let mut graph = scenario_a();
		graph.links = vec![
			GraphLink {
				source: LinkEndpoint::Node {
					id: Some("a/x.ts".into()),
				},
				target: "a/y.ts".into(),
				strength: 0.9,
			},
			GraphLink {
				source: LinkEndpoint::Node { id: None },
				target: "a/y.ts".into(),
				strength: 0.9,
			},
		];
		let view = project(&graph, &Filter::default());
		assert_eq!(view.links.len(), 1);
		assert_eq!(view.links[0].source, "a/x.ts");
		assert_eq!((view.links[0].source_slot, view.links[0].target_slot), (0, 1));
	}

	#[test]
	fn language_and_text_match_case_insensitively() {
		let graph = scenario_a();
		let by_language = project(
			&graph,
			&Filter {
				languages: vec!["TS".into()],
				..Filter::default()
			},
		);
		assert_eq!(by_language.nodes.len(), 2);
		// Neither survivor is a README, so the heavier file is the star.
		assert_eq!(by_language.focal_node().map(|n| n.name.as_str()), Some("y.ts"));

		let by_text = project(&graph, &Filter::text("  ReadMe "));
		assert_eq!(by_text.nodes.len(), 1);
	}
}
