//! Link synthesis strategies.
//!
//! Structural links are a visual-density heuristic: they connect files
//! that share a folder at random and say nothing about real imports. A
//! static import-graph extractor would plug in here as another
//! [`LinkSynthesizer`].

use std::collections::{HashMap, HashSet};

use log::debug;
use rand::{Rng, RngCore};

use super::config::LinkConfig;
use super::types::{FileNode, GraphLink, LinkEndpoint};

/// Derives relationships between the nodes it is given.
///
/// Implementations never return a link whose endpoints are not both in
/// `nodes`.
pub trait LinkSynthesizer {
	/// Links over `nodes`.
	fn synthesize(&self, nodes: &[FileNode], rng: &mut dyn RngCore) -> Vec<GraphLink>;
}

/// Random same-folder sibling edges.
#[derive(Clone, Debug)]
pub struct StructuralLinks {
	probability: f64,
}

impl StructuralLinks {
	/// Synthesizer attaching an edge to a node with the given probability.
	pub fn new(probability: f64) -> Self {
		Self {
			probability: probability.clamp(0.0, 1.0),
		}
	}

	/// Synthesizer from configuration.
	pub fn from_config(config: &LinkConfig) -> Self {
		Self::new(config.structural_probability)
	}
}

impl Default for StructuralLinks {
	fn default() -> Self {
		Self::from_config(&LinkConfig::default())
	}
}

impl LinkSynthesizer for StructuralLinks {
	fn synthesize(&self, nodes: &[FileNode], rng: &mut dyn RngCore) -> Vec<GraphLink> {
		let mut folders: HashMap<&str, Vec<usize>> = HashMap::new();
		for (i, node) in nodes.iter().enumerate() {
			folders.entry(node.folder.as_str()).or_default().push(i);
		}

		let mut links = Vec::new();
		for (i, node) in nodes.iter().enumerate() {
			let group = &folders[node.folder.as_str()];
			if group.len() < 2 || rng.gen_range(0.0..1.0) >= self.probability {
				continue;
			}
			// Pick among the siblings, skipping the node itself.
			let mut pick = rng.gen_range(0..group.len() - 1);
			if group[pick] == i {
				pick = group.len() - 1;
			}
			let target = &nodes[group[pick]];
			links.push(GraphLink::new(
				node.id.as_str(),
				target.id.as_str(),
				rng.gen_range(0.5..1.0),
			));
		}
		debug!(
			"structural links: {} over {} folders",
			links.len(),
			folders.len()
		);
		links
	}
}

/// An externally supplied edge list, used verbatim.
#[derive(Clone, Debug, Default)]
pub struct DependencyLinks {
	edges: Vec<GraphLink>,
}

impl DependencyLinks {
	/// Wraps an edge list.
	pub fn new(edges: Vec<GraphLink>) -> Self {
		Self { edges }
	}
}

impl LinkSynthesizer for DependencyLinks {
	fn synthesize(&self, nodes: &[FileNode], _rng: &mut dyn RngCore) -> Vec<GraphLink> {
		let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let links: Vec<GraphLink> = self
			.edges
			.iter()
			.filter_map(|link| {
				let source = link.source.id().filter(|id| ids.contains(id))?;
				let target = link.target.id().filter(|id| ids.contains(id))?;
				Some(GraphLink {
					source: LinkEndpoint::from(source),
					target: LinkEndpoint::from(target),
					strength: link.strength,
				})
			})
			.collect();
		if links.len() < self.edges.len() {
			debug!(
				"dependency links: dropped {} with unknown endpoints",
				self.edges.len() - links.len()
			);
		}
		links
	}
}
