//! Read-only snapshots of the current graph.

use super::error::GalaxyError;
use super::types::{Metadata, RepositoryGraph};

/// Pretty JSON of the full graph.
pub fn export_json(graph: &RepositoryGraph) -> Result<String, GalaxyError> {
	Ok(serde_json::to_string_pretty(graph)?)
}

/// Loads a graph previously written by [`export_json`] or the analyzer.
pub fn import_json(raw: &str) -> Result<RepositoryGraph, GalaxyError> {
	Ok(serde_json::from_str(raw)?)
}

/// File name stem for exports, `codegalaxy-<owner>-<repo>`.
pub fn export_file_stem(metadata: &Metadata) -> String {
	format!("codegalaxy-{}-{}", metadata.owner, metadata.repo)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::galaxy::types::{FileNode, GraphLink};

	fn graph() -> RepositoryGraph {
		RepositoryGraph {
			nodes: vec![FileNode {
				id: "README.md".into(),
				path: "octo/demo/README.md".into(),
				name: "README.md".into(),
				size: 100,
				loc: 3,
				language: "md".into(),
				brightness: 0.9,
				folder: "root".into(),
				importance: 4.6,
				is_star: true,
			}],
			links: vec![GraphLink::new("README.md", "README.md", 1.0)],
			metadata: Metadata {
				owner: "octo".into(),
				repo: "demo".into(),
				total_files: 1,
				total_loc: 3,
			},
		}
	}

	#[test]
	fn json_export_uses_wire_names_and_reloads() {
		let graph = graph();
		let json = export_json(&graph).unwrap();
		assert!(json.contains("\"isStar\": true"));
		assert!(json.contains("\"totalLOC\": 3"));
		assert!(json.contains("\"source\": \"README.md\""));
		assert_eq!(import_json(&json).unwrap(), graph);
	}

	#[test]
	fn import_rejects_garbage() {
		assert!(import_json("not json").is_err());
	}

	#[test]
	fn file_stem_names_the_repository() {
		assert_eq!(export_file_stem(&graph().metadata), "codegalaxy-octo-demo");
	}
}
