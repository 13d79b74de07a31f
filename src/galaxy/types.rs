//! Domain records shared by every stage of the galaxy pipeline.
//!
//! The wire names follow the JSON the repository analyzer emits, so a
//! [`RepositoryGraph`] exported from one session loads in another.
//!
//! Nodes carry no physics scratch state. Positions and velocities live in
//! the layout engine's own buffers, indexed by a node's slot in the view.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Index of a node inside a projected view. Stable for the lifetime of
/// that view; use [`FileNode::id`] for identity across views.
pub type Slot = usize;

/// A point or direction in simulation space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	/// X component.
	pub x: f64,
	/// Y component.
	pub y: f64,
	/// Z component.
	pub z: f64,
}

impl Vec3 {
	/// The origin.
	pub const ZERO: Vec3 = Vec3 {
		x: 0.0,
		y: 0.0,
		z: 0.0,
	};

	/// Builds a vector from its components.
	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	/// Dot product.
	pub fn dot(self, other: Vec3) -> f64 {
		self.x * other.x + self.y * other.y + self.z * other.z
	}

	/// Cross product.
	pub fn cross(self, other: Vec3) -> Vec3 {
		Vec3::new(
			self.y * other.z - self.z * other.y,
			self.z * other.x - self.x * other.z,
			self.x * other.y - self.y * other.x,
		)
	}

	/// Squared euclidean length.
	pub fn length_squared(self) -> f64 {
		self.dot(self)
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	/// Unit vector in the same direction, or zero for a zero vector.
	pub fn normalized(self) -> Vec3 {
		let len = self.length();
		if len > 0.0 { self * (1.0 / len) } else { Vec3::ZERO }
	}
}

impl Add for Vec3 {
	type Output = Vec3;
	fn add(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
	}
}

impl Sub for Vec3 {
	type Output = Vec3;
	fn sub(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
	}
}

impl Mul<f64> for Vec3 {
	type Output = Vec3;
	fn mul(self, rhs: f64) -> Vec3 {
		Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
	}
}

impl Neg for Vec3 {
	type Output = Vec3;
	fn neg(self) -> Vec3 {
		Vec3::new(-self.x, -self.y, -self.z)
	}
}

impl AddAssign for Vec3 {
	fn add_assign(&mut self, rhs: Vec3) {
		*self = *self + rhs;
	}
}

impl SubAssign for Vec3 {
	fn sub_assign(&mut self, rhs: Vec3) {
		*self = *self - rhs;
	}
}

/// Kind of an entry in a repository tree listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
	/// A file.
	Blob,
	/// A directory.
	Tree,
	/// A submodule pointer.
	Commit,
}

/// One raw entry of a recursive repository tree listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
	/// Repository-relative path.
	pub path: String,
	/// Entry kind.
	#[serde(rename = "type")]
	pub kind: EntryKind,
	/// Size in bytes; absent for directories.
	#[serde(default)]
	pub size: Option<u64>,
}

/// A file entry that passed qualification and becomes a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoEntry {
	/// Repository-relative path.
	pub path: String,
	/// Size in bytes.
	pub size_bytes: u64,
}

impl RepoEntry {
	/// Convenience constructor.
	pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
		Self {
			path: path.into(),
			size_bytes,
		}
	}
}

/// A file in the galaxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
	/// Repository-relative path, unique and stable across filtering.
	pub id: String,
	/// `owner/repo/<id>`.
	pub path: String,
	/// Last path segment.
	pub name: String,
	/// Size in bytes.
	pub size: u64,
	/// Estimated line count.
	pub loc: u64,
	/// Language tag.
	pub language: String,
	/// Cosmetic brightness in `[0.5, 1.0)`.
	pub brightness: f64,
	/// Parent folder, or `"root"` at the top level.
	pub folder: String,
	/// Ranking score used for focal-node selection.
	#[serde(default)]
	pub importance: f64,
	/// Whether this node is the focal node of the set it belongs to.
	#[serde(default)]
	pub is_star: bool,
}

/// One end of a link as it arrives on the wire: a bare node id, an object
/// carrying an `id`, or nothing at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEndpoint {
	/// A bare node id.
	Id(String),
	/// A node-like object with an id field.
	Node {
		/// The referenced node id, if present.
		#[serde(default)]
		id: Option<String>,
	},
	/// A null endpoint.
	Missing,
}

impl LinkEndpoint {
	/// The referenced node id, whichever shape the endpoint arrived in.
	pub fn id(&self) -> Option<&str> {
		match self {
			LinkEndpoint::Id(id) => Some(id),
			LinkEndpoint::Node { id } => id.as_deref(),
			LinkEndpoint::Missing => None,
		}
	}
}

impl From<&str> for LinkEndpoint {
	fn from(id: &str) -> Self {
		LinkEndpoint::Id(id.to_string())
	}
}

impl From<String> for LinkEndpoint {
	fn from(id: String) -> Self {
		LinkEndpoint::Id(id)
	}
}

/// A relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source endpoint.
	pub source: LinkEndpoint,
	/// Target endpoint.
	pub target: LinkEndpoint,
	/// Weight in `(0, 1]`.
	pub strength: f64,
}

impl GraphLink {
	/// Link between two node ids.
	pub fn new(
		source: impl Into<LinkEndpoint>,
		target: impl Into<LinkEndpoint>,
		strength: f64,
	) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			strength,
		}
	}
}

/// Repository-level facts recorded at construction time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
	/// Repository owner.
	pub owner: String,
	/// Repository name.
	pub repo: String,
	/// Node count at construction.
	pub total_files: usize,
	/// Sum of estimated line counts at construction.
	#[serde(rename = "totalLOC")]
	pub total_loc: u64,
}

/// The full, unfiltered model of a repository.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryGraph {
	/// All nodes in tree order.
	pub nodes: Vec<FileNode>,
	/// All links.
	pub links: Vec<GraphLink>,
	/// Construction metadata.
	pub metadata: Metadata,
}

impl RepositoryGraph {
	/// The current focal node, if any.
	pub fn star(&self) -> Option<&FileNode> {
		self.nodes.iter().find(|n| n.is_star)
	}
}

/// How links shape the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
	/// Folder co-location; links are not drawn or sprung.
	#[default]
	Structural,
	/// Links become springs and are drawn.
	Dependency,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn link_endpoints_accept_ids_objects_and_null() {
		let raw = r#"[
			{"source": "a.ts", "target": {"id": "b.ts"}, "strength": 0.5},
			{"source": {}, "target": null, "strength": 0.7}
		]"#;
		let links: Vec<GraphLink> = serde_json::from_str(raw).unwrap();
		assert_eq!(links[0].source.id(), Some("a.ts"));
		assert_eq!(links[0].target.id(), Some("b.ts"));
		assert_eq!(links[1].source.id(), None);
		assert_eq!(links[1].target.id(), None);
	}

	#[test]
	fn metadata_uses_wire_names() {
		let meta = Metadata {
			owner: "o".into(),
			repo: "r".into(),
			total_files: 2,
			total_loc: 13,
		};
		let json = serde_json::to_value(&meta).unwrap();
		assert_eq!(json["totalFiles"], 2);
		assert_eq!(json["totalLOC"], 13);
	}

	#[test]
	fn cross_product_follows_right_hand_rule() {
		let x = Vec3::new(1.0, 0.0, 0.0);
		let y = Vec3::new(0.0, 1.0, 0.0);
		assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
		assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
	}
}
