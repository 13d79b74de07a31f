//! Graph construction and layout engine.
//!
//! Data flows leaf-first: tree entries go through the [`builder`] (nodes,
//! focal node) and a [`links`] synthesizer into a [`RepositoryGraph`].
//! The [`projector`] cuts a filtered [`GraphView`] out of it, the
//! [`layout`] engine positions that view, and the [`scene`] turns
//! positions into bodies the host can render and pick.
//!
//! Nothing in this module touches the DOM.

pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod language;
pub mod layout;
pub mod links;
pub mod projector;
pub mod provider;
pub mod scene;
pub mod summary;
pub mod types;

pub use builder::{GraphBuilder, qualify_entries, select_focal};
pub use config::GalaxyConfig;
pub use error::{FetchError, GalaxyError};
pub use layout::{LayoutEngine, LayoutPhase, StopReason};
pub use links::{DependencyLinks, LinkSynthesizer, StructuralLinks};
pub use projector::{Filter, GraphView, project};
pub use scene::{InteractionSink, Scene, Tooltip};
pub use types::{FileNode, GraphLink, RepoEntry, RepositoryGraph, VisualizationMode};
