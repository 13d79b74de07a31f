use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::galaxy::{GalaxyConfig, GraphView, LayoutEngine, Scene, VisualizationMode};

/// Pointer travel, in pixels, before a press turns into an orbit.
const ORBIT_THRESHOLD: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct OrbitState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

/// Everything one mounted view owns: the layout run and the scene it feeds.
pub struct GalaxyState {
	pub mode: VisualizationMode,
	pub engine: LayoutEngine,
	pub scene: Scene,
	pub orbit: OrbitState,
	pub width: f64,
	pub height: f64,
}

impl GalaxyState {
	pub fn new(
		view: &GraphView,
		mode: VisualizationMode,
		config: &GalaxyConfig,
		width: f64,
		height: f64,
		seed: u64,
	) -> Self {
		let mut rng = StdRng::seed_from_u64(seed);
		let mut scene = Scene::new(view, config.scene.clone(), width, height, &mut rng);
		let mut engine = LayoutEngine::new(config.layout.clone(), rng.r#gen());
		engine.load(view, mode, &mut scene);
		Self {
			mode,
			engine,
			scene,
			orbit: OrbitState::default(),
			width,
			height,
		}
	}

	pub fn tick(&mut self, dt: f64) {
		self.engine.tick(dt, &mut self.scene);
		self.scene.advance(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.scene.camera_mut().resize(width, height);
	}

	pub fn begin_orbit(&mut self, x: f64, y: f64) {
		self.orbit = OrbitState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	/// Returns false when no drag is in progress. Jitter under
	/// [`ORBIT_THRESHOLD`] leaves the press a click.
	pub fn drag_orbit(&mut self, x: f64, y: f64) -> bool {
		if !self.orbit.active {
			return false;
		}
		if !self.orbit.moved {
			let travel = (x - self.orbit.start_x).hypot(y - self.orbit.start_y);
			if travel <= ORBIT_THRESHOLD {
				return true;
			}
			self.orbit.moved = true;
		}
		let (dx, dy) = (x - self.orbit.last_x, y - self.orbit.last_y);
		self.scene.camera_mut().orbit(dx, dy);
		self.orbit.last_x = x;
		self.orbit.last_y = y;
		true
	}

	pub fn end_orbit(&mut self) {
		self.orbit.active = false;
	}

	/// Stops the run before the scene is released.
	pub fn teardown(&mut self) {
		self.engine.stop(&mut self.scene);
		self.scene.teardown();
		self.orbit = OrbitState::default();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::galaxy::types::{FileNode, Metadata, RepositoryGraph};
	use crate::galaxy::{Filter, LayoutPhase, project};

	fn view() -> GraphView {
		sized_view(4)
	}

	fn sized_view(count: u64) -> GraphView {
		let nodes = (0..count)
			.map(|i| FileNode {
				id: format!("f{i}.ts"),
				path: format!("o/r/f{i}.ts"),
				name: format!("f{i}.ts"),
				size: 40 * (i + 1),
				loc: i + 1,
				language: "ts".into(),
				brightness: 0.6,
				folder: "root".into(),
				importance: i as f64,
				is_star: false,
			})
			.collect();
		project(
			&RepositoryGraph {
				nodes,
				links: Vec::new(),
				metadata: Metadata::default(),
			},
			&Filter::default(),
		)
	}

	#[test]
	fn ticks_feed_the_scene_until_the_run_settles() {
		let mut state = GalaxyState::new(
			&view(),
			VisualizationMode::Structural,
			&GalaxyConfig::default(),
			800.0,
			600.0,
			17,
		);
		assert!(state.engine.is_running());
		while state.engine.is_running() {
			state.tick(0.016);
		}
		assert!(state.scene.is_settled());
		assert_eq!(state.scene.positions(), state.engine.positions());
		assert_eq!(state.scene.positions()[3], crate::galaxy::types::Vec3::ZERO);
	}

	#[test]
	fn dragging_marks_the_gesture_as_moved() {
		let mut state = GalaxyState::new(
			&view(),
			VisualizationMode::Structural,
			&GalaxyConfig::default(),
			800.0,
			600.0,
			1,
		);
		assert!(!state.drag_orbit(10.0, 10.0));
		state.begin_orbit(100.0, 100.0);
		assert!(state.drag_orbit(130.0, 90.0));
		assert!(state.orbit.moved);
		state.end_orbit();
		assert!(!state.orbit.active);
	}

	#[test]
	fn small_jitter_keeps_the_press_a_click() {
		let mut state = GalaxyState::new(
			&view(),
			VisualizationMode::Structural,
			&GalaxyConfig::default(),
			800.0,
			600.0,
			1,
		);
		let before = state.scene.camera().pose();
		state.begin_orbit(100.0, 100.0);
		assert!(state.drag_orbit(101.0, 100.0));
		assert!(state.drag_orbit(101.0, 101.0));
		assert!(!state.orbit.moved);
		assert_eq!(state.scene.camera().pose(), before);
		assert!(state.drag_orbit(110.0, 100.0));
		assert!(state.orbit.moved);
		assert_ne!(state.scene.camera().pose(), before);
	}

	#[test]
	fn one_seed_keeps_the_backdrop_across_views() {
		let config = GalaxyConfig::default();
		let mode = VisualizationMode::Structural;
		let small = GalaxyState::new(&sized_view(2), mode, &config, 800.0, 600.0, 42);
		let large = GalaxyState::new(&sized_view(6), mode, &config, 800.0, 600.0, 42);
		assert_eq!(small.scene.star_color(), large.scene.star_color());
		assert_eq!(small.scene.background(), large.scene.background());
	}

	#[test]
	fn teardown_stops_the_run_and_releases_bodies() {
		let mut state = GalaxyState::new(
			&view(),
			VisualizationMode::Dependency,
			&GalaxyConfig::default(),
			800.0,
			600.0,
			3,
		);
		state.tick(0.016);
		state.teardown();
		assert_eq!(state.engine.phase(), LayoutPhase::Uninitialized);
		assert!(state.scene.bodies().is_empty());
	}
}
