//! Scene and interaction adapter.
//!
//! Maps every node of a view to a renderable body, answers pointer
//! queries by casting a ray from the camera against the bodies' spheres,
//! and owns the camera pose. Positions arrive only through
//! [`LayoutObserver::on_tick`]; pointer handling never writes them.

use std::f64::consts::PI;

use log::debug;
use rand::Rng;

use super::config::SceneConfig;
use super::layout::{LayoutFrame, LayoutObserver, StopReason};
use super::projector::GraphView;
use super::types::{FileNode, Slot, Vec3};

/// Body colour per language tag.
pub const LANGUAGE_COLORS: &[(&str, u32)] = &[
	("javascript", 0xFFD700),
	("typescript", 0x4169E1),
	("python", 0x32CD32),
	("java", 0xFF6347),
	("go", 0x00CED1),
	("rust", 0xFF8C00),
	("cpp", 0xFF1493),
	("c", 0x9370DB),
	("ruby", 0xDC143C),
	("php", 0x9966CC),
	("swift", 0xFF7F50),
	("kotlin", 0xDA70D6),
	("css", 0x9932CC),
	("html", 0xFF4500),
];

/// Colour for languages missing from [`LANGUAGE_COLORS`].
pub const OTHER_COLOR: u32 = 0x48D1CC;

/// Palette the focal body's colour is drawn from, once per scene.
pub const STAR_COLORS: &[u32] = &[0xFF00FF, 0x00FFFF, 0xFFFF00, 0xFF0080, 0x00FF80, 0x8000FF];

/// Palette colour for a language tag or file extension, case-insensitive.
pub fn language_color(language: &str) -> u32 {
	let language = language.to_lowercase();
	let name = match language.as_str() {
		"js" | "jsx" => "javascript",
		"ts" | "tsx" => "typescript",
		"py" => "python",
		"rs" => "rust",
		"rb" => "ruby",
		"kt" => "kotlin",
		other => other,
	};
	LANGUAGE_COLORS
		.iter()
		.find(|(n, _)| *n == name)
		.map_or(OTHER_COLOR, |&(_, color)| color)
}

/// `rgba()` CSS string for a packed `0xRRGGBB` colour.
pub fn css_rgba(color: u32, alpha: f64) -> String {
	format!(
		"rgba({}, {}, {}, {:.3})",
		(color >> 16) & 0xFF,
		(color >> 8) & 0xFF,
		color & 0xFF,
		alpha.clamp(0.0, 1.0)
	)
}

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
	/// Eye position.
	pub position: Vec3,
	/// Look-at target.
	pub target: Vec3,
}

/// A half-line in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
	/// Start point.
	pub origin: Vec3,
	/// Unit direction.
	pub direction: Vec3,
}

impl Ray {
	/// Distance along the ray to the first intersection with a sphere.
	pub fn intersect_sphere(&self, center: Vec3, radius: f64) -> Option<f64> {
		let oc = self.origin - center;
		let b = oc.dot(self.direction);
		let c = oc.length_squared() - radius * radius;
		let disc = b * b - c;
		if disc < 0.0 {
			return None;
		}
		let root = disc.sqrt();
		[-b - root, -b + root].into_iter().find(|&t| t >= 0.0)
	}
}

/// A world point mapped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	/// Screen x in pixels.
	pub x: f64,
	/// Screen y in pixels.
	pub y: f64,
	/// Distance along the view direction.
	pub depth: f64,
	/// Pixels per world unit at this depth.
	pub scale: f64,
}

/// Perspective camera orbiting a target.
#[derive(Clone, Debug)]
pub struct Camera {
	pose: CameraPose,
	initial: CameraPose,
	tan_half_fov: f64,
	near: f64,
	far: f64,
	width: f64,
	height: f64,
	min_distance: f64,
	max_distance: f64,
	rotate_speed: f64,
}

impl Camera {
	/// Camera on +z looking at the origin; this pose is what reset restores.
	pub fn new(config: &SceneConfig, width: f64, height: f64) -> Self {
		let pose = CameraPose {
			position: Vec3::new(0.0, 0.0, config.camera_distance),
			target: Vec3::ZERO,
		};
		Self {
			pose,
			initial: pose,
			tan_half_fov: (config.fov_degrees.to_radians() / 2.0).tan(),
			near: config.near,
			far: config.far,
			width: width.max(1.0),
			height: height.max(1.0),
			min_distance: config.min_distance,
			max_distance: config.max_distance,
			rotate_speed: config.rotate_speed,
		}
	}

	/// Current pose.
	pub fn pose(&self) -> CameraPose {
		self.pose
	}

	/// Viewport size in pixels.
	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Updates the viewport.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(1.0);
		self.height = height.max(1.0);
	}

	fn aspect(&self) -> f64 {
		self.width / self.height
	}

	/// Right, up and forward unit vectors.
	fn basis(&self) -> (Vec3, Vec3, Vec3) {
		let forward = (self.pose.target - self.pose.position).normalized();
		let mut right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalized();
		if right == Vec3::ZERO {
			right = Vec3::new(1.0, 0.0, 0.0);
		}
		let up = right.cross(forward);
		(right, up, forward)
	}

	/// Screen position of a world point; `None` outside the clip range.
	pub fn project(&self, point: Vec3) -> Option<Projected> {
		let (right, up, forward) = self.basis();
		let rel = point - self.pose.position;
		let depth = rel.dot(forward);
		if depth <= self.near || depth >= self.far {
			return None;
		}
		let half_h = depth * self.tan_half_fov;
		let ndc_x = rel.dot(right) / (half_h * self.aspect());
		let ndc_y = rel.dot(up) / half_h;
		Some(Projected {
			x: (ndc_x + 1.0) / 2.0 * self.width,
			y: (1.0 - ndc_y) / 2.0 * self.height,
			depth,
			scale: self.height / 2.0 / half_h,
		})
	}

	/// View ray through a screen pixel.
	pub fn ray(&self, sx: f64, sy: f64) -> Ray {
		let (right, up, forward) = self.basis();
		let ndc_x = sx / self.width * 2.0 - 1.0;
		let ndc_y = 1.0 - sy / self.height * 2.0;
		let direction = (forward
			+ right * (ndc_x * self.tan_half_fov * self.aspect())
			+ up * (ndc_y * self.tan_half_fov))
			.normalized();
		Ray {
			origin: self.pose.position,
			direction,
		}
	}

	/// Rotates around the target by a pointer drag of `(dx, dy)` pixels.
	pub fn orbit(&mut self, dx: f64, dy: f64) {
		let offset = self.pose.position - self.pose.target;
		let radius = offset.length();
		if radius == 0.0 {
			return;
		}
		let theta = offset.x.atan2(offset.z) - dx * self.rotate_speed;
		let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() - dy * self.rotate_speed)
			.clamp(0.01, PI - 0.01);
		self.pose.position = self.pose.target
			+ Vec3::new(
				radius * phi.sin() * theta.sin(),
				radius * phi.cos(),
				radius * phi.sin() * theta.cos(),
			);
	}

	/// Scales the distance to the target, within bounds.
	pub fn dolly(&mut self, factor: f64) {
		let offset = self.pose.position - self.pose.target;
		let radius = (offset.length() * factor).clamp(self.min_distance, self.max_distance);
		self.pose.position = self.pose.target + offset.normalized() * radius;
	}

	/// Restores the pose captured at construction.
	pub fn reset(&mut self) {
		self.pose = self.initial;
	}
}

/// The focal body's translucent shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Halo {
	/// Base radius.
	pub radius: f64,
	/// Opacity in `[0, 1]`.
	pub opacity: f64,
}

/// The renderable stand-in for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
	/// Slot of the node in the view.
	pub slot: Slot,
	/// Sphere radius, also the pick radius.
	pub radius: f64,
	/// Packed `0xRRGGBB` colour.
	pub color: u32,
	/// Current glow emphasis.
	pub emphasis: f64,
	/// Present only on the focal body.
	pub halo: Option<Halo>,
}

/// What a tooltip should show.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	/// Node id.
	pub id: String,
	/// First line.
	pub title: String,
	/// Second line.
	pub detail: String,
	/// Screen x in pixels.
	pub x: f64,
	/// Screen y in pixels.
	pub y: f64,
}

/// Receives the outcomes of pointer interaction.
pub trait InteractionSink {
	/// Display a tooltip, replacing any shown one.
	fn show_tooltip(&mut self, tooltip: Tooltip);
	/// Hide the tooltip.
	fn hide_tooltip(&mut self);
	/// A node was clicked.
	fn select(&mut self, node: &FileNode);
	/// Whether the pointer is over a body.
	fn set_pointer(&mut self, _over_body: bool) {}
}

/// The renderable state of one view.
pub struct Scene {
	config: SceneConfig,
	nodes: Vec<FileNode>,
	links: Vec<(Slot, Slot, f64)>,
	bodies: Vec<Body>,
	positions: Vec<Vec3>,
	background: Vec<Vec3>,
	camera: Camera,
	hovered: Option<Slot>,
	star_color: u32,
	time: f64,
	settled: bool,
}

impl Scene {
	/// Builds one body per node of `view`. The focal colour is drawn from
	/// `rng` here and kept for the scene's lifetime.
	pub fn new<R: Rng + ?Sized>(
		view: &GraphView,
		config: SceneConfig,
		width: f64,
		height: f64,
		rng: &mut R,
	) -> Self {
		let star_color = STAR_COLORS[rng.gen_range(0..STAR_COLORS.len())];
		let bodies = view
			.nodes
			.iter()
			.enumerate()
			.map(|(slot, node)| {
				if node.is_star {
					Body {
						slot,
						radius: config.star_size,
						color: star_color,
						emphasis: config.star_emphasis,
						halo: Some(Halo {
							radius: config.star_size * config.halo_scale,
							opacity: 0.3,
						}),
					}
				} else {
					Body {
						slot,
						radius: ((node.loc as f64 + 1.0).ln() * config.body_size_factor)
							.max(config.min_body_size),
						color: language_color(&node.language),
						emphasis: config.emphasis,
						halo: None,
					}
				}
			})
			.collect();
		let background = (0..config.background_stars)
			.map(|_| {
				Vec3::new(
					rng.gen_range(-2000.0..2000.0),
					rng.gen_range(-2000.0..2000.0),
					rng.gen_range(-2000.0..2000.0),
				)
			})
			.collect();
		debug!(
			"scene built: {} bodies, star colour {star_color:06x}",
			view.nodes.len()
		);
		Self {
			camera: Camera::new(&config, width, height),
			config,
			nodes: view.nodes.clone(),
			links: view
				.links
				.iter()
				.map(|l| (l.source_slot, l.target_slot, l.strength))
				.collect(),
			bodies,
			positions: vec![Vec3::ZERO; view.nodes.len()],
			background,
			hovered: None,
			star_color,
			time: 0.0,
			settled: false,
		}
	}

	/// Bodies in slot order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Node records in slot order.
	pub fn nodes(&self) -> &[FileNode] {
		&self.nodes
	}

	/// Links as slot pairs with their weight.
	pub fn links(&self) -> &[(Slot, Slot, f64)] {
		&self.links
	}

	/// Latest positions received from the layout.
	pub fn positions(&self) -> &[Vec3] {
		&self.positions
	}

	/// Static background points.
	pub fn background(&self) -> &[Vec3] {
		&self.background
	}

	/// The camera.
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// The camera, for orbit and dolly.
	pub fn camera_mut(&mut self) -> &mut Camera {
		&mut self.camera
	}

	/// Focal colour of this scene.
	pub fn star_color(&self) -> u32 {
		self.star_color
	}

	/// Currently hovered slot.
	pub fn hovered(&self) -> Option<Slot> {
		self.hovered
	}

	/// Whether the layout feeding this scene has stopped.
	pub fn is_settled(&self) -> bool {
		self.settled
	}

	/// Advances scene time, which drives the halo pulse.
	pub fn advance(&mut self, dt: f64) {
		self.time += dt.max(0.0);
	}

	/// Halo radius of a body at the current scene time.
	pub fn halo_radius(&self, body: &Body) -> Option<f64> {
		body.halo.map(|h| {
			let pulse = 1.0 + self.config.halo_pulse * (0.5 + 0.5 * (self.time * 2.0).sin());
			h.radius * pulse
		})
	}

	/// Bodies in back-to-front order with their screen projection.
	pub fn draw_order(&self) -> Vec<(&Body, Projected)> {
		let mut visible: Vec<(&Body, Projected)> = self
			.bodies
			.iter()
			.filter_map(|b| Some((b, self.camera.project(self.positions[b.slot])?)))
			.collect();
		visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
		visible
	}

	/// Nearest body hit by the view ray through a screen pixel.
	pub fn pick(&self, sx: f64, sy: f64) -> Option<Slot> {
		let ray = self.camera.ray(sx, sy);
		self.bodies
			.iter()
			.filter_map(|b| {
				ray.intersect_sphere(self.positions[b.slot], b.radius)
					.map(|t| (b.slot, t))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(slot, _)| slot)
	}

	fn resting_emphasis(&self, slot: Slot) -> f64 {
		if self.nodes[slot].is_star {
			self.config.star_emphasis
		} else {
			self.config.emphasis
		}
	}

	fn hover_emphasis(&self, slot: Slot) -> f64 {
		if self.nodes[slot].is_star {
			self.config.star_hover_emphasis
		} else {
			self.config.hover_emphasis
		}
	}

	fn tooltip(&self, slot: Slot, sx: f64, sy: f64) -> Tooltip {
		let node = &self.nodes[slot];
		let (title, detail) = if node.is_star {
			(
				format!("\u{2b50} {}", node.name),
				format!("{} \u{2022} {} LOC \u{2022} GALAXY STAR", node.language, node.loc),
			)
		} else {
			(
				node.name.clone(),
				format!("{} \u{2022} {} LOC", node.language, node.loc),
			)
		};
		Tooltip {
			id: node.id.clone(),
			title,
			detail,
			x: sx + 15.0,
			y: sy + 15.0,
		}
	}

	/// Pointer moved to `(sx, sy)`. Restores the previous hover, emphasises
	/// the new one and updates the tooltip.
	pub fn hover(&mut self, sx: f64, sy: f64, sink: &mut dyn InteractionSink) -> Option<Slot> {
		if let Some(prev) = self.hovered.take() {
			self.bodies[prev].emphasis = self.resting_emphasis(prev);
		}
		match self.pick(sx, sy) {
			Some(slot) => {
				self.bodies[slot].emphasis = self.hover_emphasis(slot);
				self.hovered = Some(slot);
				sink.show_tooltip(self.tooltip(slot, sx, sy));
				sink.set_pointer(true);
				Some(slot)
			}
			None => {
				self.clear_emphasis();
				sink.hide_tooltip();
				sink.set_pointer(false);
				None
			}
		}
	}

	/// Pointer left the surface.
	pub fn leave(&mut self, sink: &mut dyn InteractionSink) {
		self.clear_emphasis();
		sink.hide_tooltip();
		sink.set_pointer(false);
	}

	fn clear_emphasis(&mut self) {
		self.hovered = None;
		for slot in 0..self.bodies.len() {
			self.bodies[slot].emphasis = self.resting_emphasis(slot);
		}
	}

	/// Click at `(sx, sy)`: selects the hit node; a miss changes nothing.
	pub fn click(&self, sx: f64, sy: f64, sink: &mut dyn InteractionSink) -> Option<Slot> {
		let slot = self.pick(sx, sy)?;
		sink.select(&self.nodes[slot]);
		Some(slot)
	}

	/// Restores the initial camera pose.
	pub fn reset_view(&mut self) {
		self.camera.reset();
	}

	/// Releases bodies and hover state. The host stops its loops and
	/// detaches listeners alongside.
	pub fn teardown(&mut self) {
		self.hovered = None;
		self.bodies.clear();
		self.positions.clear();
		self.links.clear();
		self.nodes.clear();
		self.background.clear();
		self.settled = true;
	}
}

impl LayoutObserver for Scene {
	fn on_tick(&mut self, frame: &LayoutFrame<'_>) {
		if frame.positions.len() == self.positions.len() {
			self.positions.copy_from_slice(frame.positions);
		}
	}

	fn on_stop(&mut self, reason: StopReason) {
		self.settled = reason != StopReason::Cancelled;
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::galaxy::projector::{Filter, project};
	use crate::galaxy::types::{Metadata, RepositoryGraph};

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	#[derive(Default)]
	struct Sink {
		tooltip: Option<Tooltip>,
		selected: Vec<String>,
		pointer: bool,
	}

	impl InteractionSink for Sink {
		fn show_tooltip(&mut self, tooltip: Tooltip) {
			self.tooltip = Some(tooltip);
		}
		fn hide_tooltip(&mut self) {
			self.tooltip = None;
		}
		fn select(&mut self, node: &FileNode) {
			self.selected.push(node.id.clone());
		}
		fn set_pointer(&mut self, over_body: bool) {
			self.pointer = over_body;
		}
	}

	fn file(id: &str, loc: u64, language: &str) -> FileNode {
		FileNode {
			id: id.into(),
			path: format!("o/r/{id}"),
			name: id.into(),
			size: loc * 40,
			loc,
			language: language.into(),
			brightness: 0.8,
			folder: "root".into(),
			importance: loc as f64 * 1.5,
			is_star: false,
		}
	}

	/// README star at the origin, `near.ts` in front of it, `side.rs` off-axis.
	fn scene() -> Scene {
		let graph = RepositoryGraph {
			nodes: vec![
				file("README.md", 3, "md"),
				file("near.ts", 100, "typescript"),
				file("side.rs", 20, "rust"),
			],
			links: Vec::new(),
			metadata: Metadata::default(),
		};
		let view = project(&graph, &Filter::default());
		let mut rng = StdRng::seed_from_u64(5);
		let mut scene = Scene::new(&view, SceneConfig::default(), W, H, &mut rng);
		let positions = [Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0), Vec3::new(150.0, 0.0, 0.0)];
		scene.on_tick(&LayoutFrame {
			tick: 1,
			alpha: 0.5,
			positions: &positions,
		});
		scene
	}

	fn screen_of(scene: &Scene, slot: Slot) -> (f64, f64) {
		let p = scene.camera().project(scene.positions()[slot]).unwrap();
		(p.x, p.y)
	}

	#[test]
	fn bodies_are_sized_and_coloured_by_node() {
		let scene = scene();
		let bodies = scene.bodies();
		assert_eq!(bodies[0].radius, 15.0);
		assert_eq!(bodies[0].color, scene.star_color());
		assert!(STAR_COLORS.contains(&scene.star_color()));
		assert_eq!(bodies[0].halo.map(|h| h.radius), Some(22.5));
		assert!((bodies[1].radius - 101f64.ln() * 3.0).abs() < 1e-12);
		assert_eq!(bodies[1].color, 0x4169E1);
		assert!(bodies[1].halo.is_none());
		assert_eq!(language_color("Rust"), 0xFF8C00);
		assert_eq!(language_color("tsx"), 0x4169E1);
		assert_eq!(language_color("md"), OTHER_COLOR);

		let view = GraphView {
			nodes: vec![file("big.go", 1000, "go"), file("tiny.go", 0, "go")],
			..GraphView::default()
		};
		let scene = Scene::new(&view, SceneConfig::default(), W, H, &mut StdRng::seed_from_u64(0));
		assert_eq!(scene.bodies()[1].radius, 4.0);
	}

	#[test]
	fn star_colour_is_fixed_for_a_seed() {
		let a = scene();
		let b = scene();
		assert_eq!(a.star_color(), b.star_color());
	}

	#[test]
	fn pick_returns_the_nearest_body_along_the_ray() {
		let scene = scene();
		// Looking down -z through the centre: near.ts occludes the star.
		assert_eq!(scene.pick(W / 2.0, H / 2.0), Some(1));
		let (sx, sy) = screen_of(&scene, 2);
		assert_eq!(scene.pick(sx, sy), Some(2));
		assert_eq!(scene.pick(5.0, 5.0), None);
	}

	#[test]
	fn hover_moves_emphasis_and_tooltip() {
		let mut scene = scene();
		let mut sink = Sink::default();

		assert_eq!(scene.hover(W / 2.0, H / 2.0, &mut sink), Some(1));
		assert_eq!(scene.bodies()[1].emphasis, 1.2);
		let tip = sink.tooltip.clone().unwrap();
		assert_eq!(tip.title, "near.ts");
		assert_eq!(tip.detail, "typescript \u{2022} 100 LOC");
		assert_eq!((tip.x, tip.y), (W / 2.0 + 15.0, H / 2.0 + 15.0));
		assert!(sink.pointer);

		let (sx, sy) = screen_of(&scene, 2);
		assert_eq!(scene.hover(sx, sy, &mut sink), Some(2));
		assert_eq!(scene.bodies()[1].emphasis, 0.7);
		assert_eq!(scene.bodies()[2].emphasis, 1.2);

		assert_eq!(scene.hover(1.0, 1.0, &mut sink), None);
		assert!(sink.tooltip.is_none());
		assert!(!sink.pointer);
		assert!(scene.bodies().iter().all(|b| b.emphasis == 0.7 || b.halo.is_some()));
		assert_eq!(scene.bodies()[0].emphasis, 1.0);
	}

	#[test]
	fn hovering_the_star_uses_star_emphasis_and_label() {
		let mut scene = scene();
		scene.on_tick(&LayoutFrame {
			tick: 2,
			alpha: 0.4,
			positions: &[Vec3::ZERO, Vec3::new(-200.0, 0.0, 0.0), Vec3::new(150.0, 0.0, 0.0)],
		});
		let mut sink = Sink::default();
		assert_eq!(scene.hover(W / 2.0, H / 2.0, &mut sink), Some(0));
		assert_eq!(scene.bodies()[0].emphasis, 1.5);
		let tip = sink.tooltip.unwrap();
		assert!(tip.title.ends_with("README.md"));
		assert!(tip.detail.ends_with("GALAXY STAR"));
	}

	#[test]
	fn click_selects_on_hit_and_ignores_misses() {
		let scene = scene();
		let mut sink = Sink::default();
		assert_eq!(scene.click(W / 2.0, H / 2.0, &mut sink), Some(1));
		assert_eq!(scene.click(2.0, 2.0, &mut sink), None);
		assert_eq!(sink.selected, vec!["near.ts".to_string()]);
	}

	#[test]
	fn reset_is_idempotent_from_any_pose() {
		let mut scene = scene();
		let initial = scene.camera().pose();
		scene.camera_mut().orbit(120.0, -40.0);
		scene.camera_mut().dolly(0.5);
		assert_ne!(scene.camera().pose(), initial);

		scene.reset_view();
		let once = scene.camera().pose();
		scene.reset_view();
		assert_eq!(scene.camera().pose(), once);
		assert_eq!(once, initial);
	}

	#[test]
	fn orbit_keeps_distance_and_dolly_is_clamped() {
		let mut camera = Camera::new(&SceneConfig::default(), W, H);
		camera.orbit(300.0, 200.0);
		let pose = camera.pose();
		assert!(((pose.position - pose.target).length() - 500.0).abs() < 1e-9);

		camera.dolly(0.0001);
		assert!(((camera.pose().position - pose.target).length() - 50.0).abs() < 1e-9);
		camera.dolly(1e6);
		assert!(((camera.pose().position - pose.target).length() - 3000.0).abs() < 1e-9);
	}

	#[test]
	fn ray_through_a_projected_point_hits_it() {
		let mut camera = Camera::new(&SceneConfig::default(), W, H);
		camera.orbit(80.0, 30.0);
		let point = Vec3::new(40.0, -25.0, 60.0);
		let p = camera.project(point).unwrap();
		let ray = camera.ray(p.x, p.y);
		assert!(ray.intersect_sphere(point, 0.5).is_some());

		let fresh = Camera::new(&SceneConfig::default(), W, H);
		assert!(fresh.project(Vec3::new(0.0, 0.0, 600.0)).is_none());
	}

	#[test]
	fn ray_starting_inside_a_sphere_hits_its_far_side() {
		let ray = Ray {
			origin: Vec3::ZERO,
			direction: Vec3::new(1.0, 0.0, 0.0),
		};
		assert_eq!(ray.intersect_sphere(Vec3::ZERO, 2.0), Some(2.0));
		assert_eq!(ray.intersect_sphere(Vec3::new(-10.0, 0.0, 0.0), 2.0), None);
	}

	#[test]
	fn draw_order_is_back_to_front() {
		let scene = scene();
		let order: Vec<Slot> = scene.draw_order().iter().map(|(b, _)| b.slot).collect();
		assert_eq!(order.last(), Some(&1));
	}

	#[test]
	fn frames_of_the_wrong_size_are_ignored_and_teardown_releases() {
		let mut scene = scene();
		scene.on_tick(&LayoutFrame {
			tick: 3,
			alpha: 0.1,
			positions: &[Vec3::new(1.0, 1.0, 1.0)],
		});
		assert_eq!(scene.positions()[0], Vec3::ZERO);

		scene.on_stop(StopReason::Converged);
		assert!(scene.is_settled());
		scene.teardown();
		assert!(scene.bodies().is_empty());
		assert_eq!(scene.pick(W / 2.0, H / 2.0), None);
	}
}
