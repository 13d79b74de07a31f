//! Iterative force relaxation in three dimensions.
//!
//! One [`Simulation`] is one run over a fixed node/link set: many-body
//! repulsion, barycentric centering, collision avoidance and, in
//! dependency mode, link springs. The focal node is pinned at the origin
//! and never integrated. Alpha decays every tick; the run stops when it
//! falls below `alpha_min` or when the elapsed time reported by the host
//! reaches `max_duration_secs`, whichever comes first.
//!
//! [`LayoutEngine`] owns the current run and replaces it only when the
//! identity of the node/link set changes.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::LayoutConfig;
use super::projector::GraphView;
use super::types::{Slot, Vec3, VisualizationMode};

/// Lifecycle of a relaxation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
	/// Built but not started.
	Uninitialized,
	/// Ticking.
	Running,
	/// Finished; no further ticks move anything.
	Stopped(StopReason),
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
	/// Alpha fell below the convergence threshold.
	Converged,
	/// The wall-clock ceiling was reached first.
	TimedOut,
	/// The host stopped or replaced the run.
	Cancelled,
}

/// A spring between two slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
	/// Source slot.
	pub source: Slot,
	/// Target slot.
	pub target: Slot,
	/// Share of the correction applied to the target: the source's degree
	/// over the sum of both degrees.
	pub bias: f64,
}

impl Spring {
	/// Springs for slot pairs, with degree-based bias. Pairs naming a slot
	/// at or past `count` are dropped.
	pub fn from_pairs(count: usize, pairs: &[(Slot, Slot)]) -> Vec<Spring> {
		let in_range = |&&(s, t): &&(Slot, Slot)| s < count && t < count;
		let mut degree = vec![0usize; count];
		for &(s, t) in pairs.iter().filter(in_range) {
			degree[s] += 1;
			degree[t] += 1;
		}
		pairs
			.iter()
			.filter(in_range)
			.map(|&(source, target)| Spring {
				source,
				target,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect()
	}
}

/// Positions after one tick, handed to observers.
#[derive(Debug)]
pub struct LayoutFrame<'a> {
	/// Ticks completed in this run.
	pub tick: u64,
	/// Temperature after this tick.
	pub alpha: f64,
	/// One position per slot.
	pub positions: &'a [Vec3],
}

/// Receives every frame a run produces.
pub trait LayoutObserver {
	/// Called after each integration step.
	fn on_tick(&mut self, frame: &LayoutFrame<'_>);

	/// Called once when the run stops.
	fn on_stop(&mut self, _reason: StopReason) {}
}

/// Observer that ignores everything.
impl LayoutObserver for () {
	fn on_tick(&mut self, _frame: &LayoutFrame<'_>) {}
}

/// State of a single relaxation run.
pub struct Simulation {
	config: LayoutConfig,
	positions: Vec<Vec3>,
	velocities: Vec<Vec3>,
	pins: Vec<Option<Vec3>>,
	springs: Vec<Spring>,
	alpha: f64,
	elapsed: f64,
	ticks: u64,
	phase: LayoutPhase,
	rng: StdRng,
}

impl Simulation {
	/// A run over `count` bodies with `focal` pinned at the origin.
	pub fn new(
		count: usize,
		focal: Option<Slot>,
		springs: Vec<Spring>,
		config: LayoutConfig,
		seed: u64,
	) -> Self {
		let mut pins = vec![None; count];
		if let Some(slot) = focal.filter(|&s| s < count) {
			pins[slot] = Some(Vec3::ZERO);
		}
		let springs = springs
			.into_iter()
			.filter(|s| s.source < count && s.target < count)
			.collect();
		Self {
			alpha: config.alpha,
			config,
			positions: vec![Vec3::ZERO; count],
			velocities: vec![Vec3::ZERO; count],
			pins,
			springs,
			elapsed: 0.0,
			ticks: 0,
			phase: LayoutPhase::Uninitialized,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	/// Seeds positions on a 3D phyllotaxis spiral and starts ticking.
	pub fn start(&mut self) {
		if self.phase != LayoutPhase::Uninitialized {
			return;
		}
		let roll_step = PI * (3.0 - 5f64.sqrt());
		let yaw_step = PI * 20.0 / (9.0 + 221f64.sqrt());
		for (i, (pos, pin)) in self.positions.iter_mut().zip(&self.pins).enumerate() {
			*pos = match pin {
				Some(p) => *p,
				None => {
					let radius = self.config.initial_radius * (0.5 + i as f64).cbrt();
					let (roll, yaw) = (i as f64 * roll_step, i as f64 * yaw_step);
					Vec3::new(
						radius * roll.sin() * yaw.cos(),
						radius * roll.cos(),
						radius * roll.sin() * yaw.sin(),
					)
				}
			};
		}
		self.alpha = self.config.alpha;
		self.phase = LayoutPhase::Running;
		debug!(
			"layout run started: {} bodies, {} springs",
			self.positions.len(),
			self.springs.len()
		);
	}

	/// Current phase.
	pub fn phase(&self) -> LayoutPhase {
		self.phase
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Host-reported seconds spent running.
	pub fn elapsed(&self) -> f64 {
		self.elapsed
	}

	/// Ticks completed.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// One position per slot.
	pub fn positions(&self) -> &[Vec3] {
		&self.positions
	}

	/// Stops the run; later ticks are no-ops.
	pub fn cancel(&mut self, observer: &mut dyn LayoutObserver) {
		if matches!(self.phase, LayoutPhase::Running | LayoutPhase::Uninitialized) {
			self.finish(StopReason::Cancelled, observer);
		}
	}

	/// Advances the run by one tick of `dt` seconds of host time.
	pub fn tick(&mut self, dt: f64, observer: &mut dyn LayoutObserver) -> LayoutPhase {
		if self.phase != LayoutPhase::Running {
			return self.phase;
		}
		self.elapsed += dt.max(0.0);
		if self.elapsed >= self.config.max_duration_secs {
			self.finish(StopReason::TimedOut, observer);
			return self.phase;
		}

		self.step();
		observer.on_tick(&LayoutFrame {
			tick: self.ticks,
			alpha: self.alpha,
			positions: &self.positions,
		});

		let free = self.pins.iter().filter(|p| p.is_none()).count();
		if free == 0 || self.alpha < self.config.alpha_min {
			self.finish(StopReason::Converged, observer);
		}
		self.phase
	}

	fn finish(&mut self, reason: StopReason, observer: &mut dyn LayoutObserver) {
		self.phase = LayoutPhase::Stopped(reason);
		info!(
			"layout stopped ({reason:?}) after {} ticks, {:.2}s, alpha {:.4}",
			self.ticks, self.elapsed, self.alpha
		);
		observer.on_stop(reason);
	}

	fn step(&mut self) {
		self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
		self.apply_charge();
		self.apply_center();
		self.apply_collide();
		self.apply_springs();
		self.integrate();
		self.ticks += 1;
	}

	fn jiggle(&mut self) -> f64 {
		(self.rng.gen_range(0.0..1.0) - 0.5) * 1e-6
	}

	fn separate(&mut self, mut d: Vec3) -> Vec3 {
		if d.x == 0.0 {
			d.x = self.jiggle();
		}
		if d.y == 0.0 {
			d.y = self.jiggle();
		}
		if d.z == 0.0 {
			d.z = self.jiggle();
		}
		d
	}

	fn apply_charge(&mut self) {
		let n = self.positions.len();
		let strength = self.config.charge * self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let d = self.separate(self.positions[j] - self.positions[i]);
				let mut l = d.length_squared();
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				self.velocities[i] += d * (strength / l);
			}
		}
	}

	fn apply_center(&mut self) {
		let n = self.positions.len();
		if n == 0 {
			return;
		}
		let sum = self.positions.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
		let shift = sum * (1.0 / n as f64);
		for p in &mut self.positions {
			*p -= shift;
		}
	}

	fn apply_collide(&mut self) {
		let n = self.positions.len();
		let r = self.config.collide_radius;
		let reach = 2.0 * r;
		let strength = self.config.collide_strength;
		if r <= 0.0 || strength <= 0.0 {
			return;
		}
		for i in 0..n {
			let predicted_i = self.positions[i] + self.velocities[i];
			for j in (i + 1)..n {
				let predicted_j = self.positions[j] + self.velocities[j];
				let d = predicted_i - predicted_j;
				let l = d.length_squared();
				if l >= reach * reach {
					continue;
				}
				let d = self.separate(d);
				let l = d.length();
				let push = d * ((reach - l) / l * strength);
				// Equal radii split the correction evenly.
				self.velocities[i] += push * 0.5;
				self.velocities[j] -= push * 0.5;
			}
		}
	}

	fn apply_springs(&mut self) {
		let distance = self.config.link_distance;
		let strength = self.config.link_strength * self.alpha;
		for k in 0..self.springs.len() {
			let Spring {
				source,
				target,
				bias,
			} = self.springs[k];
			if source == target {
				continue;
			}
			let d = (self.positions[target] + self.velocities[target])
				- (self.positions[source] + self.velocities[source]);
			let d = self.separate(d);
			let l = d.length();
			let pull = d * ((l - distance) / l * strength);
			self.velocities[target] -= pull * bias;
			self.velocities[source] += pull * (1.0 - bias);
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for ((pos, vel), pin) in self
			.positions
			.iter_mut()
			.zip(self.velocities.iter_mut())
			.zip(&self.pins)
		{
			match pin {
				Some(p) => {
					*pos = *p;
					*vel = Vec3::ZERO;
				}
				None => {
					*vel = *vel * keep;
					*pos += *vel;
				}
			}
		}
	}
}

/// Fingerprint of a node/link set and mode; positions do not contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphIdentity(u64);

impl GraphIdentity {
	/// Identity of a view laid out in `mode`.
	pub fn of(view: &GraphView, mode: VisualizationMode) -> Self {
		let mut h = DefaultHasher::new();
		mode.hash(&mut h);
		view.focal.hash(&mut h);
		view.nodes.len().hash(&mut h);
		for node in &view.nodes {
			node.id.hash(&mut h);
		}
		for link in &view.links {
			(link.source_slot, link.target_slot).hash(&mut h);
		}
		Self(h.finish())
	}
}

/// Owns at most one run and rebuilds it on identity changes.
pub struct LayoutEngine {
	config: LayoutConfig,
	rng: StdRng,
	identity: Option<GraphIdentity>,
	run: Option<Simulation>,
}

impl LayoutEngine {
	/// Engine with no run.
	pub fn new(config: LayoutConfig, seed: u64) -> Self {
		Self {
			config,
			rng: StdRng::seed_from_u64(seed),
			identity: None,
			run: None,
		}
	}

	/// Lays out `view`, starting a fresh run when its identity differs from
	/// the current one. The previous run is cancelled first. Returns
	/// whether a new run started.
	pub fn load(
		&mut self,
		view: &GraphView,
		mode: VisualizationMode,
		observer: &mut dyn LayoutObserver,
	) -> bool {
		let identity = GraphIdentity::of(view, mode);
		if self.identity == Some(identity) {
			return false;
		}
		self.stop(observer);

		let springs = match mode {
			VisualizationMode::Dependency => {
				let pairs: Vec<(Slot, Slot)> = view
					.links
					.iter()
					.map(|l| (l.source_slot, l.target_slot))
					.collect();
				Spring::from_pairs(view.nodes.len(), &pairs)
			}
			VisualizationMode::Structural => Vec::new(),
		};
		let mut run = Simulation::new(
			view.nodes.len(),
			view.focal,
			springs,
			self.config.clone(),
			self.rng.r#gen(),
		);
		run.start();
		debug!("layout rebuilt for {} nodes in {mode:?} mode", view.nodes.len());
		self.identity = Some(identity);
		self.run = Some(run);
		true
	}

	/// Advances the current run, if any.
	pub fn tick(&mut self, dt: f64, observer: &mut dyn LayoutObserver) -> LayoutPhase {
		match self.run.as_mut() {
			Some(run) => run.tick(dt, observer),
			None => LayoutPhase::Uninitialized,
		}
	}

	/// Cancels and drops the current run.
	pub fn stop(&mut self, observer: &mut dyn LayoutObserver) {
		if let Some(mut run) = self.run.take() {
			run.cancel(observer);
		}
		self.identity = None;
	}

	/// Phase of the current run.
	pub fn phase(&self) -> LayoutPhase {
		self.run
			.as_ref()
			.map_or(LayoutPhase::Uninitialized, Simulation::phase)
	}

	/// Positions of the current run; empty without one.
	pub fn positions(&self) -> &[Vec3] {
		match self.run.as_ref() {
			Some(run) => run.positions(),
			None => &[],
		}
	}

	/// Whether the current run is still ticking.
	pub fn is_running(&self) -> bool {
		self.phase() == LayoutPhase::Running
	}
}
