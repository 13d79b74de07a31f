//! Tunables for every stage of the pipeline.
//!
//! Every struct carries its documented defaults through [`Default`] and
//! deserializes with `#[serde(default)]`, so a host can override a subset:
//!
//! ```json
//! { "layout": { "charge": -80.0, "maxDurationSecs": 8.0 } }
//! ```

use serde::Deserialize;

use super::error::GalaxyError;

/// File extensions considered code when qualifying tree entries.
pub const CODE_EXTENSIONS: &[&str] = &[
	"js", "ts", "tsx", "jsx", "py", "java", "go", "rs", "cpp", "c", "rb", "php", "swift", "kt",
	"css", "html",
];

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyConfig {
	/// Graph model builder settings.
	pub builder: BuilderConfig,
	/// Link synthesizer settings.
	pub links: LinkConfig,
	/// Layout engine settings.
	pub layout: LayoutConfig,
	/// Scene and camera settings.
	pub scene: SceneConfig,
}

impl GalaxyConfig {
	/// Parses a (possibly partial) JSON override on top of the defaults.
	pub fn from_json(raw: &str) -> Result<Self, GalaxyError> {
		Ok(serde_json::from_str(raw)?)
	}
}

/// Entry qualification and node derivation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
	/// Entries larger than this many bytes are skipped.
	pub max_file_size: u64,
	/// At most this many qualifying entries become nodes.
	pub max_files: usize,
	/// Average characters per line for line-count estimation.
	pub chars_per_line: f64,
	/// Lowercase extensions that qualify as code.
	pub code_extensions: Vec<String>,
}

impl Default for BuilderConfig {
	fn default() -> Self {
		Self {
			max_file_size: 100_000,
			max_files: 500,
			chars_per_line: 40.0,
			code_extensions: CODE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
		}
	}
}

/// Structural link synthesis.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkConfig {
	/// Probability that a node with siblings gets one sibling edge.
	pub structural_probability: f64,
}

impl Default for LinkConfig {
	fn default() -> Self {
		Self {
			structural_probability: 0.3,
		}
	}
}

/// Physics relaxation parameters, in simulation units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	/// Many-body strength; negative repels.
	pub charge: f64,
	/// Minimum distance used by the many-body force, avoiding singularities.
	pub distance_min: f64,
	/// Collision radius per node.
	pub collide_radius: f64,
	/// Collision strength in `[0, 1]`.
	pub collide_strength: f64,
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Link spring strength.
	pub link_strength: f64,
	/// Starting temperature.
	pub alpha: f64,
	/// The run stops once alpha falls below this.
	pub alpha_min: f64,
	/// Per-tick decay rate of alpha toward zero.
	pub alpha_decay: f64,
	/// Fraction of velocity removed each tick.
	pub velocity_decay: f64,
	/// Spacing of the phyllotaxis seed layout.
	pub initial_radius: f64,
	/// Wall-clock ceiling for one run, in seconds.
	pub max_duration_secs: f64,
}

impl LayoutConfig {
	/// Decay that takes alpha from 1 to `alpha_min` in about 300 ticks.
	pub fn default_alpha_decay(alpha_min: f64) -> f64 {
		1.0 - alpha_min.powf(1.0 / 300.0)
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge: -50.0,
			distance_min: 1.0,
			collide_radius: 10.0,
			collide_strength: 1.0,
			link_distance: 100.0,
			link_strength: 0.5,
			alpha: 1.0,
			alpha_min,
			alpha_decay: Self::default_alpha_decay(alpha_min),
			velocity_decay: 0.4,
			initial_radius: 10.0,
			max_duration_secs: 5.0,
		}
	}
}

/// Body sizing, emphasis and camera defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
	/// Radius of the focal body.
	pub star_size: f64,
	/// Halo radius as a multiple of the focal body radius.
	pub halo_scale: f64,
	/// Peak halo growth over one pulse, as a fraction of its radius.
	pub halo_pulse: f64,
	/// Lower bound on ordinary body radius.
	pub min_body_size: f64,
	/// Multiplier on `ln(loc + 1)` for ordinary body radius.
	pub body_size_factor: f64,
	/// Resting emphasis of ordinary bodies.
	pub emphasis: f64,
	/// Resting emphasis of the focal body.
	pub star_emphasis: f64,
	/// Emphasis of a hovered ordinary body.
	pub hover_emphasis: f64,
	/// Emphasis of the hovered focal body.
	pub star_hover_emphasis: f64,
	/// Initial camera distance along +z.
	pub camera_distance: f64,
	/// Vertical field of view in degrees.
	pub fov_degrees: f64,
	/// Near clip distance.
	pub near: f64,
	/// Far clip distance.
	pub far: f64,
	/// Closest the camera may dolly to its target.
	pub min_distance: f64,
	/// Farthest the camera may dolly from its target.
	pub max_distance: f64,
	/// Radians of orbit per pixel of pointer drag.
	pub rotate_speed: f64,
	/// Background stars drawn behind the scene.
	pub background_stars: usize,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			star_size: 15.0,
			halo_scale: 1.5,
			halo_pulse: 0.15,
			min_body_size: 4.0,
			body_size_factor: 3.0,
			emphasis: 0.7,
			star_emphasis: 1.0,
			hover_emphasis: 1.2,
			star_hover_emphasis: 1.5,
			camera_distance: 500.0,
			fov_degrees: 75.0,
			near: 0.1,
			far: 5000.0,
			min_distance: 50.0,
			max_distance: 3000.0,
			rotate_speed: 0.005,
			background_stars: 400,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_alpha_decay_reaches_alpha_min_in_300_ticks() {
		let cfg = LayoutConfig::default();
		let alpha = (0..300).fold(cfg.alpha, |a, _| a + (0.0 - a) * cfg.alpha_decay);
		assert!((alpha - cfg.alpha_min).abs() < 1e-9);
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let cfg = GalaxyConfig::from_json(r#"{"layout": {"charge": -80.0}}"#).unwrap();
		assert_eq!(cfg.layout.charge, -80.0);
		assert_eq!(cfg.layout.collide_radius, 10.0);
		assert_eq!(cfg.builder.max_files, 500);
	}

	#[test]
	fn malformed_override_is_an_error() {
		assert!(GalaxyConfig::from_json("{ layout: ").is_err());
	}
}
