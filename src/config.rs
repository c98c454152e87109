use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
	pub video: VideoConfig,
	pub tracking: TrackingConfig,
	pub colors: Vec<ColorProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
	/// Width every frame is resized to before processing; height follows
	/// the source aspect ratio.
	pub resize_width: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
	/// Enclosing-circle radius at or below which a detection counts as noise.
	pub min_radius: f64,
}

/// Inclusive HSV bounds for one tracked colour.
#[derive(Debug, Clone, Deserialize)]
pub struct ColorProfile {
	pub name: String,
	pub lower: [u8; 3],
	pub upper: [u8; 3],
}

impl Default for Config {
	fn default() -> Self {
		Self {
			video: VideoConfig::default(),
			tracking: TrackingConfig::default(),
			colors: default_profiles(),
		}
	}
}

impl Default for VideoConfig {
	fn default() -> Self {
		Self { resize_width: 600 }
	}
}

impl Default for TrackingConfig {
	fn default() -> Self {
		Self { min_radius: 10. }
	}
}

impl Config {
	/// Reads a TOML profile file, or falls back to the built-in profiles
	/// when no path is given.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};
		let raw = fs::read_to_string(path)
			.with_context(|| format!("failed to read config {}", path.display()))?;
		let config: Self = toml::from_str(&raw)
			.with_context(|| format!("failed to parse config {}", path.display()))?;
		ensure!(
			!config.colors.is_empty(),
			"config {} defines no colour profiles",
			path.display()
		);
		Ok(config)
	}
}

fn default_profiles() -> Vec<ColorProfile> {
	vec![
		ColorProfile {
			name: "orange".into(),
			lower: [0, 130, 170],
			upper: [255, 255, 255],
		},
		ColorProfile {
			name: "yellow".into(),
			lower: [20, 65, 140],
			upper: [50, 255, 255],
		},
		ColorProfile {
			name: "green".into(),
			lower: [40, 25, 70],
			upper: [80, 255, 255],
		},
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_enumerate_the_builtin_profiles() {
		let config = Config::default();
		assert_eq!(config.video.resize_width, 600);
		assert_eq!(config.tracking.min_radius, 10.);
		let names: Vec<&str> = config.colors.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["orange", "yellow", "green"]);
	}

	#[test]
	fn empty_document_falls_back_to_defaults() {
		let config: Config = toml::from_str("").unwrap();
		assert_eq!(config.colors.len(), 3);
		assert_eq!(config.video.resize_width, 600);
	}

	#[test]
	fn profile_file_overrides_the_builtins() {
		let config: Config = toml::from_str(
			r#"
			[video]
			resize_width = 800

			[[colors]]
			name = "red"
			lower = [0, 185, 135]
			upper = [255, 255, 255]
			"#,
		)
		.unwrap();
		assert_eq!(config.video.resize_width, 800);
		assert_eq!(config.tracking.min_radius, 10.);
		assert_eq!(config.colors.len(), 1);
		assert_eq!(config.colors[0].name, "red");
		assert_eq!(config.colors[0].lower, [0, 185, 135]);
	}
}
