pub mod filter;
pub mod input;
pub mod output;
pub mod threshold;
pub mod tracker;

use anyhow::Result;
use opencv::core::{Mat, Point, Point2f};

/// One colour blob located in a single frame.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
	/// Image-moment centroid, the point fed into the trail buffer.
	pub centroid: Point,
	/// Centre of the minimal enclosing circle.
	pub center: Point2f,
	/// Radius of the minimal enclosing circle, in pixels.
	pub radius: f32,
}

pub trait InputModule {
	/// Produces the next raw frame, or `None` once the stream is exhausted.
	fn run(&mut self) -> Result<Option<Mat>>;
}

pub trait ThresholdModule {
	/// Locates the most prominent blob of this module's colour in an HSV frame.
	fn run(&mut self, hsv: &Mat) -> Result<Option<Detection>>;
}

pub trait FilterModule {
	/// Decides whether a detection is worth tracking.
	fn run(&mut self, detection: &Detection) -> bool;
}

pub trait OutputModule {
	/// Consumes one annotated frame.
	fn run(&mut self, frame: &Mat) -> Result<()>;
}
