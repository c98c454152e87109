use crate::modules::{Detection, FilterModule};

/// Rejects detections whose enclosing circle is small enough to be noise.
pub struct MinRadius {
	min: f64,
}

impl MinRadius {
	pub fn new(min: f64) -> Self {
		Self { min }
	}
}

impl FilterModule for MinRadius {
	fn run(&mut self, detection: &Detection) -> bool {
		detection.radius as f64 > self.min
	}
}
