use std::collections::VecDeque;

use opencv::core::Point;

/// Samples between the endpoints of the displacement window.
pub const DIRECTION_WINDOW: usize = 10;
/// Per-axis displacement, in pixels, below which movement is ignored.
pub const MOVE_THRESHOLD: i32 = 20;

/// Recency-ordered position history for one tracked colour, newest at the
/// front, plus the last computed motion direction.
pub struct TrailTracker {
	points: VecDeque<Point>,
	capacity: usize,
	dx: i32,
	dy: i32,
	direction: String,
}

impl TrailTracker {
	pub fn new(capacity: usize) -> Self {
		Self {
			points: VecDeque::with_capacity(capacity),
			capacity,
			dx: 0,
			dy: 0,
			direction: String::new(),
		}
	}

	pub fn push(&mut self, point: Point) {
		self.points.push_front(point);
		self.points.truncate(self.capacity);
	}

	/// Hard reset on a noise detection: every point is discarded, the last
	/// computed direction survives until enough new history accumulates.
	pub fn reset(&mut self) {
		self.points.clear();
	}

	pub fn points(&self) -> &VecDeque<Point> {
		&self.points
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn dx(&self) -> i32 {
		self.dx
	}

	pub fn dy(&self) -> i32 {
		self.dy
	}

	pub fn direction(&self) -> &str {
		&self.direction
	}

	/// Reclassifies the motion direction from the displacement between the
	/// newest point and the one `DIRECTION_WINDOW` samples back. With less
	/// history than that, the previous label is retained.
	pub fn update_direction(&mut self) {
		if self.points.len() <= DIRECTION_WINDOW {
			return;
		}
		let newest = self.points[0];
		let past = self.points[DIRECTION_WINDOW];
		self.dx = newest.x - past.x;
		self.dy = newest.y - past.y;
		self.direction = classify(self.dx, self.dy);
	}
}

/// Coarse compass label for a displacement. Either axis only counts when its
/// magnitude exceeds `MOVE_THRESHOLD`; both axes compose "North-East" style.
pub fn classify(dx: i32, dy: i32) -> String {
	let horizontal = if dx.abs() > MOVE_THRESHOLD {
		if dx > 0 {
			"East"
		} else {
			"West"
		}
	} else {
		""
	};
	let vertical = if dy.abs() > MOVE_THRESHOLD {
		if dy > 0 {
			"North"
		} else {
			"South"
		}
	} else {
		""
	};
	match (vertical.is_empty(), horizontal.is_empty()) {
		(false, false) => format!("{vertical}-{horizontal}"),
		(false, true) => vertical.to_owned(),
		(true, false) => horizontal.to_owned(),
		(true, true) => String::new(),
	}
}

/// Line thickness for the trail segment `age` pairs behind the newest point.
pub fn trail_thickness(capacity: usize, age: usize) -> i32 {
	((capacity as f64 / (age as f64 + 1.)).sqrt() * 2.5).round() as i32
}
