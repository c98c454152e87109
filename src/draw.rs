use anyhow::Result;
use itertools::Itertools;
use opencv::core::{Mat, Point, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use crate::modules::tracker::{trail_thickness, TrailTracker};
use crate::modules::Detection;

fn circle_color() -> Scalar {
	Scalar::new(0., 255., 255., 0.)
}

fn marker_color() -> Scalar {
	Scalar::new(0., 0., 255., 0.)
}

/// Enclosing circle plus a filled centroid marker for one accepted detection.
pub fn detection(frame: &mut Mat, detection: &Detection) -> Result<()> {
	imgproc::circle(
		frame,
		Point::new(detection.center.x as i32, detection.center.y as i32),
		detection.radius as i32,
		circle_color(),
		2,
		imgproc::LINE_8,
		0,
	)?;
	imgproc::circle(
		frame,
		detection.centroid,
		5,
		marker_color(),
		-1,
		imgproc::LINE_8,
		0,
	)?;
	Ok(())
}

/// Line segments between adjacent trail points, thinning out as they age.
pub fn trail(frame: &mut Mat, tracker: &TrailTracker) -> Result<()> {
	for (i, (from, to)) in tracker.points().iter().tuple_windows().enumerate() {
		let thickness = trail_thickness(tracker.capacity(), i + 1);
		imgproc::line(
			frame,
			*from,
			*to,
			marker_color(),
			thickness,
			imgproc::LINE_8,
			0,
		)?;
	}
	Ok(())
}

/// One direction row at the top of the frame and one dx/dy debug row at the
/// bottom, stacked per colour.
pub fn direction_overlay(
	frame: &mut Mat,
	row: usize,
	name: &str,
	tracker: &TrailTracker,
) -> Result<()> {
	let rows = frame.rows();
	imgproc::put_text(
		frame,
		&format!("{}: {}", name, tracker.direction()),
		Point::new(10, 30 + 25 * row as i32),
		imgproc::FONT_HERSHEY_SIMPLEX,
		0.65,
		marker_color(),
		3,
		imgproc::LINE_8,
		false,
	)?;
	imgproc::put_text(
		frame,
		&format!("{} dx: {}, dy: {}", name, tracker.dx(), tracker.dy()),
		Point::new(10, rows - 10 - 15 * row as i32),
		imgproc::FONT_HERSHEY_SIMPLEX,
		0.35,
		marker_color(),
		1,
		imgproc::LINE_8,
		false,
	)?;
	Ok(())
}
