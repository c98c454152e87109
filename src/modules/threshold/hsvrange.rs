use anyhow::Result;
use opencv::core::{self, Mat, Point, Point2f, Scalar, Vector};
use opencv::imgproc;

use crate::config::ColorProfile;
use crate::modules::{Detection, ThresholdModule};

/// Erode/dilate passes applied to the binary mask before contour extraction.
const MORPH_ITERATIONS: i32 = 2;

/// Locates the largest blob whose HSV value falls inside one colour profile.
pub struct HsvRange {
	lower: Scalar,
	upper: Scalar,
}

impl HsvRange {
	pub fn new(profile: &ColorProfile) -> Self {
		Self {
			lower: channel_scalar(profile.lower),
			upper: channel_scalar(profile.upper),
		}
	}
}

impl ThresholdModule for HsvRange {
	fn run(&mut self, hsv: &Mat) -> Result<Option<Detection>> {
		let mut mask = Mat::default();
		core::in_range(hsv, &self.lower, &self.upper, &mut mask)?;

		// an empty kernel selects the 3x3 rectangular default
		let kernel = Mat::default();
		let border = imgproc::morphology_default_border_value()?;
		let mut eroded = Mat::default();
		imgproc::erode(
			&mask,
			&mut eroded,
			&kernel,
			Point::new(-1, -1),
			MORPH_ITERATIONS,
			core::BORDER_CONSTANT,
			border,
		)?;
		let mut cleaned = Mat::default();
		imgproc::dilate(
			&eroded,
			&mut cleaned,
			&kernel,
			Point::new(-1, -1),
			MORPH_ITERATIONS,
			core::BORDER_CONSTANT,
			border,
		)?;

		let mut contours = Vector::<Vector<Point>>::new();
		imgproc::find_contours(
			&cleaned,
			&mut contours,
			imgproc::RETR_EXTERNAL,
			imgproc::CHAIN_APPROX_SIMPLE,
			Point::new(0, 0),
		)?;

		let mut largest: Option<(f64, Vector<Point>)> = None;
		for contour in contours.iter() {
			let area = imgproc::contour_area(&contour, false)?;
			if largest.as_ref().map_or(true, |(best, _)| area > *best) {
				largest = Some((area, contour));
			}
		}
		let Some((_, contour)) = largest else {
			return Ok(None);
		};

		let mut center = Point2f::default();
		let mut radius = 0f32;
		imgproc::min_enclosing_circle(&contour, &mut center, &mut radius)?;

		let moments = imgproc::moments(&contour, false)?;
		if moments.m00 == 0. {
			return Ok(None);
		}
		let centroid = Point::new(
			(moments.m10 / moments.m00) as i32,
			(moments.m01 / moments.m00) as i32,
		);

		Ok(Some(Detection {
			centroid,
			center,
			radius,
		}))
	}
}

fn channel_scalar(channels: [u8; 3]) -> Scalar {
	Scalar::new(
		channels[0] as f64,
		channels[1] as f64,
		channels[2] as f64,
		0.,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use opencv::core::CV_8UC3;

	fn profile() -> ColorProfile {
		ColorProfile {
			name: "orange".into(),
			lower: [0, 130, 170],
			upper: [255, 255, 255],
		}
	}

	fn hsv_frame(width: i32, height: i32) -> Mat {
		Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::new(0., 0., 0., 0.))
			.unwrap()
	}

	fn paint_blob(hsv: &mut Mat, center: Point, radius: i32, value: Scalar) {
		imgproc::circle(hsv, center, radius, value, -1, imgproc::LINE_8, 0).unwrap();
	}

	#[test]
	fn blob_centroid_and_radius_are_recovered() {
		let mut hsv = hsv_frame(240, 180);
		paint_blob(
			&mut hsv,
			Point::new(130, 90),
			40,
			Scalar::new(10., 200., 220., 0.),
		);

		let detection = HsvRange::new(&profile())
			.run(&hsv)
			.unwrap()
			.expect("blob inside the profile bounds");
		assert!((detection.centroid.x - 130).abs() <= 1);
		assert!((detection.centroid.y - 90).abs() <= 1);
		assert!((detection.radius - 40.).abs() <= 40. * 0.05);
	}

	#[test]
	fn empty_frame_yields_no_detection() {
		let hsv = hsv_frame(120, 120);
		assert!(HsvRange::new(&profile()).run(&hsv).unwrap().is_none());
	}

	#[test]
	fn off_range_blob_is_ignored() {
		let mut hsv = hsv_frame(120, 120);
		// saturation below the profile's lower bound
		paint_blob(
			&mut hsv,
			Point::new(60, 60),
			30,
			Scalar::new(10., 40., 220., 0.),
		);
		assert!(HsvRange::new(&profile()).run(&hsv).unwrap().is_none());
	}

	#[test]
	fn largest_blob_wins_when_several_match() {
		let mut hsv = hsv_frame(240, 120);
		paint_blob(
			&mut hsv,
			Point::new(60, 60),
			15,
			Scalar::new(10., 200., 220., 0.),
		);
		paint_blob(
			&mut hsv,
			Point::new(180, 60),
			35,
			Scalar::new(10., 200., 220., 0.),
		);

		let detection = HsvRange::new(&profile())
			.run(&hsv)
			.unwrap()
			.expect("two blobs inside the profile bounds");
		assert!((detection.centroid.x - 180).abs() <= 1);
		assert!((detection.centroid.y - 60).abs() <= 1);
	}

	#[test]
	fn small_blob_radius_stays_below_the_noise_floor() {
		let mut hsv = hsv_frame(120, 120);
		paint_blob(
			&mut hsv,
			Point::new(60, 60),
			6,
			Scalar::new(10., 200., 220., 0.),
		);
		let detection = HsvRange::new(&profile())
			.run(&hsv)
			.unwrap()
			.expect("a small blob is still a detection");
		assert!(detection.radius <= 10.);
	}
}
