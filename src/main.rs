use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;
use opencv::core::{Mat, Size};
use opencv::{highgui, imgproc};
use tracing::{info, warn};

mod config;
mod draw;
mod modules;

use crate::config::{ColorProfile, Config};
use crate::modules::filter::MinRadius;
use crate::modules::input::CaptureInput;
use crate::modules::output::VideoFileOutput;
use crate::modules::threshold::HsvRange;
use crate::modules::tracker::TrailTracker;
use crate::modules::{FilterModule, InputModule, OutputModule, ThresholdModule};

const WINDOW_NAME: &str = "colortrack";
// Esc, q
const QUIT_KEYS: [i32; 2] = [27, 113];

#[derive(Parser, Debug)]
#[command(
	name = "colortrack",
	about = "HSV colour-threshold ball tracking with trajectory trails"
)]
struct Args {
	/// Path to a video file; the default webcam is used when absent
	#[arg(short, long, value_name = "PATH")]
	video: Option<PathBuf>,
	/// Tracked-point history capacity per colour
	#[arg(short, long, default_value_t = 10)]
	buffer: usize,
	/// Write the annotated stream to this video file
	#[arg(short, long, value_name = "PATH")]
	output: Option<PathBuf>,
	/// Frame rate of the output video
	#[arg(short, long, default_value_t = 20.0)]
	fps: f64,
	/// FourCC codec of the output video
	#[arg(short, long, default_value = "mp4v")]
	codec: String,
	/// Colour profile file (TOML); built-in profiles are used when absent
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,
	/// Run without a display window
	#[arg(long)]
	headless: bool,
}

/// Detector plus trail state for one configured colour.
struct ColorTrack {
	name: String,
	threshold: HsvRange,
	tracker: TrailTracker,
}

impl ColorTrack {
	fn new(profile: &ColorProfile, capacity: usize) -> Self {
		Self {
			name: profile.name.clone(),
			threshold: HsvRange::new(profile),
			tracker: TrailTracker::new(capacity),
		}
	}

	/// One per-frame step for this colour: detect, filter, track, draw.
	fn update(&mut self, hsv: &Mat, frame: &mut Mat, filter: &mut MinRadius) -> Result<()> {
		match self.threshold.run(hsv)? {
			Some(detection) if filter.run(&detection) => {
				draw::detection(frame, &detection)?;
				self.tracker.push(detection.centroid);
			}
			// a blob this small is noise: drop the whole history
			Some(_) => self.tracker.reset(),
			None => {}
		}
		self.tracker.update_direction();
		draw::trail(frame, &self.tracker)
	}
}

fn main() -> Result<()> {
	tracing_subscriber::fmt().with_target(false).init();
	let args = Args::parse();
	let config = Config::load(args.config.as_deref())?;
	run(&args, &config)
}

fn run(args: &Args, config: &Config) -> Result<()> {
	let mut input = CaptureInput::open(args.video.as_deref())?;
	let (src_width, src_height) = input.frame_size()?;
	ensure!(
		src_width > 0 && src_height > 0,
		"capture reports an empty frame size"
	);

	let width = config.video.resize_width;
	let height = (width as f64 * src_height as f64 / src_width as f64).round() as i32;
	let size = Size::new(width, height);

	let mut writer = match args.output.as_deref() {
		Some(path) => Some(VideoFileOutput::create(path, &args.codec, args.fps, size)?),
		None => None,
	};

	let mut filter = MinRadius::new(config.tracking.min_radius);
	let mut tracks: Vec<ColorTrack> = config
		.colors
		.iter()
		.map(|profile| ColorTrack::new(profile, args.buffer))
		.collect();
	info!(
		"tracking {} colour(s) with a {}-point trail",
		tracks.len(),
		args.buffer
	);

	let mut display_enabled = !args.headless;
	if display_enabled {
		if let Err(err) = highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE) {
			warn!("failed to open a display window: {err}; continuing headless");
			display_enabled = false;
		}
	}

	let mut frame = Mat::default();
	let mut hsv = Mat::default();
	let mut frames: u64 = 0;

	loop {
		let Some(raw) = input.run()? else {
			break;
		};
		imgproc::resize(&raw, &mut frame, size, 0., 0., imgproc::INTER_AREA)?;
		imgproc::cvt_color(&frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;

		for (row, track) in tracks.iter_mut().enumerate() {
			track.update(&hsv, &mut frame, &mut filter)?;
			draw::direction_overlay(&mut frame, row, &track.name, &track.tracker)?;
		}

		if let Some(writer) = writer.as_mut() {
			writer.run(&frame)?;
		}
		if display_enabled {
			highgui::imshow(WINDOW_NAME, &frame)?;
			if QUIT_KEYS.contains(&highgui::wait_key(1)?) {
				break;
			}
		}
		frames += 1;
	}

	info!("processed {frames} frame(s)");
	input.release()?;
	if let Some(writer) = writer.as_mut() {
		writer.release()?;
	}
	if display_enabled {
		highgui::destroy_all_windows()?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use opencv::core::{Point, Scalar, CV_8UC3};

	fn blank(width: i32, height: i32) -> Mat {
		Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::new(0., 0., 0., 0.))
			.unwrap()
	}

	fn orange() -> ColorProfile {
		ColorProfile {
			name: "orange".into(),
			lower: [0, 130, 170],
			upper: [255, 255, 255],
		}
	}

	#[test]
	fn frames_without_matching_colour_leave_trails_empty() {
		let config = Config::default();
		let mut filter = MinRadius::new(config.tracking.min_radius);
		let mut tracks: Vec<ColorTrack> = config
			.colors
			.iter()
			.map(|profile| ColorTrack::new(profile, 10))
			.collect();

		let hsv = blank(160, 120);
		let mut frame = blank(160, 120);
		for _ in 0..20 {
			for track in tracks.iter_mut() {
				track.update(&hsv, &mut frame, &mut filter).unwrap();
			}
		}
		assert!(tracks.iter().all(|track| track.tracker.is_empty()));
	}

	#[test]
	fn noise_detection_clears_the_trail() {
		let mut filter = MinRadius::new(10.);
		let mut track = ColorTrack::new(&orange(), 10);
		let mut frame = blank(200, 200);

		let mut hsv = blank(200, 200);
		imgproc::circle(
			&mut hsv,
			Point::new(100, 100),
			30,
			Scalar::new(10., 200., 220., 0.),
			-1,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
		for _ in 0..5 {
			track.update(&hsv, &mut frame, &mut filter).unwrap();
		}
		assert_eq!(track.tracker.points().len(), 5);

		// shrink the blob below the noise floor
		let mut hsv = blank(200, 200);
		imgproc::circle(
			&mut hsv,
			Point::new(100, 100),
			6,
			Scalar::new(10., 200., 220., 0.),
			-1,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
		track.update(&hsv, &mut frame, &mut filter).unwrap();
		assert!(track.tracker.is_empty());
	}
}
