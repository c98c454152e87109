use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::info;

use crate::modules::InputModule;

/// Grace period before the first read so a webcam sensor can settle.
const WARMUP: Duration = Duration::from_secs(2);

pub struct CaptureInput {
	cap: VideoCapture,
}

impl CaptureInput {
	/// Opens the given video file, or the default webcam when `video` is
	/// absent. A source that cannot be opened is a hard error.
	pub fn open(video: Option<&Path>) -> Result<Self> {
		let cap = match video {
			Some(path) => {
				let path = path
					.to_str()
					.with_context(|| format!("video path {} is not valid UTF-8", path.display()))?;
				let cap = VideoCapture::from_file(path, videoio::CAP_ANY)
					.with_context(|| format!("failed to open video file {path}"))?;
				if !cap.is_opened()? {
					bail!("failed to open video file {path}");
				}
				info!("reading from {path}");
				cap
			}
			None => {
				let cap = VideoCapture::new(0, videoio::CAP_ANY)
					.context("failed to open the default webcam")?;
				if !cap.is_opened()? {
					bail!("failed to open the default webcam");
				}
				info!("reading from the default webcam");
				thread::sleep(WARMUP);
				cap
			}
		};
		Ok(Self { cap })
	}

	pub fn frame_size(&self) -> Result<(i32, i32)> {
		let width = self.cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
		let height = self.cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
		Ok((width, height))
	}

	pub fn release(&mut self) -> Result<()> {
		self.cap.release()?;
		Ok(())
	}
}

impl InputModule for CaptureInput {
	fn run(&mut self) -> Result<Option<Mat>> {
		let mut frame = Mat::default();
		if !self.cap.read(&mut frame)? || frame.empty() {
			return Ok(None);
		}
		Ok(Some(frame))
	}
}
