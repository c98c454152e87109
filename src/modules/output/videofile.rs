use std::path::Path;

use anyhow::{ensure, Context, Result};
use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::VideoWriter;
use tracing::info;

use crate::modules::OutputModule;

/// Appends annotated frames to a video file.
pub struct VideoFileOutput {
	writer: VideoWriter,
}

impl VideoFileOutput {
	pub fn create(path: &Path, codec: &str, fps: f64, size: Size) -> Result<Self> {
		let chars: Vec<char> = codec.chars().collect();
		ensure!(
			chars.len() == 4,
			"codec {codec:?} is not a four-character code"
		);
		let fourcc = VideoWriter::fourcc(chars[0], chars[1], chars[2], chars[3])?;
		let path = path
			.to_str()
			.with_context(|| format!("output path {} is not valid UTF-8", path.display()))?;
		let writer = VideoWriter::new(path, fourcc, fps, size, true)
			.with_context(|| format!("failed to create a video writer for {path}"))?;
		ensure!(
			writer.is_opened()?,
			"video writer rejected codec {codec:?} for {path}"
		);
		info!("writing annotated video to {path} at {fps} fps");
		Ok(Self { writer })
	}

	pub fn release(&mut self) -> Result<()> {
		self.writer.release()?;
		Ok(())
	}
}

impl OutputModule for VideoFileOutput {
	fn run(&mut self, frame: &Mat) -> Result<()> {
		self.writer.write(frame)?;
		Ok(())
	}
}
