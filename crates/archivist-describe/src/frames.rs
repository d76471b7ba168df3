// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Video frame sampling and extraction.
//!
//! [`FfmpegFrames`] shells out to `ffprobe` to count frames and to `ffmpeg`
//! to decode each sampled frame as JPEG.

use std::io::Write;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use archivist_core::ArchivistError;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Pick `count` evenly spaced frame indices out of `total`.
///
/// Index `i` is `round(i * (total - 1) / (count - 1))`, clamped to the last
/// frame. `total == 0` yields nothing; `count == 1` yields the first frame.
/// Short videos repeat indices.
pub fn sample_indices(total: u64, count: usize) -> Vec<u64> {
    if total == 0 || count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }
    let last = total - 1;
    let steps = (count - 1) as f64;
    (0..count)
        .map(|i| {
            let idx = (i as f64 * last as f64 / steps).round() as u64;
            idx.min(last)
        })
        .collect()
}

/// Source of decoded JPEG frames for a video blob.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Decode up to `count` sampled frames. Frames that fail to decode are
    /// skipped, so the result may be shorter (or empty).
    ///
    /// Returns [`ArchivistError::Cancelled`] as soon as `cancel` fires.
    async fn frames(
        &self,
        video: &[u8],
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<u8>>, ArchivistError>;
}

/// Runs `command` to completion, killing the child if `cancel` fires first
/// or the returned future is dropped.
async fn run_until_cancelled(
    mut command: Command,
    cancel: &CancellationToken,
) -> Result<std::io::Result<Output>, ArchivistError> {
    command.kill_on_drop(true);
    tokio::select! {
        _ = cancel.cancelled() => Err(ArchivistError::Cancelled),
        output = command.output() => Ok(output),
    }
}

/// Frame source backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegFrames {
    ffprobe: String,
    ffmpeg: String,
}

impl Default for FfmpegFrames {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".into(),
            ffmpeg: "ffmpeg".into(),
        }
    }
}

impl FfmpegFrames {
    /// Use explicit binary paths.
    pub fn new(ffprobe: impl Into<String>, ffmpeg: impl Into<String>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
        }
    }

    async fn count_frames(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, ArchivistError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_read_packets",
                "-of",
                "default=nokey=1:noprint_wrappers=1",
            ])
            .arg(path);
        let output = run_until_cancelled(command, cancel)
            .await?
            .map_err(|e| ArchivistError::DescriptionUnavailable {
                message: format!("failed to run {}: {e}", self.ffprobe),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            return Err(ArchivistError::DescriptionUnavailable {
                message: format!(
                    "ffprobe could not read video: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                source: None,
            });
        }

        // An unreadable count means no video stream.
        Ok(String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .unwrap_or(0))
    }

    /// `Ok(None)` when the frame fails to decode.
    async fn decode_frame(
        &self,
        path: &Path,
        index: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<u8>>, ArchivistError> {
        let select = format!("select=eq(n\\,{index})");
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-vf",
                select.as_str(),
                "-vsync",
                "0",
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-c:v",
                "mjpeg",
                "-",
            ]);
        let output = run_until_cancelled(command, cancel).await?;

        let frame = match output {
            Ok(out) if out.status.success() && !out.stdout.is_empty() => Some(out.stdout),
            Ok(out) => {
                warn!(
                    index,
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "frame failed to decode, skipping"
                );
                None
            }
            Err(e) => {
                warn!(index, error = %e, "failed to run ffmpeg, skipping frame");
                None
            }
        };
        Ok(frame)
    }
}

#[async_trait]
impl FrameSource for FfmpegFrames {
    async fn frames(
        &self,
        video: &[u8],
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<u8>>, ArchivistError> {
        if cancel.is_cancelled() {
            return Err(ArchivistError::Cancelled);
        }
        let mut file = tempfile::NamedTempFile::new().map_err(|e| {
            ArchivistError::DescriptionUnavailable {
                message: format!("failed to create temp file: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        file.write_all(video)
            .and_then(|_| file.flush())
            .map_err(|e| ArchivistError::DescriptionUnavailable {
                message: format!("failed to write temp file: {e}"),
                source: Some(Box::new(e)),
            })?;

        let total = self.count_frames(file.path(), cancel).await?;
        let indices = sample_indices(total, count);
        debug!(total, ?indices, "sampling video frames");

        let mut frames = Vec::with_capacity(indices.len());
        for index in indices {
            if let Some(jpeg) = self.decode_frame(file.path(), index, cancel).await? {
                frames.push(jpeg);
            }
        }
        Ok(frames)
    }
}
