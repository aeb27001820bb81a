//! Frame reader implementations.
//!
//! `FfmpegReader` decodes single frames by index through an ffmpeg
//! subprocess; `ImageDirReader` serves pre-extracted numbered frames from
//! a directory. Both report any read failure as end-of-stream, which is
//! how the scan phases expect exhaustion to be signalled.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use thiserror::Error;

use crate::scanner::frame::Frame;
use crate::scanner::reader::FrameReader;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("video file not found: {0}")]
    Missing(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffprobe could not report the video dimensions: {0}")]
    Probe(String),
}

/// Random-access decoder backed by an ffmpeg subprocess.
///
/// Each read runs ffmpeg with a frame-select filter and captures one raw
/// BGR24 frame on stdout. Dimensions are probed once at open so the raw
/// bytes can be wrapped without per-read negotiation.
pub struct FfmpegReader {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl FfmpegReader {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReaderError> {
        let path = path.into();
        if !path.is_file() {
            return Err(ReaderError::Missing(path));
        }
        let (width, height) = probe_dimensions(&path)?;
        debug!("opened {} ({width}x{height})", path.display());
        Ok(Self {
            path,
            width,
            height,
        })
    }
}

impl FrameReader for FfmpegReader {
    fn read_frame(&mut self, index: u64) -> Option<Frame> {
        let select = format!("select=eq(n\\,{index})");
        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&self.path)
            .args([
                "-vf", select.as_str(),
                "-vsync", "vfr",
                "-frames:v", "1",
                "-f", "rawvideo",
                "-pix_fmt", "bgr24",
                "pipe:1",
            ])
            .output()
            .inspect_err(|err| warn!("failed to spawn ffmpeg: {err}"))
            .ok()?;

        let expected = (self.width * self.height * 3) as usize;
        if !output.status.success() || output.stdout.len() != expected {
            // past the last frame ffmpeg emits nothing
            return None;
        }
        Some(Frame::new(self.width, self.height, output.stdout, index))
    }
}

fn probe_dimensions(path: &Path) -> Result<(u32, u32), ReaderError> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .output()?;
    if !output.status.success() {
        return Err(ReaderError::Probe(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let mut parts = text.trim().split(',');
    let parse = |part: Option<&str>| {
        part.and_then(|v| v.trim().parse::<u32>().ok())
            .ok_or_else(|| ReaderError::Probe(format!("unexpected ffprobe output `{}`", text.trim())))
    };
    let width = parse(parts.next())?;
    let height = parse(parts.next())?;
    Ok((width, height))
}

/// Reads frames that were extracted ahead of time, one image per frame,
/// named `{index:06}.png` (or `.jpg`) under a single directory.
pub struct ImageDirReader {
    dir: PathBuf,
}

impl ImageDirReader {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ReaderError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ReaderError::Missing(dir));
        }
        Ok(Self { dir })
    }

    fn frame_path(&self, index: u64) -> Option<PathBuf> {
        ["png", "jpg"]
            .iter()
            .map(|ext| self.dir.join(format!("{index:06}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl FrameReader for ImageDirReader {
    fn read_frame(&mut self, index: u64) -> Option<Frame> {
        let path = self.frame_path(index)?;
        let image = image::open(&path)
            .inspect_err(|err| warn!("failed to decode {}: {err}", path.display()))
            .ok()?
            .to_rgb8();
        let (width, height) = image.dimensions();
        Some(Frame::from_rgb(width, height, image.into_raw(), index))
    }
}
