//! Frame I/O seams.
//!
//! Both passes talk to video through two small traits over ordered RGB
//! frames, so tests run against in-memory buffers and production runs
//! against raw RGB24 streams (ffmpeg `-f rawvideo -pix_fmt rgb24`) or PNG
//! sequence directories. A raw stream is headerless, so file-backed
//! implementations carry a JSON sidecar with the stream metadata.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use matchlight_common::error::{MatchlightError, MatchlightResult};
use serde::{Deserialize, Serialize};

/// Stream-level metadata for a frame source or sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: u64,
}

/// An ordered, forward-only reader of RGB frames.
pub trait FrameSource {
    fn meta(&self) -> VideoMeta;

    /// Next frame in order; `Ok(None)` at end of stream. A truncated
    /// trailing frame counts as end of stream, not an error.
    fn read_frame(&mut self) -> MatchlightResult<Option<RgbImage>>;
}

/// An ordered writer of RGB frames. `finish` must be called to flush and
/// persist stream metadata.
pub trait FrameSink {
    fn meta(&self) -> VideoMeta;
    fn write_frame(&mut self, frame: &RgbImage) -> MatchlightResult<()>;
    fn finish(&mut self) -> MatchlightResult<()>;
}

fn check_frame_size(meta: &VideoMeta, frame: &RgbImage) -> MatchlightResult<()> {
    if frame.width() != meta.width || frame.height() != meta.height {
        return Err(MatchlightError::render(format!(
            "frame size {}x{} does not match stream {}x{}",
            frame.width(),
            frame.height(),
            meta.width,
            meta.height
        )));
    }
    Ok(())
}

/// In-memory source for tests.
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    meta: VideoMeta,
    frames: Vec<RgbImage>,
    next: usize,
}

impl MemoryFrameSource {
    /// Build a source from pre-rendered frames; all frames must share the
    /// dimensions of the first.
    pub fn new(frames: Vec<RgbImage>, fps: f64) -> MatchlightResult<Self> {
        let (width, height) = frames
            .first()
            .map(|f| (f.width(), f.height()))
            .ok_or_else(|| MatchlightError::render("cannot build a source from zero frames"))?;
        let meta = VideoMeta {
            width,
            height,
            fps,
            total_frames: frames.len() as u64,
        };
        for frame in &frames {
            check_frame_size(&meta, frame)?;
        }
        Ok(Self {
            meta,
            frames,
            next: 0,
        })
    }
}

impl FrameSource for MemoryFrameSource {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn read_frame(&mut self) -> MatchlightResult<Option<RgbImage>> {
        match self.frames.get(self.next) {
            Some(frame) => {
                self.next += 1;
                Ok(Some(frame.clone()))
            }
            None => Ok(None),
        }
    }
}

/// In-memory sink for tests; collected frames stay inspectable.
#[derive(Debug, Clone)]
pub struct MemoryFrameSink {
    meta: VideoMeta,
    pub frames: Vec<RgbImage>,
}

impl MemoryFrameSink {
    pub fn new(meta: VideoMeta) -> Self {
        Self {
            meta,
            frames: Vec::new(),
        }
    }
}

impl FrameSink for MemoryFrameSink {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn write_frame(&mut self, frame: &RgbImage) -> MatchlightResult<()> {
        check_frame_size(&self.meta, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> MatchlightResult<()> {
        Ok(())
    }
}

/// Sidecar path for a raw stream: `<path>.json`.
fn sidecar_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".json");
    PathBuf::from(os)
}

/// Raw RGB24 file/pipe source with a JSON metadata sidecar.
pub struct RawVideoSource<R: Read> {
    meta: VideoMeta,
    reader: R,
    buf: Vec<u8>,
}

impl RawVideoSource<BufReader<File>> {
    pub fn open(path: &Path) -> MatchlightResult<Self> {
        if !path.exists() {
            return Err(MatchlightError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let sidecar = sidecar_path(path);
        if !sidecar.exists() {
            return Err(MatchlightError::FileNotFound { path: sidecar });
        }
        let meta: VideoMeta = serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?;
        let reader = BufReader::new(File::open(path)?);
        Ok(Self::from_reader(reader, meta))
    }
}

impl<R: Read> RawVideoSource<R> {
    /// Wrap an already-open rgb24 byte stream, e.g. an ffmpeg stdout pipe.
    pub fn from_reader(reader: R, meta: VideoMeta) -> Self {
        let buf = vec![0u8; meta.width as usize * meta.height as usize * 3];
        Self { meta, reader, buf }
    }
}

impl<R: Read> FrameSource for RawVideoSource<R> {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn read_frame(&mut self) -> MatchlightResult<Option<RgbImage>> {
        match self.reader.read_exact(&mut self.buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let image = RgbImage::from_raw(self.meta.width, self.meta.height, self.buf.clone())
            .ok_or_else(|| MatchlightError::render("rgb24 buffer size mismatch"))?;
        Ok(Some(image))
    }
}

/// Raw RGB24 file sink; `finish` writes the metadata sidecar with the
/// actual frame count.
pub struct RawVideoSink {
    meta: VideoMeta,
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl RawVideoSink {
    pub fn create(path: &Path, meta: VideoMeta) -> MatchlightResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        Ok(Self {
            meta,
            path: path.to_path_buf(),
            writer,
            written: 0,
        })
    }
}

impl FrameSink for RawVideoSink {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn write_frame(&mut self, frame: &RgbImage) -> MatchlightResult<()> {
        check_frame_size(&self.meta, frame)?;
        self.writer.write_all(frame.as_raw())?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> MatchlightResult<()> {
        self.writer.flush()?;
        let meta = VideoMeta {
            total_frames: self.written,
            ..self.meta
        };
        let json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(sidecar_path(&self.path), json)?;
        Ok(())
    }
}

fn frame_file_name(index: u64) -> String {
    format!("frame_{index:06}.png")
}

/// PNG sequence directory source (`frame_000000.png`, ... plus
/// `meta.json`).
pub struct PngSequenceSource {
    meta: VideoMeta,
    dir: PathBuf,
    next: u64,
}

impl PngSequenceSource {
    pub fn open(dir: &Path) -> MatchlightResult<Self> {
        let meta_path = dir.join("meta.json");
        if !meta_path.exists() {
            return Err(MatchlightError::FileNotFound { path: meta_path });
        }
        let meta: VideoMeta = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)?;
        Ok(Self {
            meta,
            dir: dir.to_path_buf(),
            next: 0,
        })
    }
}

impl FrameSource for PngSequenceSource {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn read_frame(&mut self) -> MatchlightResult<Option<RgbImage>> {
        if self.next >= self.meta.total_frames {
            return Ok(None);
        }
        let path = self.dir.join(frame_file_name(self.next));
        if !path.exists() {
            return Ok(None);
        }
        let image = image::open(&path)
            .map_err(|e| MatchlightError::render(format!("failed to decode {path:?}: {e}")))?
            .into_rgb8();
        self.next += 1;
        Ok(Some(image))
    }
}

/// PNG sequence directory sink.
pub struct PngSequenceSink {
    meta: VideoMeta,
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub fn create(dir: &Path, meta: VideoMeta) -> MatchlightResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            meta,
            dir: dir.to_path_buf(),
            written: 0,
        })
    }
}

impl FrameSink for PngSequenceSink {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn write_frame(&mut self, frame: &RgbImage) -> MatchlightResult<()> {
        check_frame_size(&self.meta, frame)?;
        let path = self.dir.join(frame_file_name(self.written));
        frame
            .save(&path)
            .map_err(|e| MatchlightError::render(format!("failed to encode {path:?}: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> MatchlightResult<()> {
        let meta = VideoMeta {
            total_frames: self.written,
            ..self.meta
        };
        let json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(self.dir.join("meta.json"), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn test_memory_roundtrip() {
        let frames = vec![solid(8, 4, 0), solid(8, 4, 128), solid(8, 4, 255)];
        let mut source = MemoryFrameSource::new(frames.clone(), 30.0).unwrap();
        assert_eq!(source.meta().total_frames, 3);

        let mut sink = MemoryFrameSink::new(source.meta());
        while let Some(frame) = source.read_frame().unwrap() {
            sink.write_frame(&frame).unwrap();
        }
        sink.finish().unwrap();
        assert_eq!(sink.frames, frames);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let meta = VideoMeta {
            width: 8,
            height: 4,
            fps: 30.0,
            total_frames: 0,
        };
        let mut sink = MemoryFrameSink::new(meta);
        assert!(sink.write_frame(&solid(9, 4, 0)).is_err());
    }

    #[test]
    fn test_raw_stream_roundtrip_and_truncation() {
        let meta = VideoMeta {
            width: 4,
            height: 2,
            fps: 60.0,
            total_frames: 2,
        };
        let mut bytes = Vec::new();
        bytes.extend(solid(4, 2, 10).as_raw());
        bytes.extend(solid(4, 2, 20).as_raw());
        bytes.extend(&solid(4, 2, 30).as_raw()[..7]); // truncated tail

        let mut source = RawVideoSource::from_reader(&bytes[..], meta);
        assert_eq!(source.read_frame().unwrap().unwrap().get_pixel(0, 0)[0], 10);
        assert_eq!(source.read_frame().unwrap().unwrap().get_pixel(0, 0)[0], 20);
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_raw_file_sidecar_carries_written_count() {
        let dir = std::env::temp_dir().join("matchlight-raw-sink-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.rgb");
        let meta = VideoMeta {
            width: 4,
            height: 2,
            fps: 24.0,
            total_frames: 0,
        };

        let mut sink = RawVideoSink::create(&path, meta).unwrap();
        sink.write_frame(&solid(4, 2, 1)).unwrap();
        sink.write_frame(&solid(4, 2, 2)).unwrap();
        sink.finish().unwrap();

        let mut source = RawVideoSource::open(&path).unwrap();
        assert_eq!(source.meta().total_frames, 2);
        assert_eq!(source.read_frame().unwrap().unwrap().get_pixel(0, 0)[0], 1);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_png_sequence_roundtrip() {
        let dir = std::env::temp_dir().join("matchlight-png-seq-test");
        std::fs::remove_dir_all(&dir).ok();
        let meta = VideoMeta {
            width: 4,
            height: 4,
            fps: 30.0,
            total_frames: 0,
        };

        let mut sink = PngSequenceSink::create(&dir, meta).unwrap();
        sink.write_frame(&solid(4, 4, 7)).unwrap();
        sink.finish().unwrap();

        let mut source = PngSequenceSource::open(&dir).unwrap();
        assert_eq!(source.meta().total_frames, 1);
        assert_eq!(source.read_frame().unwrap().unwrap().get_pixel(0, 0)[0], 7);
        assert!(source.read_frame().unwrap().is_none());
        std::fs::remove_dir_all(dir).ok();
    }
}
