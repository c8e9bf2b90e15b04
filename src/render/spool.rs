use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameRGB, FrameSink, SinkConfig};
use crate::foundation::core::{Dimensions, FrameIndex};
use crate::foundation::error::{ChalkError, ChalkResult};

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Raw `rgb24` frames of one scene buffered in a temporary file.
///
/// The file is removed when the spool is dropped, so a failed scene leaves nothing behind.
pub(crate) struct SpoolSink {
    guard: TempFileGuard,
    writer: BufWriter<File>,
    output: Dimensions,
    frames: u64,
}

impl SpoolSink {
    pub(crate) fn create(dir: &Path, scene: usize, output: Dimensions) -> ChalkResult<Self> {
        let path = dir.join(format!(
            "chalkline_spool_{}_{}_{}.rgb",
            std::process::id(),
            scene,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        let file = File::create(&path)
            .with_context(|| format!("create spool file '{}'", path.display()))?;
        Ok(Self {
            guard: TempFileGuard(Some(path)),
            writer: BufWriter::new(file),
            output,
            frames: 0,
        })
    }

    fn frame_len(&self) -> usize {
        (self.output.width as usize) * (self.output.height as usize) * 3
    }

    fn path(&self) -> ChalkResult<&Path> {
        self.guard
            .0
            .as_deref()
            .ok_or_else(|| ChalkError::encode("spool file already released"))
    }

    /// Push every spooled frame into `sink`, numbering them from `first`. Returns the count.
    pub(crate) fn replay(
        mut self,
        sink: &mut dyn FrameSink,
        first: FrameIndex,
    ) -> ChalkResult<u64> {
        self.writer.flush().context("flush spool file")?;
        let path = self.path()?;
        let file =
            File::open(path).with_context(|| format!("reopen spool file '{}'", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut frame = FrameRGB {
            width: self.output.width,
            height: self.output.height,
            data: vec![0; self.frame_len()],
        };
        for i in 0..self.frames {
            reader
                .read_exact(&mut frame.data)
                .with_context(|| format!("read spooled frame {i}"))?;
            sink.push_frame(FrameIndex(first.0 + i), &frame)?;
        }
        Ok(self.frames)
    }
}

impl FrameSink for SpoolSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ChalkResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGB) -> ChalkResult<()> {
        if frame.width != self.output.width
            || frame.height != self.output.height
            || frame.data.len() != self.frame_len()
        {
            return Err(ChalkError::encode(format!(
                "spool expects {}x{} frames, got {}x{}",
                self.output.width, self.output.height, frame.width, frame.height
            )));
        }
        self.writer
            .write_all(&frame.data)
            .context("write spooled frame")?;
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> ChalkResult<()> {
        self.writer.flush().context("flush spool file")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/spool.rs"]
mod tests;
