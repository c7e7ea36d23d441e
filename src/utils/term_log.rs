//! Progress-aware logging output
//!
//! While progress bars are on screen, log lines have to be printed through the
//! active `MultiProgress` so they land above the bars instead of tearing them.

use indicatif::MultiProgress;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Progress display currently drawing to the terminal, if any
static ACTIVE_PROGRESS: Mutex<Option<MultiProgress>> = Mutex::new(None);

/// Route log output through `progress` until cleared with `None`
pub fn set_progress_target(progress: Option<MultiProgress>) {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = progress;
    }
}

fn active_progress() -> Option<MultiProgress> {
    ACTIVE_PROGRESS.lock().ok().and_then(|active| active.clone())
}

/// `MakeWriter` for the fmt layer that cooperates with progress bars
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressAwareWriter;

impl<'a> MakeWriter<'a> for ProgressAwareWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter { buffer: Vec::new() }
    }
}

/// Buffers one formatted event and emits it on flush or drop
pub struct LineWriter {
    buffer: Vec<u8>,
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.buffer);

        match active_progress() {
            Some(progress) => {
                let text = String::from_utf8_lossy(&bytes);
                progress.println(text.trim_end_matches('\n'))
            }
            None => io::stderr().write_all(&bytes),
        }
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_writer_buffers_until_flush() {
        let mut writer = ProgressAwareWriter.make_writer();
        writer.write_all(b"partial").unwrap();
        assert_eq!(writer.buffer, b"partial");
        writer.flush().unwrap();
        assert!(writer.buffer.is_empty());
    }

    #[test]
    fn test_writer_prints_through_active_progress() {
        set_progress_target(Some(MultiProgress::with_draw_target(
            ProgressDrawTarget::hidden(),
        )));
        let mut writer = ProgressAwareWriter.make_writer();
        writer.write_all(b"line above the bars\n").unwrap();
        writer.flush().unwrap();
        set_progress_target(None);
        assert!(active_progress().is_none());
    }
}
