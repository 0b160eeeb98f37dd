//! Activity record output.
//!
//! One bare Unix timestamp per active tick, one per line, flushed right away
//! so a reading process sees it within the tick. Idle ticks print nothing.

use crate::monitor::types::ActivityRecord;
use std::io::{self, Write};

/// Line-oriented writer for activity records.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Writes one record and flushes it.
    pub fn emit(&mut self, record: ActivityRecord) -> io::Result<()> {
        writeln!(self.out, "{record}")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_writes_one_line_per_record() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.emit(ActivityRecord { timestamp: 100 }).unwrap();
        writer.emit(ActivityRecord { timestamp: 101 }).unwrap();

        assert_eq!(writer.get_ref().as_slice(), b"100\n101\n");
        assert_eq!(writer.written(), 2);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_emit_surfaces_write_errors() {
        let mut writer = RecordWriter::new(ClosedPipe);
        let err = writer.emit(ActivityRecord { timestamp: 1 }).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(writer.written(), 0);
    }
}
