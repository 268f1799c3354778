// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Report output
//!
//! Formatted reports go to a [`ReportSink`]. A write failure is returned
//! to the caller: a scan fails, and a monitor cycle is abandoned before its
//! watermark advances so the same reports are written again next cycle.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination for formatted event reports.
pub trait ReportSink: Send {
    /// Write one report. Reports already end with a newline.
    fn emit(&mut self, report: &str) -> io::Result<()>;
}

impl<T: ReportSink + ?Sized> ReportSink for Box<T> {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        (**self).emit(report)
    }
}

/// Writes reports to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.flush()
    }
}

/// Appends reports to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// File being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileSink {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        self.file
            .write_all(report.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", self.path.display())))
    }
}

/// Sends every report to two sinks, in order. The second is skipped when
/// the first fails.
#[derive(Debug)]
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A, B> TeeSink<A, B> {
    /// Combine two sinks.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for TeeSink<A, B> {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        self.first.emit(report)?;
        self.second.emit(report)
    }
}
