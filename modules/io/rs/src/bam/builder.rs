use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use eyre::{Result, WrapErr};
use noodles::bam;

use super::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderBuilder {
    filename: PathBuf,
    exflags: Option<u16>,
    minmapq: Option<u8>,
}

impl ReaderBuilder {
    pub fn new<T: Into<PathBuf>>(filename: T) -> Self {
        Self {
            filename: filename.into(),
            exflags: None,
            minmapq: None,
        }
    }

    /// Skip records with any of these SAM flags set. Nothing is skipped by default.
    pub fn with_exflags(mut self, exflags: u16) -> Self {
        self.exflags = Some(exflags);
        self
    }

    /// Skip records with mapping quality below the threshold. Disabled by default.
    pub fn with_minmapq(mut self, minmapq: u8) -> Self {
        self.minmapq = Some(minmapq);
        self
    }

    /// Open the BAM file and parse its header.
    pub fn build(self) -> Result<Reader<File>> {
        let file = File::open(&self.filename)
            .wrap_err_with(|| format!("Failed to open BAM file: {}", self.filename.display()))?;
        self.build_from_reader(file)
    }

    /// Parse a BAM stream from an arbitrary source, e.g. an in-memory buffer. The builder's
    /// filename is kept as the stream label.
    pub fn build_from_reader<R: Read>(self, inner: R) -> Result<Reader<R>> {
        let mut inner = bam::io::Reader::new(inner);
        let header = inner.read_header().wrap_err_with(|| {
            format!("Failed to read a BAM header: {}", self.filename.display())
        })?;

        let references: Vec<String> = header
            .reference_sequences()
            .keys()
            .map(|name| name.to_string())
            .collect();
        log::debug!(
            "Opened {} with {} reference sequences",
            self.filename.display(),
            references.len()
        );

        Ok(Reader::new(
            self.filename,
            inner,
            references,
            self.exflags.unwrap_or(0),
            self.minmapq.unwrap_or(0),
        ))
    }
}
