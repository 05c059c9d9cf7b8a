use std::io::Read;
use std::path::{Path, PathBuf};

use eyre::Result;
use noodles::{bam, bgzf};

use ribobit_core_rs::loc::Strand;

use super::alignment::Alignment;
use crate::traits::{AlignmentSource, ReadRecord};

/// Sequential BAM reader yielding lightweight `Alignment` records in file order.
pub struct Reader<R: Read> {
    filename: PathBuf,
    inner: bam::io::Reader<bgzf::Reader<R>>,
    references: Vec<String>,
    record: bam::Record,
    exflags: u16,
    minmapq: u8,
}

impl<R: Read> Reader<R> {
    pub(super) fn new(
        filename: PathBuf,
        inner: bam::io::Reader<bgzf::Reader<R>>,
        references: Vec<String>,
        exflags: u16,
        minmapq: u8,
    ) -> Self {
        Self {
            filename,
            inner,
            references,
            record: bam::Record::default(),
            exflags,
            minmapq,
        }
    }

    fn is_excluded(&self) -> bool {
        if self.record.flags().bits() & self.exflags != 0 {
            return true;
        }
        match self.record.mapping_quality() {
            Some(mapq) => mapq.get() < self.minmapq,
            None => self.minmapq > 0,
        }
    }
}

impl<R: Read> ReadRecord for Reader<R> {
    type Record = Alignment;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        loop {
            if self.inner.read_record(&mut self.record)? == 0 {
                return Ok(false);
            }
            if self.is_excluded() {
                continue;
            }

            let flags = self.record.flags();
            into.unmapped = flags.is_unmapped();
            into.strand = Strand::from_reverse_flag(flags.is_reverse_complemented());
            into.length = self.record.sequence().len();
            into.reference = self.record.reference_sequence_id().transpose()?;
            into.start = self
                .record
                .alignment_start()
                .transpose()?
                .map(|pos| (pos.get() - 1) as u64);
            return Ok(true);
        }
    }
}

impl<R: Read> AlignmentSource for Reader<R> {
    fn references(&self) -> &[String] {
        &self.references
    }

    fn filename(&self) -> &Path {
        &self.filename
    }
}
