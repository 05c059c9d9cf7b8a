use std::path::Path;

use eyre::Result;

use crate::bam::Alignment;

/// A trait for reading structured records. Modeled after the `Read` trait in the std.
pub trait ReadRecord {
    /// The type of the records that will be read.
    type Record;

    /// Read a single record from the input into the provided buffer.
    /// Returns `true` if a record was read and `false` if the end of the input was reached.
    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool>;

    /// Read all records from the input into the provided buffer.
    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize>
    where
        Self::Record: Default,
    {
        let mut read = 0;
        let mut record = Self::Record::default();
        while self.read_record(&mut record)? {
            into.push(std::mem::take(&mut record));
            read += 1;
        }
        Ok(read)
    }
}

/// A trait for writing structured records. Modeled after the `Write` trait in the std.
pub trait WriteRecord {
    type Record;

    /// Write a single record.
    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Write a slice of records.
    fn write_records(&mut self, records: &[Self::Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush the output.
    fn flush(&mut self) -> Result<()>;
}

/// A forward-only stream of alignments against a set of named reference sequences
/// (transcripts, for Ribo-seq meta-analysis).
pub trait AlignmentSource: ReadRecord<Record = Alignment> {
    /// Names of the reference sequences, indexed by `Alignment::reference`.
    fn references(&self) -> &[String];

    /// Location of the underlying alignment file.
    fn filename(&self) -> &Path;
}
