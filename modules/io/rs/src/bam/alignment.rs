use derive_more::Constructor;

use ribobit_core_rs::loc::Strand;

/// A single alignment reduced to the fields needed for read-length/position meta-analysis.
/// Records are ephemeral: readers overwrite the same instance for each BAM record.
#[derive(Clone, PartialEq, Eq, Debug, Default, Constructor)]
pub struct Alignment {
    /// Index of the reference sequence in the source's reference table.
    pub reference: Option<usize>,
    /// 0-based leftmost aligned position on the reference.
    pub start: Option<u64>,
    /// Length of the read sequence, soft-clipped bases included.
    pub length: usize,
    pub strand: Strand,
    pub unmapped: bool,
}

impl Alignment {
    /// Shorthand for a mapped alignment.
    pub fn mapped(reference: usize, start: u64, length: usize, strand: Strand) -> Self {
        Self::new(Some(reference), Some(start), length, strand, false)
    }

    /// Shorthand for an unmapped read of the given length.
    pub fn unmapped(length: usize) -> Self {
        Self::new(None, None, length, Strand::Forward, true)
    }
}
