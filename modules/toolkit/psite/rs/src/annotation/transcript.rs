#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use ribobit_core_rs::loc::Interval;

/// A transcript isoform with its coding annotation. Codon intervals are half-open and given in
/// transcript coordinates, i.e. the same coordinate system as transcriptome alignments.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Eq, Debug, Constructor, Dissolve, Getters)]
pub struct Transcript {
    id: String,
    /// Identifier of the parent gene.
    gene: String,
    length: u64,
    start_codon: Option<Interval<u64>>,
    stop_codon: Option<Interval<u64>>,
    /// Annotation level, e.g. GENCODE 1 (verified), 2 (manual) or 3 (automatic).
    level: Option<String>,
}

impl Transcript {
    /// Both start and stop codons are annotated, so the transcript can anchor distance
    /// measurements around its CDS boundaries.
    pub fn has_codons(&self) -> bool {
        self.start_codon.is_some() && self.stop_codon.is_some()
    }
}

#[cfg(test)]
impl Transcript {
    pub fn coding(id: &str, gene: &str, length: u64, level: Option<&str>) -> Self {
        Transcript::new(
            id.to_string(),
            gene.to_string(),
            length,
            Some(Interval::new(100, 103).unwrap()),
            Some(Interval::new(length - 103, length - 100).unwrap()),
            level.map(|x| x.to_string()),
        )
    }

    pub fn noncoding(id: &str, gene: &str, length: u64, level: Option<&str>) -> Self {
        Transcript::new(
            id.to_string(),
            gene.to_string(),
            length,
            None,
            None,
            level.map(|x| x.to_string()),
        )
    }
}
