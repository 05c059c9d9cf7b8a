use std::fmt::Display;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

use crate::loc::Strand;

/// Strandedness of a sequencing library. Indicates the relationship between molecules in the
/// library and their source RNA strand. Ribo-seq libraries are typically stranded: footprints
/// are sequenced in the sense orientation of the transcript.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(i8)]
pub enum Strandedness {
    /// Each sequenced read matches the sequence of the source molecule.
    #[default]
    Forward = 1,
    /// Each sequenced read is the reverse complement of the source molecule.
    Reverse = -1,
    /// Each sequenced read can be either identical to the source molecule or its reverse complement.
    Unstranded = 0,
}

impl Strandedness {
    /// Whether an alignment on the given transcript strand is a sense read for this library.
    pub fn is_expected(&self, strand: Strand) -> bool {
        match self {
            Strandedness::Forward => strand == Strand::Forward,
            Strandedness::Reverse => strand == Strand::Reverse,
            Strandedness::Unstranded => true,
        }
    }

    /// Token used in P-site config files to describe the library.
    pub fn config_token(&self) -> &'static str {
        match self {
            Strandedness::Forward => "yes",
            Strandedness::Reverse => "reverse",
            Strandedness::Unstranded => "no",
        }
    }
}

impl Display for Strandedness {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.config_token())
    }
}
