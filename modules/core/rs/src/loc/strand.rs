#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, i.e. the alignment follows the reference orientation.
    #[default]
    Forward = 1,
    /// The reverse strand, i.e. the alignment is reverse complemented w.r.t. the reference.
    Reverse = -1,
}

impl Strand {
    /// Strand of an alignment given its SAM 'reverse complemented' flag (0x10).
    pub fn from_reverse_flag(is_reverse: bool) -> Self {
        if is_reverse {
            Self::Reverse
        } else {
            Self::Forward
        }
    }
}
