use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Arc;

use crate::num::PrimInt;
#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use derive_getters::Dissolve;
use eyre::{eyre, Result};
use impl_tools::autoimpl;
use ::num::ToPrimitive;

/// Interval is a half-open region [start, end) on a reference sequence, e.g. a codon on a
/// transcript. Empty intervals (start == end) and intervals with negative length are
/// prohibited.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Interval<Idx: PrimInt> {
    start: Idx,
    end: Idx,
}

/// Trait for types that can be generally viewed as half-open intervals [start, end).
#[autoimpl(for <T: trait + ?Sized> &T, Box<T>, Rc<T>, Arc<T>)]
pub trait IntervalOp {
    type Idx: PrimInt;

    /// Start position of the interval-like object.
    fn start(&self) -> Self::Idx;

    /// End position of the interval-like object.
    fn end(&self) -> Self::Idx;

    /// Signed distance from the interval start to the given position.
    /// Returns None if the distance doesn't fit into i64.
    fn offset_from_start(&self, pos: Self::Idx) -> Option<i64> {
        Some(pos.to_i64()? - self.start().to_i64()?)
    }

    /// Signed distance from the (exclusive) interval end to the given position.
    /// Returns None if the distance doesn't fit into i64.
    fn offset_from_end(&self, pos: Self::Idx) -> Option<i64> {
        Some(pos.to_i64()? - self.end().to_i64()?)
    }
}

impl<T: PrimInt> IntervalOp for Interval<T> {
    type Idx = T;

    #[inline(always)]
    fn start(&self) -> Self::Idx {
        self.start
    }
    #[inline(always)]
    fn end(&self) -> Self::Idx {
        self.end
    }
}

impl<Idx: PrimInt> Interval<Idx> {
    pub fn new(start: Idx, end: Idx) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(eyre!("Invalid interval: start >= end"))
        }
    }
}
