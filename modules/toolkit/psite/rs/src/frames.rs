use derive_getters::{Dissolve, Getters};

use crate::stats;

/// Codon-wise counts split by reading frame. `f0[i]`, `f1[i]` and `f2[i]` are the counts at
/// positions 3i, 3i+1 and 3i+2 of the source row.
#[derive(Clone, PartialEq, Eq, Debug, Default, Dissolve, Getters)]
pub struct Frames {
    f0: Vec<u64>,
    f1: Vec<u64>,
    f2: Vec<u64>,
}

impl Frames {
    /// Split a row into three frames. A trailing partial codon is dropped.
    pub fn extract(row: &[u64]) -> Self {
        let codons = row.len() / 3;
        let mut frames = Self {
            f0: Vec::with_capacity(codons),
            f1: Vec::with_capacity(codons),
            f2: Vec::with_capacity(codons),
        };
        for codon in row.chunks_exact(3) {
            frames.f0.push(codon[0]);
            frames.f1.push(codon[1]);
            frames.f2.push(codon[2]);
        }
        frames
    }

    pub fn codons(&self) -> usize {
        self.f0.len()
    }

    /// Total counts in frames 0, 1 and 2.
    pub fn sums(&self) -> [u64; 3] {
        [
            self.f0.iter().sum(),
            self.f1.iter().sum(),
            self.f2.iter().sum(),
        ]
    }

    /// Fraction of in-frame counts, f0 / (f0 + f1 + f2). Zero for an empty row.
    pub fn frame0_share(&self) -> f64 {
        let [f0, f1, f2] = self.sums();
        match f0 + f1 + f2 {
            0 => 0.0,
            total => f0 as f64 / total as f64,
        }
    }
}

/// P-values of the 3-nt periodicity test.
#[derive(Clone, Copy, PartialEq, Debug, Dissolve, Getters)]
pub struct FrameTest {
    /// Frame 0 > frame 1.
    pvalue1: f64,
    /// Frame 0 > frame 2.
    pvalue2: f64,
    /// Both comparisons combined.
    combined: f64,
}

/// Test whether frame 0 dominates frames 1 and 2 codon by codon.
///
/// Each comparison is a one-sided Wilcoxon signed-rank test; the combined p-value merges their
/// z-scores with Stouffer's method.
pub fn test_frame(frames: &Frames) -> FrameTest {
    let first = stats::wilcoxon_greater(&frames.f0, &frames.f1);
    let second = stats::wilcoxon_greater(&frames.f0, &frames.f2);
    FrameTest {
        pvalue1: *first.pvalue(),
        pvalue2: *second.pvalue(),
        combined: stats::stouffer(&[*first.zscore(), *second.zscore()]),
    }
}
