use std::collections::BTreeMap;
use std::fmt::Display;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use derive_getters::{Dissolve, Getters};
use itertools::Itertools;
use rayon::prelude::*;

use crate::config::Thresholds;
use crate::distance::{Distances, LengthCounter, BINS, WINDOW};
use crate::frames::{self, Frames};

/// Why a read length was (or was not) accepted as a P-site length.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Verdict {
    /// Fewer reads than the floor within the start codon window.
    TooFewReads,
    /// Fewer in-frame reads than the floor after trimming at the candidate P-site.
    Frame0BelowFloor,
    /// In-frame share below the configured threshold.
    LowFrame0Share,
    /// At least one of the frame tests is not significant.
    NotSignificant,
    /// Periodic, but too rare in the library to be trusted.
    Accepted,
    /// Periodic and abundant: the offset is reported in the summary.
    Predefined,
}

impl Verdict {
    pub fn token(&self) -> &'static str {
        match self {
            Verdict::TooFewReads => "too_few_reads",
            Verdict::Frame0BelowFloor => "frame0_below_floor",
            Verdict::LowFrame0Share => "low_frame0_share",
            Verdict::NotSignificant => "not_significant",
            Verdict::Accepted => "accepted",
            Verdict::Predefined => "psite",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted | Verdict::Predefined)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Evaluation of a single read length.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct PsiteRow {
    length: usize,
    /// Fraction of all counted alignments that have this length.
    library_share: f64,
    /// Alignments within the start codon window.
    window_reads: u64,
    /// Distance from the read 5' end to the first nucleotide of the P-site codon.
    offset: i64,
    codons: usize,
    frame_sums: [u64; 3],
    frame0_share: f64,
    pvalue1: f64,
    pvalue2: f64,
    pvalue_combined: f64,
    verdict: Verdict,
}

impl PsiteRow {
    /// Analyze one start codon histogram row.
    pub fn evaluate(
        length: usize,
        row: &[u64; BINS],
        lengths: &LengthCounter,
        thresholds: &Thresholds,
    ) -> Self {
        // First maximum among the bins upstream of the start codon
        let peak = row[..WINDOW].iter().copied().max().unwrap_or(0);
        let candidate = row[..WINDOW].iter().position(|x| *x == peak).unwrap_or(0);

        let frames = Frames::extract(&row[candidate..]);
        let test = frames::test_frame(&frames);

        let mut result = Self {
            length,
            library_share: lengths.share(length),
            window_reads: row.iter().sum(),
            offset: WINDOW as i64 - candidate as i64,
            codons: frames.codons(),
            frame_sums: frames.sums(),
            frame0_share: frames.frame0_share(),
            pvalue1: *test.pvalue1(),
            pvalue2: *test.pvalue2(),
            pvalue_combined: *test.combined(),
            verdict: Verdict::TooFewReads,
        };
        result.verdict = thresholds.classify(&result);
        result
    }
}

impl Thresholds {
    /// Verdict for a row. Depends only on the row's numeric columns.
    pub fn classify(&self, row: &PsiteRow) -> Verdict {
        if row.window_reads < self.min_count {
            Verdict::TooFewReads
        } else if row.frame_sums[0] < self.min_count {
            Verdict::Frame0BelowFloor
        } else if row.frame0_share < self.frame0_percent {
            Verdict::LowFrame0Share
        } else if !(row.pvalue1 < self.pvalue1_cutoff && row.pvalue2 < self.pvalue2_cutoff) {
            Verdict::NotSignificant
        } else if row.library_share >= self.min_library_share {
            Verdict::Predefined
        } else {
            Verdict::Accepted
        }
    }
}

/// Rows for all read lengths observed near start codons, sorted by the read length.
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Getters)]
pub struct Selection {
    rows: Vec<PsiteRow>,
}

impl Selection {
    pub fn evaluate(distances: &Distances, thresholds: &Thresholds) -> Self {
        let mut rows: Vec<PsiteRow> = distances
            .start()
            .rows()
            .collect_vec()
            .into_par_iter()
            .map(|(length, row)| PsiteRow::evaluate(length, row, distances.lengths(), thresholds))
            .collect();
        rows.sort_by_key(|row| row.length);

        let selection = Self { rows };
        let predefined = selection.predefined();
        if predefined.is_empty() {
            log::warn!(
                "None of the {} read lengths passed the P-site thresholds, specify P-site offsets manually",
                selection.rows.len()
            );
        } else {
            log::info!(
                "P-site offsets: {}",
                predefined
                    .iter()
                    .map(|(length, offset)| format!("{length}nt -> {offset}"))
                    .join(", ")
            );
        }
        selection
    }

    /// Offsets of lengths that passed every threshold including the library share.
    pub fn predefined(&self) -> BTreeMap<usize, i64> {
        self.rows
            .iter()
            .filter(|row| row.verdict == Verdict::Predefined)
            .map(|row| (row.length, row.offset))
            .collect()
    }

    /// Offsets of all periodic lengths, rare ones included.
    pub fn accepted(&self) -> BTreeMap<usize, i64> {
        self.rows
            .iter()
            .filter(|row| row.verdict.is_accepted())
            .map(|row| (row.length, row.offset))
            .collect()
    }

    pub fn row(&self, length: usize) -> Option<&PsiteRow> {
        self.rows.iter().find(|row| row.length == length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceHistogram;

    fn distances(rows: Vec<(usize, Vec<(i64, u64)>)>) -> Distances {
        let mut histogram = DistanceHistogram::default();
        let mut lengths = LengthCounter::default();
        for (length, counts) in rows {
            for (distance, count) in counts {
                for _ in 0..count {
                    assert!(histogram.record(length, distance));
                    lengths.increment(length);
                }
            }
        }
        Distances::new(histogram, DistanceHistogram::default(), lengths)
    }

    fn periodic(peak: i64) -> Vec<(i64, u64)> {
        (peak..=WINDOW as i64)
            .map(|d| (d, if (d - peak) % 3 == 0 { 20 } else { 1 }))
            .collect()
    }

    fn flat(from: i64) -> Vec<(i64, u64)> {
        (from..=WINDOW as i64).map(|d| (d, 5)).collect()
    }

    fn loose() -> Thresholds {
        let mut thresholds = Thresholds::new();
        thresholds.set_pvalue_cutoffs(0.5, 0.5);
        thresholds
    }

    #[test]
    fn test_floor() {
        let distances = distances(vec![(29, vec![(-3, 9)]), (30, vec![(-3, 10)])]);
        let selection = Selection::evaluate(&distances, &loose());

        let rejected = selection.row(29).unwrap();
        assert_eq!(*rejected.window_reads(), 9);
        assert_eq!(*rejected.verdict(), Verdict::TooFewReads);

        let accepted = selection.row(30).unwrap();
        assert_eq!(*accepted.window_reads(), 10);
        assert_eq!(*accepted.offset(), 3);
        assert_eq!(accepted.frame_sums(), &[10, 0, 0]);
        assert_eq!(*accepted.verdict(), Verdict::Predefined);
    }

    #[test]
    fn test_periodic_length_is_predefined() {
        let distances = distances(vec![(30, periodic(-3)), (31, vec![(-20, 3), (10, 4)])]);
        let selection = Selection::evaluate(&distances, &Thresholds::default());

        let row = selection.row(30).unwrap();
        assert_eq!(*row.offset(), 3);
        assert_eq!(*row.codons(), 18);
        assert!(*row.frame0_share() > 0.65);
        assert!(*row.pvalue1() < 0.001);
        assert_eq!(*row.verdict(), Verdict::Predefined);

        assert_eq!(*selection.row(31).unwrap().verdict(), Verdict::TooFewReads);
        assert_eq!(selection.predefined(), BTreeMap::from([(30, 3)]));
        assert_eq!(
            selection.rows().iter().map(|x| *x.length()).collect_vec(),
            vec![30, 31]
        );
    }

    #[test]
    fn test_first_maximum_wins() {
        let tied = distances(vec![(28, vec![(-12, 15), (-9, 15), (-6, 3)])]);
        let selection = Selection::evaluate(&tied, &Thresholds::default());
        assert_eq!(*selection.rows()[0].offset(), 12);

        // Bins at or after the start codon never become the candidate
        let late = distances(vec![(28, vec![(-5, 2), (0, 30), (12, 50)])]);
        let selection = Selection::evaluate(&late, &Thresholds::default());
        assert_eq!(*selection.rows()[0].offset(), 5);
    }

    #[test]
    fn test_rare_length_is_accepted_only() {
        let mut thresholds = Thresholds::default();
        thresholds.set_min_library_share(0.9);
        let (start, stop, mut lengths) = distances(vec![(30, periodic(-3))]).dissolve();
        for _ in 0..1000 {
            lengths.increment(22);
        }
        let selection = Selection::evaluate(&Distances::new(start, stop, lengths), &thresholds);

        assert_eq!(*selection.row(30).unwrap().verdict(), Verdict::Accepted);
        assert!(selection.predefined().is_empty());
        assert_eq!(selection.accepted(), BTreeMap::from([(30, 3)]));
    }

    #[test]
    fn test_frame0_rejections() {
        // 27: flat after the candidate, 28: only 8 in-frame reads after the candidate
        let distances = distances(vec![(27, flat(-3)), (28, vec![(-3, 5), (-1, 3), (0, 3)])]);
        let selection = Selection::evaluate(&distances, &Thresholds::default());

        assert_eq!(*selection.row(27).unwrap().verdict(), Verdict::LowFrame0Share);
        assert_eq!(
            *selection.row(28).unwrap().verdict(),
            Verdict::Frame0BelowFloor
        );
    }

    #[test]
    fn test_reclassification_reproduces_verdicts() {
        let distances = distances(vec![
            (26, vec![(-3, 4)]),
            (27, flat(-3)),
            (28, vec![(-3, 12)]),
            (30, periodic(-3)),
        ]);

        for thresholds in [Thresholds::default(), loose()] {
            let selection = Selection::evaluate(&distances, &thresholds);
            assert_eq!(selection.rows().len(), 4);
            for row in selection.rows() {
                assert_eq!(thresholds.classify(row), *row.verdict());
            }
        }
    }
}
