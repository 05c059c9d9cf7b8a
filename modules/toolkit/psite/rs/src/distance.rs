use std::collections::BTreeMap;

use ahash::HashSet;
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{bail, eyre, Result};

use ribobit_core_rs::loc::{Interval, IntervalOp};
use ribobit_core_rs::ngs::Strandedness;
use ribobit_io_rs::bam::Alignment;
use ribobit_io_rs::{AlignmentSource, ReadRecord};

use crate::annotation::Annotation;
use crate::config::Config;

/// Largest absolute distance (nt) between a read 5' end and a codon that is recorded.
pub const WINDOW: usize = 50;
/// Number of histogram bins, index `i` corresponds to the signed distance `i - WINDOW`.
pub const BINS: usize = 2 * WINDOW + 1;

/// Per read length histograms of signed distances to a codon boundary.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DistanceHistogram {
    rows: BTreeMap<usize, [u64; BINS]>,
}

impl DistanceHistogram {
    /// Bin index for the given distance or None if it falls outside the window.
    pub fn bin(distance: i64) -> Option<usize> {
        if distance.unsigned_abs() <= WINDOW as u64 {
            Some((distance + WINDOW as i64) as usize)
        } else {
            None
        }
    }

    /// Count a read of the given length. Returns false if the distance is outside the window.
    pub fn record(&mut self, length: usize, distance: i64) -> bool {
        match Self::bin(distance) {
            Some(bin) => {
                self.rows.entry(length).or_insert([0; BINS])[bin] += 1;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, length: usize) -> Option<&[u64; BINS]> {
        self.rows.get(&length)
    }

    /// Rows sorted by the read length.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[u64; BINS])> {
        self.rows.iter().map(|(length, row)| (*length, row))
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn total(&self) -> u64 {
        self.rows.values().flat_map(|row| row.iter()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Element-wise addition of another histogram.
    pub fn merge(&mut self, other: &Self) {
        for (length, row) in other.rows() {
            let target = self.rows.entry(length).or_insert([0; BINS]);
            for (t, c) in target.iter_mut().zip(row.iter()) {
                *t += *c;
            }
        }
    }
}

/// Number of alignments per read length, regardless of their position.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LengthCounter {
    counts: BTreeMap<usize, u64>,
}

impl LengthCounter {
    pub fn increment(&mut self, length: usize) {
        *self.counts.entry(length).or_insert(0) += 1;
    }

    pub fn get(&self, length: usize) -> u64 {
        self.counts.get(&length).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fraction of all counted alignments that have the given length.
    pub fn share(&self, length: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(length) as f64 / total as f64,
        }
    }

    /// (length, count) pairs sorted by length, i.e. the read length distribution.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().map(|(length, count)| (*length, *count))
    }

    pub fn merge(&mut self, other: &Self) {
        for (length, count) in other.iter() {
            *self.counts.entry(length).or_insert(0) += count;
        }
    }
}

/// Everything accumulated from a single alignment source.
#[derive(Clone, PartialEq, Eq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct Distances {
    start: DistanceHistogram,
    stop: DistanceHistogram,
    lengths: LengthCounter,
}

impl Distances {
    pub fn merge(&mut self, other: &Self) {
        self.start.merge(&other.start);
        self.stop.merge(&other.stop);
        self.lengths.merge(&other.lengths);
    }
}

/// Whether the alignment orientation matches the library design: sense reads only for
/// forward-stranded libraries, antisense reads only for reverse-stranded ones.
pub fn is_expected_orientation(alignment: &Alignment, strandedness: Strandedness) -> bool {
    strandedness.is_expected(alignment.strand)
}

#[derive(Clone, Copy, Debug)]
struct Anchors {
    start_codon: Interval<u64>,
    stop_codon: Interval<u64>,
}

/// Streaming accumulator of read 5' end distances to start and stop codons of selected
/// transcripts. Holds nothing but the histograms and a per-reference lookup table.
#[derive(Clone, Debug)]
pub struct Accumulator {
    // Indexed by the reference id of the alignment source
    anchors: Vec<Option<Anchors>>,
    strandedness: Strandedness,
    min_length: usize,
    max_length: usize,
    distances: Distances,
}

impl Accumulator {
    /// Resolve codon anchors for every reference of an alignment source.
    ///
    /// Fails if the first reference is not an annotated transcript, which means that the
    /// alignments were made against a genome rather than a transcriptome.
    pub fn new(
        references: &[String],
        selected: &HashSet<String>,
        annotation: &Annotation,
        config: &Config,
    ) -> Result<Self> {
        match references.first() {
            Some(first) if annotation.contains_transcript(first) => {}
            first => bail!(
                "The references in the alignment file are different from the transcriptome \
                 annotation (first reference: {:?}), you should input the transcriptome BAM file.",
                first
            ),
        }

        let anchors: Vec<Option<Anchors>> = references
            .iter()
            .map(|name| {
                if !selected.contains(name) {
                    return None;
                }
                let transcript = annotation.transcript(name)?;
                Some(Anchors {
                    start_codon: (*transcript.start_codon())?,
                    stop_codon: (*transcript.stop_codon())?,
                })
            })
            .collect();
        log::debug!(
            "{} of {} alignment references are selected transcripts",
            anchors.iter().filter(|x| x.is_some()).count(),
            references.len()
        );

        Ok(Self {
            anchors,
            strandedness: config.strandedness,
            min_length: config.min_length,
            max_length: config.max_length,
            distances: Distances::default(),
        })
    }

    pub fn push(&mut self, alignment: &Alignment) {
        if alignment.unmapped || !is_expected_orientation(alignment, self.strandedness) {
            return;
        }
        let (anchors, start) = match (alignment.reference, alignment.start) {
            (Some(reference), Some(start)) => match self.anchors.get(reference) {
                Some(Some(anchors)) => (*anchors, start),
                _ => return,
            },
            _ => return,
        };

        let length = alignment.length;
        self.distances.lengths.increment(length);
        if length < self.min_length || length > self.max_length {
            return;
        }

        if let Some(distance) = anchors.start_codon.offset_from_start(start) {
            self.distances.start.record(length, distance);
        }
        if let Some(distance) = anchors.stop_codon.offset_from_end(start) {
            self.distances.stop.record(length, distance);
        }
    }

    /// Merge results accumulated over another shard of the same alignment source.
    pub fn merge(&mut self, other: &Accumulator) {
        self.distances.merge(&other.distances);
    }

    pub fn distances(&self) -> &Distances {
        &self.distances
    }

    pub fn finish(self) -> Distances {
        self.distances
    }
}

/// Stream all alignments from the source and build distance histograms.
pub fn accumulate(
    source: &mut impl AlignmentSource,
    selected: &HashSet<String>,
    annotation: &Annotation,
    config: &Config,
) -> Result<Distances> {
    let mut accumulator = Accumulator::new(source.references(), selected, annotation, config)?;

    let mut alignment = Alignment::default();
    let mut processed: u64 = 0;
    while source
        .read_record(&mut alignment)
        .map_err(|err| eyre!("Failed to read {}: {err}", source.filename().display()))?
    {
        accumulator.push(&alignment);
        processed += 1;
    }

    let distances = accumulator.finish();
    log::info!(
        "Processed {processed} alignments from {}: {} on selected transcripts, {} near start codons, {} near stop codons",
        source.filename().display(),
        distances.lengths().total(),
        distances.start().total(),
        distances.stop().total()
    );
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use ahash::HashSetExt;
    use ribobit_core_rs::loc::Strand;

    use super::*;
    use crate::annotation::{Gene, Transcript};

    fn mock() -> Result<(Annotation, HashSet<String>, Vec<String>)> {
        let mut annotation = Annotation::new();
        annotation
            .add_gene(Gene::new("G1", "chr1"))?
            .add_transcript(Transcript::new(
                "T1".to_string(),
                "G1".to_string(),
                1000,
                Some(Interval::new(100, 103)?),
                Some(Interval::new(400, 403)?),
                None,
            ))?
            .add_gene(Gene::new("G2", "chr1"))?
            .add_transcript(Transcript::coding("T2", "G2", 2000, None))?;

        let mut selected = HashSet::new();
        selected.insert("T1".to_string());
        let references = vec!["T1".to_string(), "T2".to_string(), "T3".to_string()];
        Ok((annotation, selected, references))
    }

    fn config(strandedness: Strandedness, min_length: usize, max_length: usize) -> Config {
        let mut config = Config::new();
        config
            .set_strandedness(strandedness)
            .set_length_range(min_length, max_length);
        config
    }

    #[test]
    fn test_histogram_bins() {
        assert_eq!(DistanceHistogram::bin(0), Some(50));
        assert_eq!(DistanceHistogram::bin(-50), Some(0));
        assert_eq!(DistanceHistogram::bin(50), Some(100));
        assert_eq!(DistanceHistogram::bin(-51), None);
        assert_eq!(DistanceHistogram::bin(51), None);

        let mut histogram = DistanceHistogram::default();
        assert!(histogram.record(30, -3));
        assert!(!histogram.record(30, 60));
        assert!(!histogram.record(28, 60));
        assert_eq!(histogram.row(30).unwrap()[47], 1);
        // Rows are allocated only for recorded distances
        assert!(histogram.row(28).is_none());
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_histogram_merge() {
        let mut a = DistanceHistogram::default();
        a.record(30, 0);
        a.record(29, 1);
        let mut b = DistanceHistogram::default();
        b.record(30, 0);
        b.record(31, -1);

        a.merge(&b);
        assert_eq!(a.row(30).unwrap()[50], 2);
        assert_eq!(a.row(29).unwrap()[51], 1);
        assert_eq!(a.row(31).unwrap()[49], 1);
        assert_eq!(a.lengths().collect::<Vec<_>>(), vec![29, 30, 31]);
    }

    #[test]
    fn test_length_counter() {
        let mut counter = LengthCounter::default();
        assert_eq!(counter.share(30), 0.0);
        for length in [28, 30, 30, 30] {
            counter.increment(length);
        }
        assert_eq!(counter.get(30), 3);
        assert_eq!(counter.get(31), 0);
        assert_eq!(counter.total(), 4);
        assert_eq!(counter.share(28), 0.25);
        assert_eq!(counter.iter().collect::<Vec<_>>(), vec![(28, 1), (30, 3)]);
    }

    #[test]
    fn test_expected_orientation() {
        let forward = Alignment::mapped(0, 10, 30, Strand::Forward);
        let reverse = Alignment::mapped(0, 10, 30, Strand::Reverse);
        assert!(is_expected_orientation(&forward, Strandedness::Forward));
        assert!(!is_expected_orientation(&reverse, Strandedness::Forward));
        assert!(is_expected_orientation(&reverse, Strandedness::Reverse));
        assert!(!is_expected_orientation(&forward, Strandedness::Reverse));
        assert!(is_expected_orientation(&forward, Strandedness::Unstranded));
        assert!(is_expected_orientation(&reverse, Strandedness::Unstranded));
    }

    #[test]
    fn test_namespace_mismatch() -> Result<()> {
        let (annotation, selected, _) = mock()?;
        let config = Config::default();

        let genome = vec!["chr1".to_string(), "T1".to_string()];
        let err = Accumulator::new(&genome, &selected, &annotation, &config).unwrap_err();
        assert!(err.to_string().contains("transcriptome BAM"));
        assert!(Accumulator::new(&[], &selected, &annotation, &config).is_err());
        Ok(())
    }

    #[test]
    fn test_accumulator_filters() -> Result<()> {
        let (annotation, selected, references) = mock()?;
        let config = config(Strandedness::Forward, 25, 32);
        let mut accumulator = Accumulator::new(&references, &selected, &annotation, &config)?;

        for alignment in [
            // Kept: both distances are recorded
            Alignment::mapped(0, 97, 30, Strand::Forward),
            // Kept: start only (stop distance -303)
            Alignment::mapped(0, 100, 30, Strand::Forward),
            // Kept: stop only (start distance 290)
            Alignment::mapped(0, 390, 30, Strand::Forward),
            // Kept: counted, but neither distance is in the window
            Alignment::mapped(0, 250, 30, Strand::Forward),
            // Counted, but outside of the length window
            Alignment::mapped(0, 97, 34, Strand::Forward),
            Alignment::mapped(0, 97, 20, Strand::Forward),
            // Discarded: unmapped, antisense, unselected or unknown transcript
            Alignment::unmapped(30),
            Alignment::mapped(0, 97, 30, Strand::Reverse),
            Alignment::mapped(1, 97, 30, Strand::Forward),
            Alignment::mapped(2, 97, 30, Strand::Forward),
            Alignment::mapped(7, 97, 30, Strand::Forward),
            Alignment::new(None, Some(97), 30, Strand::Forward, false),
        ] {
            accumulator.push(&alignment);
        }

        let distances = accumulator.finish();
        assert_eq!(distances.lengths().iter().collect::<Vec<_>>(), vec![(20, 1), (30, 4), (34, 1)]);

        let start = distances.start().row(30).unwrap();
        assert_eq!(start[47], 1);
        assert_eq!(start[50], 1);
        assert_eq!(distances.start().total(), 2);

        // Stop codon [400, 403): 97 - 403 is outside, 390 - 403 = -13
        let stop = distances.stop().row(30).unwrap();
        assert_eq!(stop[37], 1);
        assert_eq!(distances.stop().total(), 1);

        assert!(distances.start().row(34).is_none());
        assert!(distances.start().row(20).is_none());
        assert!(distances.start().total() <= distances.lengths().total());
        Ok(())
    }

    #[test]
    fn test_accumulator_reverse_library() -> Result<()> {
        let (annotation, selected, references) = mock()?;
        let config = config(Strandedness::Reverse, 25, 32);
        let mut accumulator = Accumulator::new(&references, &selected, &annotation, &config)?;
        accumulator.push(&Alignment::mapped(0, 97, 30, Strand::Forward));
        accumulator.push(&Alignment::mapped(0, 98, 30, Strand::Reverse));

        let distances = accumulator.distances();
        assert_eq!(distances.lengths().total(), 1);
        assert_eq!(distances.start().row(30).unwrap()[48], 1);
        Ok(())
    }

    #[test]
    fn test_accumulator_merge_matches_single_pass() -> Result<()> {
        let (annotation, selected, references) = mock()?;
        let config = config(Strandedness::Forward, 25, 32);
        let alignments: Vec<Alignment> = (0..60)
            .map(|i| Alignment::mapped(0, 70 + i, 26 + (i as usize % 6), Strand::Forward))
            .collect();

        let mut single = Accumulator::new(&references, &selected, &annotation, &config)?;
        alignments.iter().for_each(|x| single.push(x));

        let (left, right) = alignments.split_at(25);
        let mut a = Accumulator::new(&references, &selected, &annotation, &config)?;
        left.iter().for_each(|x| a.push(x));
        let mut b = Accumulator::new(&references, &selected, &annotation, &config)?;
        right.iter().for_each(|x| b.push(x));
        a.merge(&b);

        assert_eq!(a.finish(), single.finish());
        Ok(())
    }
}
