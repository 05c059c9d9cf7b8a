use derive_getters::Dissolve;
use eyre::{ensure, Result};

use ribobit_core_rs::ngs::Strandedness;

use crate::report::Layout;

/// Acceptance thresholds applied to each read length.
#[derive(Clone, PartialEq, Debug, Dissolve)]
pub struct Thresholds {
    /// Minimum number of alignments in the start codon window and in frame 0 after trimming.
    pub min_count: u64,
    /// Minimum fraction of in-frame reads, f0 / (f0 + f1 + f2).
    pub frame0_percent: f64,
    /// Maximum p-value for frame 0 > frame 1.
    pub pvalue1_cutoff: f64,
    /// Maximum p-value for frame 0 > frame 2.
    pub pvalue2_cutoff: f64,
    /// Minimum share of all alignments for an accepted length to become a predefined P-site.
    pub min_library_share: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_count: 10,
            frame0_percent: 0.65,
            pvalue1_cutoff: 0.001,
            pvalue2_cutoff: 0.001,
            min_library_share: 0.05,
        }
    }
}

impl Thresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_min_count(&mut self, min_count: u64) -> &mut Self {
        self.min_count = min_count;
        self
    }

    pub fn set_frame0_percent(&mut self, frame0_percent: f64) -> &mut Self {
        self.frame0_percent = frame0_percent;
        self
    }

    pub fn set_pvalue_cutoffs(&mut self, pvalue1: f64, pvalue2: f64) -> &mut Self {
        self.pvalue1_cutoff = pvalue1;
        self.pvalue2_cutoff = pvalue2;
        self
    }

    pub fn set_min_library_share(&mut self, min_library_share: f64) -> &mut Self {
        self.min_library_share = min_library_share;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("frame0_percent", self.frame0_percent),
            ("pvalue1_cutoff", self.pvalue1_cutoff),
            ("pvalue2_cutoff", self.pvalue2_cutoff),
            ("min_library_share", self.min_library_share),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "'{name}' must be within [0, 1], got {value}"
            );
        }
        Ok(())
    }
}

/// Parameters of a single P-site estimation run.
#[derive(Clone, PartialEq, Debug, Dissolve)]
pub struct Config {
    pub strandedness: Strandedness,
    /// Read lengths outside [min_length, max_length] are counted but not placed in histograms.
    pub min_length: usize,
    pub max_length: usize,
    pub thresholds: Thresholds,
    /// Layout of the `_pre_config.txt` report.
    pub layout: Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strandedness: Strandedness::Forward,
            min_length: 24,
            max_length: 35,
            thresholds: Thresholds::default(),
            layout: Layout::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_strandedness(&mut self, strandedness: Strandedness) -> &mut Self {
        self.strandedness = strandedness;
        self
    }

    pub fn set_length_range(&mut self, min_length: usize, max_length: usize) -> &mut Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> &mut Self {
        self.thresholds = thresholds;
        self
    }

    pub fn set_layout(&mut self, layout: Layout) -> &mut Self {
        self.layout = layout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_length <= self.max_length,
            "Minimum read length ({}) must not exceed the maximum read length ({})",
            self.min_length,
            self.max_length
        );
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.min_count, 10);
        assert_eq!(config.thresholds.min_library_share, 0.05);
        assert_eq!(config.strandedness, Strandedness::Forward);
        assert_eq!(config.layout, Layout::Classic);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = Config::new();
        config.set_length_range(30, 25);
        assert!(config.validate().is_err());

        let mut thresholds = Thresholds::new();
        thresholds.set_frame0_percent(1.5);
        assert!(thresholds.validate().is_err());

        let mut thresholds = Thresholds::new();
        thresholds.set_pvalue_cutoffs(0.01, -0.1);
        assert!(Config::new()
            .set_thresholds(thresholds)
            .validate()
            .is_err());
    }
}
