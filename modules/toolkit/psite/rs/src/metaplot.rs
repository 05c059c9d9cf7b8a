use std::collections::BTreeMap;

use derive_getters::{Dissolve, Getters};
use itertools::Itertools;

use crate::distance::{Distances, BINS, WINDOW};
use crate::report::percent;

const TICKS: [i64; 5] = [-40, -20, 0, 20, 40];

/// Everything needed to draw the start/stop codon metaplot of a single read length.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct MetaplotPage {
    length: usize,
    library_share: f64,
    start: [u64; BINS],
    stop: [u64; BINS],
    /// Predefined P-site offset, if any.
    psite: Option<i64>,
    /// Sorted x-axis ticks. The P-site position relative to the start codon is included.
    ticks: Vec<i64>,
}

impl MetaplotPage {
    /// X coordinates of the histogram bins, i.e. distances -50..=50.
    pub fn distances() -> impl Iterator<Item = i64> {
        -(WINDOW as i64)..=WINDOW as i64
    }

    /// Reading frame of every bin relative to the start codon (0 for the codon itself).
    pub fn frames() -> impl Iterator<Item = usize> {
        Self::distances().map(|d| d.rem_euclid(3) as usize)
    }

    pub fn title(&self) -> String {
        format!(
            "({} nt reads,proportion:{})",
            self.length,
            percent(self.library_share)
        )
    }
}

/// Plotting hand-off: one page per read length observed near either codon, plus the read length
/// distribution of the whole library.
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Getters)]
pub struct Metaplot {
    pages: Vec<MetaplotPage>,
    length_distribution: Vec<(usize, u64)>,
}

impl Metaplot {
    pub fn new(distances: &Distances, psites: &BTreeMap<usize, i64>) -> Self {
        let lengths = distances
            .start()
            .lengths()
            .merge(distances.stop().lengths())
            .dedup();

        let pages = lengths
            .map(|length| {
                let psite = psites.get(&length).copied();
                let mut ticks = TICKS.to_vec();
                if let Some(offset) = psite {
                    ticks.push(-offset);
                    ticks.sort();
                }
                MetaplotPage {
                    length,
                    library_share: distances.lengths().share(length),
                    start: distances.start().row(length).copied().unwrap_or([0; BINS]),
                    stop: distances.stop().row(length).copied().unwrap_or([0; BINS]),
                    psite,
                    ticks,
                }
            })
            .collect();

        Self {
            pages,
            length_distribution: distances.lengths().iter().collect(),
        }
    }
}
