use std::cmp::Ordering;

use derive_getters::{Dissolve, Getters};
use itertools::Itertools;

/// Complementary error function, Chebyshev fit with fractional error below 1.2e-7 everywhere.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let r = t * (-z * z + poly).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Survival function of the standard normal distribution, P(Z > z).
pub fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Outcome of a one-sided test.
#[derive(Clone, Copy, PartialEq, Debug, Dissolve, Getters)]
pub struct TestResult {
    statistic: f64,
    zscore: f64,
    pvalue: f64,
}

/// One-sided Wilcoxon signed-rank test of `x > y` for paired samples, normal approximation.
///
/// Zero differences are discarded and tied absolute differences get average ranks, with the
/// matching variance correction. Without any non-zero difference there is no evidence at all:
/// the p-value is 1 and the z-score is negative infinity.
pub fn wilcoxon_greater(x: &[u64], y: &[u64]) -> TestResult {
    let differences = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| *a as f64 - *b as f64)
        .filter(|d| *d != 0.0)
        .sorted_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
        .collect_vec();

    let n = differences.len() as f64;
    if differences.is_empty() {
        return TestResult {
            statistic: 0.0,
            zscore: f64::NEG_INFINITY,
            pvalue: 1.0,
        };
    }

    // Walk over groups of tied absolute values, ranks are 1-based
    let mut statistic = 0.0;
    let mut ties = 0.0;
    let mut rank = 1.0;
    for (_, group) in &differences.iter().chunk_by(|d| d.abs().to_bits()) {
        let group = group.collect_vec();
        let size = group.len() as f64;
        let average = rank + (size - 1.0) / 2.0;
        statistic += average * group.iter().filter(|d| ***d > 0.0).count() as f64;
        ties += size * size * size - size;
        rank += size;
    }

    let mean = n * (n + 1.0) / 4.0;
    let variance = (n * (n + 1.0) * (2.0 * n + 1.0) - 0.5 * ties) / 24.0;
    let zscore = (statistic - mean) / variance.sqrt();
    TestResult {
        statistic,
        zscore,
        pvalue: normal_sf(zscore),
    }
}

/// Stouffer's method: combine z-scores of independent one-sided tests into a single p-value.
pub fn stouffer(zscores: &[f64]) -> f64 {
    if zscores.is_empty() {
        return 1.0;
    }
    let combined = zscores.iter().sum::<f64>() / (zscores.len() as f64).sqrt();
    normal_sf(combined)
}
