//! Scalar statistics that never fail.
//!
//! Missing values (`None`, NaN) and infinities are dropped before any
//! computation. An empty cleaned input, or a non-finite result, yields `0.0`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::model::SCORE_RANGE;
use crate::error::PanelError;

/// Relative variance below which a sample is treated as constant.
const FLAT_VARIANCE: f64 = 1e-14;

/// A scalar statistic over one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Count,
    Mean,
    Median,
    Min,
    Max,
    /// Sample standard deviation (n − 1).
    #[serde(alias = "std")]
    StdDev,
    /// Adjusted Fisher–Pearson skewness (G1).
    Skewness,
    /// Adjusted Fisher excess kurtosis (G2).
    Kurtosis,
    /// Linear-interpolated percentile, `p` in [0, 100].
    Percentile(f64),
}

impl Statistic {
    /// Compute the statistic, returning `0.0` when it is undefined.
    pub fn compute<I>(self, values: I) -> f64
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut clean = clean(values);
        let result = match self {
            Statistic::Count => clean.len() as f64,
            Statistic::Mean => mean(&clean),
            Statistic::Min => clean.iter().copied().fold(f64::INFINITY, f64::min),
            Statistic::Max => clean.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Statistic::StdDev => std_dev(&clean),
            Statistic::Skewness => skewness(&clean),
            Statistic::Kurtosis => kurtosis(&clean),
            Statistic::Median => {
                sort(&mut clean);
                percentile_sorted(&clean, 50.0)
            }
            Statistic::Percentile(p) => {
                sort(&mut clean);
                percentile_sorted(&clean, p)
            }
        };
        finite_or_zero(result)
    }
}

impl FromStr for Statistic {
    type Err = PanelError;

    /// Accepts `count`, `mean`, `median`, `min`, `max`, `std`/`stddev`/`std_dev`,
    /// `skew`/`skewness`, `kurt`/`kurtosis` and `pNN` percentiles.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let stat = match name.as_str() {
            "count" => Statistic::Count,
            "mean" => Statistic::Mean,
            "median" => Statistic::Median,
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            "std" | "stddev" | "std_dev" => Statistic::StdDev,
            "skew" | "skewness" => Statistic::Skewness,
            "kurt" | "kurtosis" => Statistic::Kurtosis,
            other => other
                .strip_prefix('p')
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| (0.0..=100.0).contains(p))
                .map(Statistic::Percentile)
                .ok_or_else(|| PanelError::UnknownStatistic(s.to_string()))?,
        };
        Ok(stat)
    }
}

/// Compute a statistic by name; unknown names yield `0.0`.
pub fn compute_named<I>(values: I, name: &str) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    match name.parse::<Statistic>() {
        Ok(stat) => stat.compute(values),
        Err(err) => {
            log::debug!("{err}; returning 0.0");
            0.0
        }
    }
}

/// A score if it is finite and inside the exam's score domain.
pub fn valid_score(score: f64) -> Option<f64> {
    let (lo, hi) = SCORE_RANGE;
    (score.is_finite() && (lo..=hi).contains(&score)).then_some(score)
}

/// Pearson correlation of paired values; `0.0` when undefined.
pub fn correlation<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    finite_or_zero(sxy / (sxx.sqrt() * syy.sqrt()))
}

// -- helpers shared with `summary` --

pub(crate) fn clean<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().filter(|v| v.is_finite()).collect()
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub(crate) fn sort(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Central moments m2, m3, m4 (population, divided by n).
fn central_moments(values: &[f64]) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let m = mean(values);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Variance negligible next to the squared mean. Scale-free, so samples of
/// tiny magnitude keep their shape statistics.
fn is_flat(values: &[f64], m2: f64) -> bool {
    let m = mean(values);
    m2 <= FLAT_VARIANCE * m * m
}

pub(crate) fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    let (m2, m3, _) = central_moments(values);
    if is_flat(values, m2) {
        return 0.0;
    }
    let n = n as f64;
    let g1 = m3 / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

pub(crate) fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return 0.0;
    }
    let (m2, _, m4) = central_moments(values);
    if is_flat(values, m2) {
        return 0.0;
    }
    let n = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
}

/// Percentile of an ascending slice with linear interpolation between ranks.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return 0.0;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
