//! # Descriptive Statistics
//!
//! Small numeric helpers shared by the reports: means, min/max summaries,
//! five-number summaries, equal-width histograms and string tallies.

use std::collections::BTreeMap;

use serde::Serialize;

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// `part / whole * 100`, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Count, min, max and mean of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    /// Sample size.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl Distribution {
    /// Summarise `values`; `None` for an empty sample.
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let (min, max) = values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            count: values.len(),
            min,
            max,
            mean: mean(values),
        })
    }
}

/// Five-number summary plus mean, the data behind a box plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    /// Sample size.
    pub n: usize,
    /// Smallest value.
    pub min: f64,
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl FiveNumberSummary {
    /// Summarise `values`; `None` for an empty sample.
    ///
    /// Quartiles use linear interpolation between closest ranks.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            n: sorted.len(),
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted),
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// One histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub start: f64,
    /// Upper edge.
    pub end: f64,
    /// Values falling in the bin.
    pub count: usize,
}

/// Equal-width histogram over the sample range.
///
/// A constant sample is spread over `[v - 0.5, v + 0.5]`. Returns an empty
/// vector for an empty sample or zero bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some(dist) = Distribution::of(values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if dist.min == dist.max {
        (dist.min - 0.5, dist.max + 0.5)
    } else {
        (dist.min, dist.max)
    };
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Occurrence counts keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, usize>);

impl Tally {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`.
    pub fn add(&mut self, label: impl Into<String>) {
        *self.0.entry(label.into()).or_insert(0) += 1;
    }

    /// Occurrences of `label`.
    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// True when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in label order.
    pub fn by_label(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Entries by descending count, label order for ties.
    pub fn by_count(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.by_label().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<S: Into<String>> FromIterator<S> for Tally {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tally = Self::new();
        for label in iter {
            tally.add(label);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn percent_handles_zero_whole() {
        assert_eq!(percent(1, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn distribution_min_max_mean() {
        let d = Distribution::of(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(d.count, 3);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 3.0);
        assert_eq!(d.mean, 2.0);
        assert!(Distribution::of(&[]).is_none());
    }

    #[test]
    fn five_number_summary_interpolates() {
        let s = FiveNumberSummary::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
    }

    #[test]
    fn five_number_summary_single_value() {
        let s = FiveNumberSummary::of(&[7.0]).unwrap();
        assert_eq!((s.min, s.q1, s.median, s.q3, s.max), (7.0, 7.0, 7.0, 7.0, 7.0));
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        // The maximum lands in the closed last bin.
        assert_eq!(bins[3].count, 2);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 4.0);
    }

    #[test]
    fn histogram_constant_sample() {
        let bins = histogram(&[2.0, 2.0], 2);
        assert_eq!(bins[0].start, 1.5);
        assert_eq!(bins[1].end, 2.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_empty() {
        assert!(histogram(&[], 5).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());
    }

    #[test]
    fn tally_orders_by_count_then_label() {
        let tally: Tally = ["b", "a", "b", "c", "a", "b"].into_iter().collect();
        assert_eq!(tally.by_count(), vec![("b", 3), ("a", 2), ("c", 1)]);
        assert_eq!(tally.get("a"), 2);
        assert_eq!(tally.get("z"), 0);
        assert_eq!(tally.by_label().count(), 3);
    }
}
