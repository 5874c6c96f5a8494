/// Running sum and count of valid values.
///
/// Partials built over disjoint partitions merge by adding sums and counts,
/// so a merged mean divides once at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    /// Add a value; missing and non-finite values are skipped.
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    pub fn merge(&mut self, other: &MeanAccumulator) {
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `None` when nothing valid was pushed.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0)
            .then(|| self.sum / self.count as f64)
            .filter(|m| m.is_finite())
    }
}

impl FromIterator<Option<f64>> for MeanAccumulator {
    fn from_iter<T: IntoIterator<Item = Option<f64>>>(iter: T) -> Self {
        let mut acc = MeanAccumulator::default();
        for v in iter {
            acc.push(v);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_partials_divide_once() {
        let a: MeanAccumulator = [Some(100.0), Some(200.0), Some(300.0)].into_iter().collect();
        let b: MeanAccumulator = [Some(900.0), None].into_iter().collect();
        let mut merged = a;
        merged.merge(&b);
        // (100 + 200 + 300 + 900) / 4, not the mean of 200 and 900
        assert_eq!(merged.mean(), Some(375.0));
        assert_eq!(merged.count(), 4);
    }

    #[test]
    fn empty_has_no_mean() {
        let acc: MeanAccumulator = [None, Some(f64::NAN)].into_iter().collect();
        assert_eq!(acc.mean(), None);
    }
}
