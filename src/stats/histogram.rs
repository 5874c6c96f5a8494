use serde::Serialize;

/// One equal-width histogram bin, `[start, end)`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Count finite values into `bins` equal-width bins over `range`.
///
/// Values outside the range are ignored. A zero bin count or an empty or
/// non-finite range yields no bins.
pub fn histogram<I>(values: I, bins: usize, range: (f64, f64)) -> Vec<Bin>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (lo, hi) = range;
    if bins == 0 || !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return Vec::new();
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0u64; bins];

    for v in values.into_iter().flatten() {
        if !v.is_finite() || v < lo || v > hi {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
