/// Equal-width 1-D histogram over `[min, max]`. Every bin is
/// half-open except the last, which also holds the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Observed value range; a degenerate sample is widened by 0.5 on each side.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    if lo == hi {
        Some((lo - 0.5, hi + 0.5))
    } else {
        Some((lo, hi))
    }
}

fn linspace(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    (0..=bins)
        .map(|i| lo + (hi - lo) * i as f64 / bins as f64)
        .collect()
}

fn bin_index(value: f64, lo: f64, hi: f64, bins: usize) -> usize {
    let idx = ((value - lo) / (hi - lo) * bins as f64).floor() as usize;
    idx.min(bins - 1)
}

/// Bin finite `values` into `bins` equal-width buckets. `None` for an empty
/// sample or zero bins.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = span(finite())?;
    let mut counts = vec![0; bins];
    for v in finite() {
        counts[bin_index(v, lo, hi, bins)] += 1;
    }
    Some(Histogram {
        edges: linspace(lo, hi, bins),
        counts,
    })
}

/// Equal-width 2-D histogram; `counts[y][x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2d {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub counts: Vec<Vec<usize>>,
}

impl Grid2d {
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

pub fn histogram_2d(points: &[(f64, f64)], x_bins: usize, y_bins: usize) -> Option<Grid2d> {
    if x_bins == 0 || y_bins == 0 {
        return None;
    }
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let (x_lo, x_hi) = span(finite.iter().map(|p| p.0))?;
    let (y_lo, y_hi) = span(finite.iter().map(|p| p.1))?;
    let mut counts = vec![vec![0; x_bins]; y_bins];
    for (x, y) in finite {
        let xi = bin_index(x, x_lo, x_hi, x_bins);
        let yi = bin_index(y, y_lo, y_hi, y_bins);
        counts[yi][xi] += 1;
    }
    Some(Grid2d {
        x_edges: linspace(x_lo, x_hi, x_bins),
        y_edges: linspace(y_lo, y_hi, y_bins),
        counts,
    })
}

/// Assign each value to one of `bins` equal-width, right-closed intervals
/// spanning the observed range. The lowest edge is pushed
/// down by 0.1 % of the range so the minimum lands in the first bin.
pub fn cut_equal_width(values: &[Option<f64>], bins: usize) -> Vec<Option<usize>> {
    let observed = values.iter().flatten().copied().filter(|v| v.is_finite());
    let (mut lo, mut hi) = observed.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if bins == 0 || !lo.is_finite() {
        return vec![None; values.len()];
    }
    let mut edges;
    if lo == hi {
        let pad = if lo == 0.0 { 0.001 } else { 0.001 * lo.abs() };
        lo -= pad;
        hi += pad;
        edges = linspace(lo, hi, bins);
    } else {
        edges = linspace(lo, hi, bins);
        edges[0] -= (hi - lo) * 0.001;
    }
    values
        .iter()
        .map(|v| {
            let v = (*v)?;
            (0..bins).find(|&i| edges[i] < v && v <= edges[i + 1])
        })
        .collect()
}
