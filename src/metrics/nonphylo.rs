//! Tree-free distance transforms on sample-major count matrices.
//!
//! Each `dist_*` / `binary_dist_*` function takes a `[sample, taxon]` matrix
//! and returns the square, symmetric, zero-diagonal `[sample, sample]`
//! distance matrix. Binary variants first reduce counts to presence/absence.
//! Wherever a denominator is zero, the distance is 0.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Fills a distance matrix from a function of two sample rows.
///
/// Only the upper triangle is computed; it is mirrored to the lower one so
/// that the result is symmetric by construction.
pub(crate) fn pairwise<F>(data: ArrayView2<'_, f64>, pair: F) -> Array2<f64>
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64,
{
    let n = data.nrows();
    let mut distances = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = pair(data.row(i), data.row(j));
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

/// `numerator / denominator`, or 0 if the denominator is 0.
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

/// Presence (1) / absence (0) matrix.
fn to_binary(data: ArrayView2<'_, f64>) -> Array2<f64> {
    data.mapv(|x| if x > 0.0 { 1.0 } else { 0.0 })
}

/// Each row divided by its total; all-zero rows stay zero.
fn row_profiles(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut profiles = data.to_owned();
    for mut row in profiles.rows_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        }
    }
    profiles
}

// ============================================================================
// Quantitative metrics
// ============================================================================
pub fn dist_euclidean(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| x.iter().zip(y).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt())
}

pub fn dist_manhattan(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum())
}

/// Bray-Curtis: `sum |x - y| / sum (x + y)`.
pub fn dist_bray_curtis(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| {
        let (diff, total) = x
            .iter()
            .zip(y)
            .fold((0.0, 0.0), |(d, t), (a, b)| (d + (a - b).abs(), t + a + b));
        ratio_or_zero(diff, total)
    })
}

/// Canberra, averaged over the taxa present in at least one of the two samples.
pub fn dist_canberra(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| {
        let (sum, shared) = x
            .iter()
            .zip(y)
            .filter(|&(a, b)| a + b > 0.0)
            .fold((0.0, 0usize), |(s, n), (a, b)| (s + (a - b).abs() / (a + b), n + 1));
        ratio_or_zero(sum, shared as f64)
    })
}

/// Chi-square distance; weights taxa by their share of the whole table.
pub fn dist_chisq(data: ArrayView2<'_, f64>) -> Array2<f64> {
    chisq(data)
}

/// Gower distance; each taxon is scaled by its range across the whole table.
pub fn dist_gower(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let ranges: Array1<f64> = data
        .axis_iter(Axis(1))
        .map(|column| {
            let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = column.iter().copied().fold(f64::INFINITY, f64::min);
            max - min
        })
        .collect();

    pairwise(data, |x, y| {
        x.iter()
            .zip(y)
            .zip(&ranges)
            .map(|((a, b), range)| ratio_or_zero((a - b).abs(), *range))
            .sum()
    })
}

/// Hellinger: euclidean distance of square-rooted relative abundances.
pub fn dist_hellinger(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let roots = row_profiles(data).mapv(f64::sqrt);
    dist_euclidean(roots.view())
}

/// Kulczynski: `1 - (W/A + W/B) / 2` with `W = sum min(x, y)`.
pub fn dist_kulczynski(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| {
        let (a, b) = (x.sum(), y.sum());
        if a == 0.0 && b == 0.0 {
            return 0.0;
        }
        let w: f64 = x.iter().zip(y).map(|(p, q)| p.min(*q)).sum();
        1.0 - 0.5 * (ratio_or_zero(w, a) + ratio_or_zero(w, b))
    })
}

pub fn dist_morisita_horn(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| {
        let (sum_x, sum_y) = (x.sum(), y.sum());
        if sum_x == 0.0 || sum_y == 0.0 {
            return 0.0;
        }
        let lambda_x = x.dot(&x) / (sum_x * sum_x);
        let lambda_y = y.dot(&y) / (sum_y * sum_y);
        let denominator = (lambda_x + lambda_y) * sum_x * sum_y;
        1.0 - ratio_or_zero(2.0 * x.dot(&y), denominator)
    })
}

/// `1 - r` with `r` the Pearson correlation of the two samples.
pub fn dist_pearson(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, pearson_distance)
}

/// Soergel: `sum |x - y| / sum max(x, y)`.
pub fn dist_soergel(data: ArrayView2<'_, f64>) -> Array2<f64> {
    pairwise(data, |x, y| {
        let (diff, max) = x
            .iter()
            .zip(y)
            .fold((0.0, 0.0), |(d, m), (a, b)| (d + (a - b).abs(), m + a.max(*b)));
        ratio_or_zero(diff, max)
    })
}

/// Species profile: euclidean distance of relative abundances.
pub fn dist_specprof(data: ArrayView2<'_, f64>) -> Array2<f64> {
    dist_euclidean(row_profiles(data).view())
}

// ============================================================================
// Binary (presence/absence) metrics
// ============================================================================
/// Counts of taxa present in both (`a`), only the first (`b`), only the
/// second (`c`) and neither (`d`) of two presence/absence rows.
struct Contingency {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Contingency {
    fn of(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Self {
        let mut table = Contingency {
            a: 0.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        };
        for (p, q) in x.iter().zip(y) {
            match (*p > 0.0, *q > 0.0) {
                (true, true) => table.a += 1.0,
                (true, false) => table.b += 1.0,
                (false, true) => table.c += 1.0,
                (false, false) => table.d += 1.0,
            }
        }
        table
    }
}

fn binary_pairwise<F: Fn(Contingency) -> f64>(data: ArrayView2<'_, f64>, f: F) -> Array2<f64> {
    pairwise(data, |x, y| f(Contingency::of(x, y)))
}

/// Chi-square distance on presence/absence data.
pub fn binary_dist_chisq(data: ArrayView2<'_, f64>) -> Array2<f64> {
    chisq(to_binary(data).view())
}

pub fn binary_dist_euclidean(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| (t.b + t.c).sqrt())
}

/// Number of taxa present in exactly one of the two samples.
pub fn binary_dist_hamming(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| t.b + t.c)
}

pub fn binary_dist_jaccard(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| ratio_or_zero(t.b + t.c, t.a + t.b + t.c))
}

/// Lennon's beta_sim: `1 - a / (a + min(b, c))`.
pub fn binary_dist_lennon(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| {
        let denominator = t.a + t.b.min(t.c);
        if denominator == 0.0 { 0.0 } else { 1.0 - t.a / denominator }
    })
}

pub fn binary_dist_ochiai(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| {
        let denominator = ((t.a + t.b) * (t.a + t.c)).sqrt();
        if denominator == 0.0 { 0.0 } else { 1.0 - t.a / denominator }
    })
}

/// `1 - phi`, the Pearson correlation of two presence/absence vectors.
pub fn binary_dist_pearson(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| {
        let denominator = ((t.a + t.b) * (t.c + t.d) * (t.a + t.c) * (t.b + t.d)).sqrt();
        if denominator == 0.0 {
            0.0
        } else {
            1.0 - (t.a * t.d - t.b * t.c) / denominator
        }
    })
}

pub fn binary_dist_sorensen_dice(data: ArrayView2<'_, f64>) -> Array2<f64> {
    binary_pairwise(data, |t| ratio_or_zero(t.b + t.c, 2.0 * t.a + t.b + t.c))
}

// ============================================================================
// Shared
// ============================================================================
/// Chi-square distance between row profiles, weighted by inverse column totals.
fn chisq(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let grand_total = data.sum();
    let column_totals = data.sum_axis(Axis(0));
    let profiles = row_profiles(data);

    pairwise(profiles.view(), |x, y| {
        let weighted: f64 = x
            .iter()
            .zip(y)
            .zip(&column_totals)
            .map(|((a, b), total)| ratio_or_zero((a - b).powi(2), *total))
            .sum();
        (grand_total * weighted).sqrt()
    })
}

fn pearson_distance(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let (mean_x, mean_y) = (x.sum() / n, y.sum() / n);
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 { 0.0 } else { 1.0 - cov / denominator }
}
