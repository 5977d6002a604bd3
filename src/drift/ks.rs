//! Two-sample Kolmogorov–Smirnov test, two-sided.
//!
//! The statistic is the largest vertical gap between the two empirical CDFs.
//! The p-value comes from the exact permutation distribution of that gap
//! when the lattice of sample sizes is small enough to walk, and from the
//! limiting Kolmogorov distribution otherwise.

use crate::error::Inconclusive;
use serde::{Deserialize, Serialize};

/// Largest `n * m` for which the exact null distribution is computed.
pub const EXACT_CELL_LIMIT: u64 = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsOutcome {
    /// sup |F_a(x) - F_b(x)|, in [0, 1]
    pub statistic: f64,
    /// P(D >= statistic) under the null, in [0, 1]
    pub p_value: f64,
    pub method: PValueMethod,
}

/// Run the test on two samples in any order.
pub fn ks_2samp(a: &[f64], b: &[f64]) -> Result<KsOutcome, Inconclusive> {
    let a = prepare(a)?;
    let b = prepare(b)?;
    let d = statistic_sorted(&a, &b);
    let (p_value, method) = p_value(a.len(), b.len(), d);
    Ok(KsOutcome {
        statistic: d,
        p_value,
        method,
    })
}

/// Same as [`ks_2samp`] with `a` already sorted ascending (a baseline sample).
pub fn ks_2samp_presorted(a: &[f64], b: &[f64]) -> Result<KsOutcome, Inconclusive> {
    check(a)?;
    let b = prepare(b)?;
    let d = statistic_sorted(a, &b);
    let (p_value, method) = p_value(a.len(), b.len(), d);
    Ok(KsOutcome {
        statistic: d,
        p_value,
        method,
    })
}

fn check(x: &[f64]) -> Result<(), Inconclusive> {
    if x.len() < 2 {
        return Err(Inconclusive::TooFewPoints);
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Inconclusive::NonFinite);
    }
    Ok(())
}

fn prepare(x: &[f64]) -> Result<Vec<f64>, Inconclusive> {
    check(x)?;
    let mut v = x.to_vec();
    v.sort_by(f64::total_cmp);
    Ok(v)
}

/// Gap between the empirical CDFs of two sorted samples. Ties advance both
/// sides together so the CDFs are compared only at jump points.
pub fn statistic_sorted(a: &[f64], b: &[f64]) -> f64 {
    let (n, m) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }
    d.clamp(0.0, 1.0)
}

fn p_value(n: usize, m: usize, d: f64) -> (f64, PValueMethod) {
    if d <= 0.0 {
        return (1.0, PValueMethod::Exact);
    }
    if (n as u64).saturating_mul(m as u64) <= EXACT_CELL_LIMIT {
        (exact_sf(n, m, d), PValueMethod::Exact)
    } else {
        let en = ((n * m) as f64 / (n + m) as f64).sqrt();
        (kolmogorov_sf(en * d), PValueMethod::Asymptotic)
    }
}

/// P(D >= d) for sample sizes `n`, `m`.
///
/// Counts monotone lattice paths from (0, 0) to (n, m) that stay strictly
/// inside |i/n - j/m| < d. Each cell holds the fraction of paths reaching it
/// that stayed inside, which keeps every value in [0, 1] instead of carrying
/// binomial path counts.
fn exact_sf(n: usize, m: usize, d: f64) -> f64 {
    // d is a multiple of 1/(n*m) up to rounding; compare on integers.
    let nm = (n as i64) * (m as i64);
    let bound = (d * nm as f64).round() as i64;
    let inside = |i: usize, j: usize| ((i as i64) * (m as i64) - (j as i64) * (n as i64)).abs() < bound;

    let mut row = vec![0.0f64; m + 1];
    row[0] = 1.0;
    for j in 1..=m {
        row[j] = if inside(0, j) { row[j - 1] } else { 0.0 };
    }
    for i in 1..=n {
        if !inside(i, 0) {
            row[0] = 0.0;
        }
        for j in 1..=m {
            if !inside(i, j) {
                row[j] = 0.0;
                continue;
            }
            let t = (i + j) as f64;
            row[j] = row[j] * (i as f64 / t) + row[j - 1] * (j as f64 / t);
        }
    }
    (1.0 - row[m]).clamp(0.0, 1.0)
}

/// Survival function of the Kolmogorov distribution, Q(x) = P(K > x).
pub fn kolmogorov_sf(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < 1.18 {
        // Jacobi theta form converges fast for small x.
        let pi2 = std::f64::consts::PI * std::f64::consts::PI;
        let w = (2.0 * std::f64::consts::PI).sqrt() / x;
        let mut cdf = 0.0;
        for k in 1..=20 {
            let odd = (2 * k - 1) as f64;
            cdf += (-odd * odd * pi2 / (8.0 * x * x)).exp();
        }
        return (1.0 - w * cdf).clamp(0.0, 1.0);
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * x * x).exp();
        sum += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
