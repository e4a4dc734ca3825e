//! Statistical tests used by the drift checks

use std::cmp::Ordering;

/// Two-sample Kolmogorov-Smirnov result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    /// Largest distance between the two empirical CDFs
    pub statistic: f64,
    /// Asymptotic two-sided p-value
    pub p_value: f64,
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Two-sample KS test. Both samples must be non-empty.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> KsResult {
    let a = sorted(reference);
    let b = sorted(current);
    let (n, m) = (a.len(), b.len());

    let (mut i, mut j) = (0, 0);
    let mut statistic: f64 = 0.0;
    while i < n && j < m {
        let x = a[i].min(b[j]);
        while i < n && a[i] <= x {
            i += 1;
        }
        while j < m && b[j] <= x {
            j += 1;
        }
        statistic = statistic.max((i as f64 / n as f64 - j as f64 / m as f64).abs());
    }

    let effective = (n * m) as f64 / (n + m) as f64;
    let sqrt_en = effective.sqrt();
    let lambda = (sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic;

    KsResult {
        statistic,
        p_value: kolmogorov_survival(lambda),
    }
}

/// Q_KS(lambda) = 2 * sum_{k>=1} (-1)^(k-1) exp(-2 k^2 lambda^2)
fn kolmogorov_survival(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous_term: f64 = 0.0;

    for k in 1..=100 {
        let k = k as f64;
        let term = sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= 0.001 * previous_term || term.abs() <= 1.0e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous_term = term.abs();
    }
    // series did not converge: lambda is close to zero
    1.0
}

/// First Wasserstein distance between two empirical distributions.
pub fn wasserstein_distance(reference: &[f64], current: &[f64]) -> f64 {
    let a = sorted(reference);
    let b = sorted(current);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut all: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    all.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));

    let cdf = |sample: &[f64], x: f64| sample.partition_point(|v| *v <= x) as f64 / sample.len() as f64;

    all.windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (cdf(&a, w[0]) - cdf(&b, w[0])).abs() * delta
        })
        .sum()
}

/// Wasserstein distance scaled by the reference spread.
pub fn normed_wasserstein(reference: &[f64], current: &[f64]) -> f64 {
    let norm = std_dev(reference).max(0.001);
    wasserstein_distance(reference, current) / norm
}

/// Jensen-Shannon distance (base 2) between two discrete distributions over
/// the same support. Result lies in [0, 1].
pub fn jensen_shannon_distance(p: &[f64], q: &[f64]) -> f64 {
    let normalise = |d: &[f64]| {
        let total: f64 = d.iter().sum();
        if total > 0.0 {
            d.iter().map(|v| v / total).collect::<Vec<_>>()
        } else {
            d.to_vec()
        }
    };
    let p = normalise(p);
    let q = normalise(q);

    let kl = |x: &[f64], m: &[f64]| -> f64 {
        x.iter()
            .zip(m)
            .filter(|(xi, _)| **xi > 0.0)
            .map(|(xi, mi)| xi * (xi / mi).log2())
            .sum()
    };

    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| (a + b) / 2.0).collect();
    let divergence = (kl(&p, &m) + kl(&q, &m)) / 2.0;
    divergence.max(0.0).sqrt().min(1.0)
}
