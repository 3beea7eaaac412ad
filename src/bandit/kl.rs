//! Bernoulli KL-divergence machinery shared by every bandit in this module:
//! the exploration rate β(t,δ), and numeric inversion of the KL divergence
//! to get upper/lower confidence bounds on a Bernoulli mean.

use crate::instance::Confidence;
use crate::instance::Precision;
use crate::instance::Tolerance;

const BISECTION_ITERATIONS: u32 = 16;

/// exploration-rate constants from Kaufmann & Kalyanakrishnan (2013), as
/// used in the Ribeiro et al. reference anchor implementation.
const EXPLORATION_ALPHA: f64 = 1.1;
const EXPLORATION_K1: f64 = 405.5;

fn clamp_unit(x: f64) -> f64 {
    x.clamp(1e-15, 1.0 - 1e-15)
}

/// Bernoulli KL divergence, KL(p || q).
pub fn kl_bernoulli(p: Precision, q: Precision) -> f64 {
    let p = clamp_unit(p);
    let q = clamp_unit(q);
    p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln()
}

/// the exploration rate β(n, t, δ) = log(k1 · n · t^α / δ), where `n` is the
/// number of candidates under consideration and `t` the current pull round.
pub fn exploration_rate(n_candidates: usize, t: u64, delta: Confidence) -> f64 {
    let n = n_candidates.max(1) as f64;
    let t = t.max(1) as f64;
    (EXPLORATION_K1 * n * t.powf(EXPLORATION_ALPHA) / delta).ln()
}

/// upper inversion: the largest q >= p with KL(p, q) <= level, found by
/// bisecting a seed interval and narrowing for a fixed iteration count.
pub fn dup_bernoulli(p: Precision, level: f64) -> f64 {
    let mut lower = p;
    let mut upper = (p + (level / 2.0).sqrt()).min(1.0).max(0.0);
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (upper + lower) / 2.0;
        if kl_bernoulli(p, mid) > level {
            upper = mid;
        } else {
            lower = mid;
        }
    }
    upper
}

/// lower inversion: the smallest q <= p with KL(p, q) <= level.
pub fn dlow_bernoulli(p: Precision, level: f64) -> f64 {
    let mut upper = p;
    let mut lower = (p - (level / 2.0).sqrt()).max(0.0).min(1.0);
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (upper + lower) / 2.0;
        if kl_bernoulli(p, mid) > level {
            lower = mid;
        } else {
            upper = mid;
        }
    }
    lower
}

/// upper confidence bound on the precision of an arm pulled `n` times with
/// empirical precision `p`, at exploration level β.
pub fn upper_bound(p: Precision, n: u64, n_candidates: usize, t: u64, delta: Confidence) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let level = exploration_rate(n_candidates, t, delta) / n as f64;
    dup_bernoulli(p, level)
}

/// lower confidence bound on the precision of an arm pulled `n` times with
/// empirical precision `p`, at exploration level β.
pub fn lower_bound(p: Precision, n: u64, n_candidates: usize, t: u64, delta: Confidence) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let level = exploration_rate(n_candidates, t, delta) / n as f64;
    dlow_bernoulli(p, level)
}

/// how many candidates remain within `tolerance` of separating, used by
/// KL-LUCB's stopping rule.
pub fn separated(upper: f64, lower: f64, tolerance: Tolerance) -> bool {
    upper - lower < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kl_sanity() {
        assert!((kl_bernoulli(1.0, 0.5) - 0.6931471805).abs() < 1e-9);
        assert!((kl_bernoulli(1.0, 0.25) - 1.3862943611).abs() < 1e-9);
        assert!((kl_bernoulli(0.549019, 0.378981) - 0.0592067).abs() < 1e-6);
    }

    #[test]
    fn upper_inversion_matches_reference() {
        assert!((dup_bernoulli(0.2, 1.3926867786) - 0.9037841797).abs() < 1e-7);
        assert!((dup_bernoulli(0.4, 0.2458933742) - 0.7343833193).abs() < 1e-7);
    }

    #[test]
    fn lower_inversion_matches_reference() {
        assert!((dlow_bernoulli(1.0, 2.9957322735) - 0.04998779296875).abs() < 1e-12);
        assert!((dlow_bernoulli(0.5, 2.32114463107) - 0.002410888671875).abs() < 1e-12);
    }

    #[test]
    fn exploration_rate_increases_with_t_and_candidate_count() {
        let small = exploration_rate(2, 1, 0.1);
        let more_candidates = exploration_rate(20, 1, 0.1);
        let more_rounds = exploration_rate(2, 50, 0.1);
        assert!(more_candidates > small);
        assert!(more_rounds > small);
    }

    #[test]
    fn bounds_sandwich_empirical_precision() {
        let p = 0.7;
        let n = 200;
        let up = upper_bound(p, n, 10, 5, 0.1);
        let low = lower_bound(p, n, 10, 5, 0.1);
        assert!(low <= p);
        assert!(up >= p);
    }
}
