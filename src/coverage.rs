use crate::errors::AnchorError;
use crate::instance::Coverage;
use crate::instance::FeatureIndex;
use crate::traits::PerturbationFunction;
use std::collections::BTreeSet;

/// estimates Pr[A(z)], the fraction of the perturbation distribution that a
/// feature-set `A` actually covers.
#[derive(Clone)]
pub enum CoverageIdentifier {
    /// draw `k` perturbations once (empty immutable set) and, for each
    /// candidate later queried, report the fraction of those rows that left
    /// every feature in the candidate's set unchanged.
    PerturbationBased { rows: Vec<Vec<bool>> },

    /// coverage is inapplicable (e.g. images): fall back to a length
    /// penalty, `2^-|A|`, so longer rules are scored as less general.
    Disabled,
}

impl CoverageIdentifier {
    /// pre-draw `k` perturbation rows from `oracle` against `feature_count`
    /// features, with nothing held immutable.
    pub fn perturbation_based(oracle: &dyn PerturbationFunction, k: usize) -> Self {
        let batch = oracle.perturb(&BTreeSet::new(), k);
        let rows = (0..batch.len())
            .map(|i| batch.changed_row(i).to_vec())
            .collect();
        CoverageIdentifier::PerturbationBased { rows }
    }

    pub fn disabled() -> Self {
        CoverageIdentifier::Disabled
    }

    /// `calculateCoverage`. called at most once per candidate by the caller;
    /// this identifier itself is stateless across calls (the precomputed
    /// rows are read-only), so the "at most once" invariant is enforced by
    /// [`crate::candidate::Candidate::set_coverage`], not here.
    pub fn calculate(&self, features: &BTreeSet<FeatureIndex>) -> Result<Coverage, AnchorError> {
        match self {
            CoverageIdentifier::Disabled => {
                let len = features.len();
                if len > 63 {
                    return Err(AnchorError::InvalidParameter(
                        "disabled-coverage length penalty overflows for anchors over 63 features".into(),
                    ));
                }
                Ok(1.0 / (1u64 << len) as f64)
            }
            CoverageIdentifier::PerturbationBased { rows } => {
                if rows.is_empty() {
                    return Ok(0.0);
                }
                let matched = rows
                    .iter()
                    .filter(|row| features.iter().all(|&f| !row[f]))
                    .count();
                Ok(matched as f64 / rows.len() as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_length_penalty() {
        let id = CoverageIdentifier::disabled();
        assert_eq!(id.calculate(&BTreeSet::new()).unwrap(), 1.0);
        assert_eq!(id.calculate(&[0].into()).unwrap(), 0.5);
        assert_eq!(id.calculate(&[0, 1].into()).unwrap(), 0.25);
        assert_eq!(id.calculate(&[0, 1, 2].into()).unwrap(), 0.125);
    }

    #[test]
    fn perturbation_based_counts_unchanged_rows() {
        // 4 rows over 2 features: rows where feature 0 was left unchanged.
        let rows = vec![
            vec![false, true],
            vec![false, false],
            vec![true, true],
            vec![true, false],
        ];
        let id = CoverageIdentifier::PerturbationBased { rows };
        let coverage = id.calculate(&[0].into()).unwrap();
        assert!((coverage - 0.5).abs() < 1e-9);
    }
}
