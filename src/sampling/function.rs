use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::DataInstance;
use crate::instance::Label;
use crate::instance::Precision;
use crate::traits::ClassificationFunction;
use crate::traits::PerturbationFunction;
use crate::traits::ReconfigurablePerturbationFunction;
use std::sync::Arc;

/// perturbs a candidate's feature set, classifies the surrogates, and folds
/// the result into the candidate's counters.
///
/// cloning a `SamplingFunction` is cheap (it only clones two `Arc`s) and
/// produces a function that shares no *mutable* state with its source --
/// the only mutable state in this whole picture lives on the `Candidate`
/// itself.
#[derive(Clone)]
pub struct SamplingFunction {
    classifier: Arc<dyn ClassificationFunction>,
    oracle: Arc<dyn PerturbationFunction>,
}

impl SamplingFunction {
    pub fn new(classifier: Arc<dyn ClassificationFunction>, oracle: Arc<dyn PerturbationFunction>) -> Self {
        Self { classifier, oracle }
    }

    /// `evaluate`: draw `n` perturbations holding `candidate`'s features
    /// fixed, classify them, register the hits, and return the empirical
    /// precision for this pull alone (not the candidate's running total).
    pub fn evaluate(
        &self,
        arena: &Arena,
        candidate: CandidateId,
        n: u64,
        label: Label,
    ) -> Result<Precision, AnchorError> {
        if n == 0 {
            return Ok(0.0);
        }
        let immutable = arena.get(candidate)?.features().clone();
        let batch = self.oracle.perturb(&immutable, n as usize);
        let matches = self
            .classifier
            .predict_batch(batch.instances())
            .into_iter()
            .filter(|&predicted| predicted == label)
            .count() as u64;
        arena.get(candidate)?.record(n, matches)?;
        Ok(matches as f64 / n as f64)
    }

    pub fn oracle(&self) -> &Arc<dyn PerturbationFunction> {
        &self.oracle
    }

    /// yield a fresh function re-based onto `instance`, for global (batch)
    /// mode. the new function shares the classifier but gets an
    /// independent oracle, so two instances being explained concurrently
    /// never touch each other's perturbation state.
    pub fn rebase(
        &self,
        oracle: &dyn ReconfigurablePerturbationFunction,
        instance: &DataInstance,
    ) -> Self {
        Self {
            classifier: self.classifier.clone(),
            oracle: Arc::from(oracle.for_instance(instance)),
        }
    }
}
