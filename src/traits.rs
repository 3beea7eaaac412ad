use crate::instance::DataInstance;
use crate::instance::FeatureIndex;
use crate::instance::Label;
use crate::instance::PerturbationBatch;
use std::collections::BTreeSet;

/// a pure, thread-safe classifier. `predict_batch` defaults to one call per
/// row but implementors with a vectorized model should override it.
pub trait ClassificationFunction: Send + Sync {
    fn predict_one(&self, instance: &DataInstance) -> Label;

    fn predict_batch(&self, instances: &[DataInstance]) -> Vec<Label> {
        instances.iter().map(|i| self.predict_one(i)).collect()
    }
}

/// the domain-specific perturbation oracle. must hold every feature index in
/// `immutable` bit-identical to the base instance across all `n` surrogates.
pub trait PerturbationFunction: Send + Sync {
    fn perturb(&self, immutable: &BTreeSet<FeatureIndex>, n: usize) -> PerturbationBatch;
}

/// a perturbation function able to re-base itself onto a new instance. only
/// implementors of this trait can be driven in global (batch) mode, since
/// each instance in the dataset needs its own oracle.
pub trait ReconfigurablePerturbationFunction: PerturbationFunction {
    fn for_instance(&self, base: &DataInstance) -> Box<dyn PerturbationFunction>;
}
