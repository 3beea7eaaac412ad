//! synthetic instances, classifiers, and perturbation oracles for tests and
//! benchmarks. nothing here is reachable from production code paths.

use crate::instance::DataInstance;
use crate::instance::FeatureValue;
use crate::instance::Label;
use crate::instance::PerturbationBatch;
use crate::traits::ClassificationFunction;
use crate::traits::PerturbationFunction;
use crate::traits::ReconfigurablePerturbationFunction;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// trait for random generation, mainly (strictly?) for testing.
pub trait Arbitrary {
    fn random() -> Self;
}

impl Arbitrary for DataInstance {
    fn random() -> Self {
        let mut rng = SmallRng::from_os_rng();
        let features = (0..8)
            .map(|_| FeatureValue::Categorical(rng.random_range(0..2)))
            .collect();
        DataInstance::new(features)
    }
}

/// always predicts the same label, regardless of instance contents.
pub struct ConstantClassifier {
    label: Label,
}

impl ConstantClassifier {
    pub fn new(label: Label) -> Self {
        Self { label }
    }
}

impl ClassificationFunction for ConstantClassifier {
    fn predict_one(&self, _instance: &DataInstance) -> Label {
        self.label
    }
}

/// predicts a fair coin flip, independent of instance contents; used to
/// exercise the no-discriminative-feature scenario.
pub struct CoinClassifier {
    rng: Mutex<SmallRng>,
}

impl CoinClassifier {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl ClassificationFunction for CoinClassifier {
    fn predict_one(&self, _instance: &DataInstance) -> Label {
        let mut rng = self.rng.lock().expect("coin classifier rng lock poisoned");
        if rng.random_bool(0.5) { 1 } else { 0 }
    }
}

/// returns the value of a single chosen feature, read as a categorical 0/1.
pub struct SingleFeatureClassifier {
    feature: usize,
}

impl SingleFeatureClassifier {
    pub fn new(feature: usize) -> Self {
        Self { feature }
    }
}

impl ClassificationFunction for SingleFeatureClassifier {
    fn predict_one(&self, instance: &DataInstance) -> Label {
        match instance.value(self.feature) {
            Some(FeatureValue::Categorical(v)) => *v as Label,
            Some(FeatureValue::Numeric(v)) => {
                if *v >= 0.5 {
                    1
                } else {
                    0
                }
            }
            _ => 0,
        }
    }
}

/// draws each non-immutable categorical feature uniformly from {0, 1},
/// seeded for deterministic tests. the RNG lives behind a mutex so repeated
/// pulls draw fresh values from a single advancing stream, rather than
/// replaying the same prefix every call.
pub struct UniformOracle {
    feature_count: usize,
    seed: u64,
    rng: Mutex<SmallRng>,
}

impl UniformOracle {
    pub fn new(feature_count: usize, seed: u64) -> Self {
        Self {
            feature_count,
            seed,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl PerturbationFunction for UniformOracle {
    fn perturb(&self, immutable: &BTreeSet<usize>, n: usize) -> PerturbationBatch {
        let mut rng = self.rng.lock().expect("uniform oracle rng lock poisoned");
        let mut instances = Vec::with_capacity(n);
        let mut changed = Vec::with_capacity(n);
        for _ in 0..n {
            let mut row = Vec::with_capacity(self.feature_count);
            let mut changed_row = Vec::with_capacity(self.feature_count);
            for f in 0..self.feature_count {
                if immutable.contains(&f) {
                    row.push(FeatureValue::Categorical(0));
                    changed_row.push(false);
                } else {
                    row.push(FeatureValue::Categorical(rng.random_range(0..2)));
                    changed_row.push(true);
                }
            }
            instances.push(DataInstance::new(row));
            changed.push(changed_row);
        }
        PerturbationBatch::new(instances, changed)
    }
}

impl ReconfigurablePerturbationFunction for UniformOracle {
    fn for_instance(&self, _base: &DataInstance) -> Box<dyn PerturbationFunction> {
        Box::new(UniformOracle::new(self.feature_count, self.seed))
    }
}

/// draws perturbations around a fixed base instance, flipping each
/// non-immutable feature independently with probability `flip_prob`. like
/// [`UniformOracle`], the RNG advances across calls rather than resetting.
pub struct BernoulliOracle {
    base: DataInstance,
    flip_prob: f64,
    seed: u64,
    rng: Mutex<SmallRng>,
}

impl BernoulliOracle {
    pub fn new(base: DataInstance, flip_prob: f64, seed: u64) -> Self {
        Self {
            base,
            flip_prob,
            seed,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl PerturbationFunction for BernoulliOracle {
    fn perturb(&self, immutable: &BTreeSet<usize>, n: usize) -> PerturbationBatch {
        let mut rng = self.rng.lock().expect("bernoulli oracle rng lock poisoned");
        let mut instances = Vec::with_capacity(n);
        let mut changed = Vec::with_capacity(n);
        for _ in 0..n {
            let mut row = Vec::with_capacity(self.base.len());
            let mut changed_row = Vec::with_capacity(self.base.len());
            for f in 0..self.base.len() {
                let original = self.base.value(f).cloned().unwrap_or(FeatureValue::Categorical(0));
                if immutable.contains(&f) || !rng.random_bool(self.flip_prob) {
                    row.push(original);
                    changed_row.push(false);
                } else {
                    let flipped = match original {
                        FeatureValue::Categorical(v) => FeatureValue::Categorical(1 - v.min(1)),
                        other => other,
                    };
                    row.push(flipped);
                    changed_row.push(true);
                }
            }
            instances.push(DataInstance::new(row));
            changed.push(changed_row);
        }
        PerturbationBatch::new(instances, changed)
    }
}

impl ReconfigurablePerturbationFunction for BernoulliOracle {
    fn for_instance(&self, base: &DataInstance) -> Box<dyn PerturbationFunction> {
        Box::new(BernoulliOracle::new(base.clone(), self.flip_prob, self.seed))
    }
}
