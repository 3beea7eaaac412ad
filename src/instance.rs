use std::sync::Arc;

/// the label a classifier assigns to an instance. kept abstract (not bool)
/// because anchors are defined for arbitrary multi-class classifiers.
pub type Label = i64;

/// empirical precision / coverage / confidence share the same unit interval,
/// but are kept as distinct type aliases for self-documenting signatures.
pub type Precision = f64;
pub type Coverage = f64;
pub type Confidence = f64;
pub type Tolerance = f64;

/// index of a feature column within an instance.
pub type FeatureIndex = usize;

/// a single feature's value, typed once when the instance is built.
///
/// the original anchor implementations carry heterogeneous feature columns
/// as duck-typed arrays of `Object`; here the representation is decided up
/// front so downstream code never has to guess a column's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(u32),
    Text(Arc<str>),
}

/// one row of data the classifier was (or will be) asked to label.
///
/// `DataInstance` owns its feature values; it does not reach back into any
/// dataset. `F` is fixed for the lifetime of the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DataInstance {
    features: Vec<FeatureValue>,
}

impl DataInstance {
    pub fn new(features: Vec<FeatureValue>) -> Self {
        Self { features }
    }

    /// number of feature columns, i.e. F.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn value(&self, index: FeatureIndex) -> Option<&FeatureValue> {
        self.features.get(index)
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.features
    }
}

/// a batch of surrogate instances produced by a perturbation oracle, plus
/// for each row a bitmap of which features differ from the base instance.
///
/// invariant: `changed.len() == instances.len()`, and every row of `changed`
/// has length equal to the base instance's feature count.
#[derive(Debug, Clone)]
pub struct PerturbationBatch {
    instances: Vec<DataInstance>,
    changed: Vec<Vec<bool>>,
}

impl PerturbationBatch {
    pub fn new(instances: Vec<DataInstance>, changed: Vec<Vec<bool>>) -> Self {
        assert_eq!(
            instances.len(),
            changed.len(),
            "perturbation batch: one changed-row per surrogate instance"
        );
        Self { instances, changed }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[DataInstance] {
        &self.instances
    }

    /// whether `feature` was perturbed (changed from the base) on row `i`.
    pub fn changed(&self, i: usize, feature: FeatureIndex) -> bool {
        self.changed[i][feature]
    }

    pub fn changed_row(&self, i: usize) -> &[bool] {
        &self.changed[i]
    }
}
