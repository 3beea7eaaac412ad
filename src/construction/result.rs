use crate::instance::Coverage;
use crate::instance::DataInstance;
use crate::instance::FeatureIndex;
use crate::instance::Label;
use crate::instance::Precision;
use std::collections::BTreeSet;
use std::time::Duration;

/// a finished anchor search: the winning candidate's feature set, frozen out
/// of the arena it was built in, plus the instance/label it explains and
/// elapsed wall-clock totals.
#[derive(Debug, Clone)]
pub struct AnchorResult {
    pub order: Vec<FeatureIndex>,
    pub features: BTreeSet<FeatureIndex>,
    pub instance: DataInstance,
    pub label: Label,
    pub is_anchor: bool,
    pub precision: Precision,
    pub coverage: Coverage,
    pub total: u64,
    pub positive: u64,
    pub elapsed: Duration,
    pub sampling_elapsed: Duration,
}

impl AnchorResult {
    pub fn feature_count(&self) -> usize {
        self.order.len()
    }
}
