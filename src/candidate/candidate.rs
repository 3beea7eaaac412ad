use super::counters::CandidateCounters;
use crate::errors::AnchorError;
use crate::instance::Coverage;
use crate::instance::FeatureIndex;
use crate::instance::Precision;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::OnceLock;

/// an opaque handle into the arena owned by a single [`crate::construction::beam::BeamSearch`]
/// run. handles from different runs must never be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId(pub(crate) u32);

/// a feature-set being evaluated; the "arm" in the bandit.
///
/// `order` records the sequence features were adjoined in (construction
/// order); `key` is the canonical sorted set used for equality, hashing, and
/// deduplication across parents at the same beam depth. `parent` is `None`
/// only for depth-1 candidates (singletons extending the empty rule).
#[derive(Debug)]
pub struct Candidate {
    order: Vec<FeatureIndex>,
    key: BTreeSet<FeatureIndex>,
    parent: Option<CandidateId>,
    counters: Mutex<CandidateCounters>,
    coverage: OnceLock<Coverage>,
}

impl Candidate {
    /// construct a depth-1 candidate (no parent).
    pub fn root(feature: FeatureIndex) -> Self {
        Self::new(vec![feature], None)
    }

    /// extend `parent` by adjoining `feature`, which must not already be
    /// present in the parent's feature set.
    pub fn extend(parent: CandidateId, parent_order: &[FeatureIndex], feature: FeatureIndex) -> Result<Self, AnchorError> {
        if parent_order.contains(&feature) {
            return Err(AnchorError::InvalidParameter(format!(
                "feature {feature} already present in parent candidate"
            )));
        }
        let mut order = parent_order.to_vec();
        order.push(feature);
        Ok(Self::new(order, Some(parent)))
    }

    fn new(order: Vec<FeatureIndex>, parent: Option<CandidateId>) -> Self {
        assert!(!order.is_empty(), "candidate must cover at least one feature");
        let key = order.iter().copied().collect::<BTreeSet<_>>();
        Self {
            order,
            key,
            parent,
            counters: Mutex::new(CandidateCounters::default()),
            coverage: OnceLock::new(),
        }
    }

    pub fn order(&self) -> &[FeatureIndex] {
        &self.order
    }

    pub fn features(&self) -> &BTreeSet<FeatureIndex> {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn parent(&self) -> Option<CandidateId> {
        self.parent
    }

    /// fold `n` pulls, `matches` of which hit the explained label, into this
    /// candidate's counters. serialized by the candidate's own mutex so that
    /// concurrent sessions never race on the same arm.
    pub fn record(&self, n: u64, matches: u64) -> Result<(), AnchorError> {
        self.counters.lock()?.record(n, matches);
        Ok(())
    }

    pub fn total(&self) -> Result<u64, AnchorError> {
        Ok(self.counters.lock()?.total)
    }

    pub fn positive(&self) -> Result<u64, AnchorError> {
        Ok(self.counters.lock()?.positive)
    }

    pub fn precision(&self) -> Result<Precision, AnchorError> {
        Ok(self.counters.lock()?.precision())
    }

    /// set coverage at most once. returns `InvalidParameter` on a second call,
    /// since coverage is defined to be immutable after it is first computed.
    pub fn set_coverage(&self, coverage: Coverage) -> Result<(), AnchorError> {
        if !(0.0..=1.0).contains(&coverage) {
            return Err(AnchorError::InvalidParameter(format!(
                "coverage {coverage} outside [0, 1]"
            )));
        }
        self.coverage
            .set(coverage)
            .map_err(|_| AnchorError::InvalidParameter("coverage already set".into()))
    }

    pub fn coverage(&self) -> Option<Coverage> {
        self.coverage.get().copied()
    }
}
