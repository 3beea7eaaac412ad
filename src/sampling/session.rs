use crate::candidate::CandidateId;
use crate::instance::Label;
use std::collections::HashMap;

/// collects pull requests across many candidates for one joint execution.
///
/// `register` is additive: registering the same candidate twice accumulates
/// the pull count rather than overwriting it, so callers (e.g. the beam
/// search's borderline back-off loop) can keep topping a session up before
/// calling [`super::service::SamplingService::run`].
#[derive(Debug, Default)]
pub struct SamplingSession {
    label: Label,
    pulls: HashMap<CandidateId, u64>,
}

impl SamplingSession {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            pulls: HashMap::new(),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn register(&mut self, candidate: CandidateId, n: u64) {
        *self.pulls.entry(candidate).or_insert(0) += n;
    }

    pub fn is_empty(&self) -> bool {
        self.pulls.is_empty()
    }

    pub fn pulls(&self) -> &HashMap<CandidateId, u64> {
        &self.pulls
    }
}
