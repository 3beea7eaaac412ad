use crate::instance::Precision;

/// the mutable part of a Candidate: total pulls drawn and how many matched
/// the explained label. Protected by a per-candidate mutex (see
/// [`super::Candidate`]) rather than a global lock, so that concurrent
/// sessions touching disjoint candidates never contend with each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateCounters {
    pub total: u64,
    pub positive: u64,
}

impl CandidateCounters {
    /// fold `n` new pulls in, `matches` of which hit the explained label.
    pub fn record(&mut self, n: u64, matches: u64) {
        debug_assert!(matches <= n, "can't match more than we pulled");
        self.total += n;
        self.positive += matches;
    }

    pub fn precision(&self) -> Precision {
        if self.total == 0 {
            0.0
        } else {
            self.positive as f64 / self.total as f64
        }
    }
}
