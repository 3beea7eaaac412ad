/// how a [`super::service::SamplingService`] executes the pulls accumulated
/// in one session.
#[derive(Debug, Clone, Copy)]
pub enum SamplingExecution {
    /// iterate the accumulated map; call `evaluate` once per candidate.
    Linear,

    /// one task per candidate, dispatched onto a fixed-size worker pool.
    Parallel { threads: usize },

    /// split total pulls across `threads` near-equal chunks (remainder
    /// spread over the first chunks); a chunk may span multiple candidates
    /// and issues sub-evaluate calls no larger than its remaining share.
    BalancedParallel { threads: usize },
}

impl SamplingExecution {
    pub fn threads(&self) -> usize {
        match self {
            SamplingExecution::Linear => 1,
            SamplingExecution::Parallel { threads } => *threads,
            SamplingExecution::BalancedParallel { threads } => *threads,
        }
    }
}
