mod batch_racing;
mod batch_sar;
mod kl;
mod kllucb;
mod median_elimination;
mod pull;
mod traits;

pub use batch_racing::BatchRacing;
pub use batch_sar::BatchSar;
pub use kl::dlow_bernoulli;
pub use kl::dup_bernoulli;
pub use kl::exploration_rate;
pub use kl::kl_bernoulli;
pub use kl::lower_bound;
pub use kl::upper_bound;
pub use kllucb::KlLucb;
pub use median_elimination::MedianElimination;
pub use traits::BestAnchorIdentification;

use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::Confidence;
use crate::instance::Label;
use crate::instance::Tolerance;
use crate::sampling::SamplingService;

/// the bandit choices a caller can configure; dispatches to one of the four
/// strategies named in the specification.
#[derive(Clone)]
pub enum Bandit {
    KlLucb(KlLucb),
    MedianElimination(MedianElimination),
    BatchSar(BatchSar),
    BatchRacing(BatchRacing),
}

impl Default for Bandit {
    fn default() -> Self {
        Bandit::KlLucb(KlLucb::default())
    }
}

impl BestAnchorIdentification for Bandit {
    fn identify(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        candidates: &[CandidateId],
        delta: Confidence,
        epsilon: Tolerance,
        k: usize,
    ) -> Result<Vec<CandidateId>, AnchorError> {
        match self {
            Bandit::KlLucb(b) => b.identify(arena, service, label, candidates, delta, epsilon, k),
            Bandit::MedianElimination(b) => b.identify(arena, service, label, candidates, delta, epsilon, k),
            Bandit::BatchSar(b) => b.identify(arena, service, label, candidates, delta, epsilon, k),
            Bandit::BatchRacing(b) => b.identify(arena, service, label, candidates, delta, epsilon, k),
        }
    }
}
