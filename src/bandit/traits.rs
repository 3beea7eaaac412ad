use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::Confidence;
use crate::instance::Label;
use crate::instance::Tolerance;
use crate::sampling::SamplingService;

/// selects the top-`k` candidates (by true precision, to within statistical
/// guarantees) out of `candidates`. implementations may over-pull, need not
/// guarantee the τ constraint (that is [`crate::construction`]'s job), but
/// must terminate.
pub trait BestAnchorIdentification {
    fn identify(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        candidates: &[CandidateId],
        delta: Confidence,
        epsilon: Tolerance,
        k: usize,
    ) -> Result<Vec<CandidateId>, AnchorError>;
}
