use super::pull::cyclic_allocate;
use super::pull::run_allocation;
use super::traits::BestAnchorIdentification;
use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::Confidence;
use crate::instance::Label;
use crate::instance::Precision;
use crate::instance::Tolerance;
use crate::sampling::SamplingService;

/// Jun et al. (2016) Successive Accepts and Rejects: round-robin pulls in
/// batches of `batch`, capped at `per_round_cap` per arm per round; each
/// round removes exactly one arm from the active set, either accepting it
/// (if it belongs among the remaining top-k by empirical gap) or rejecting
/// it.
#[derive(Clone)]
pub struct BatchSar {
    pub batch: u64,
    pub per_round_cap: u64,
}

impl Default for BatchSar {
    fn default() -> Self {
        Self {
            batch: 100,
            per_round_cap: 20,
        }
    }
}

struct Stats {
    candidate: CandidateId,
    precision: Precision,
}

fn snapshot(arena: &Arena, candidates: &[CandidateId]) -> Result<Vec<Stats>, AnchorError> {
    candidates
        .iter()
        .map(|&c| {
            Ok(Stats {
                candidate: c,
                precision: arena.get(c)?.precision()?,
            })
        })
        .collect()
}

impl BestAnchorIdentification for BatchSar {
    fn identify(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        candidates: &[CandidateId],
        _delta: Confidence,
        _epsilon: Tolerance,
        k: usize,
    ) -> Result<Vec<CandidateId>, AnchorError> {
        let mut active = candidates.to_vec();
        let mut accepted = Vec::new();
        let mut remaining_k = k;

        while !active.is_empty() && remaining_k > 0 {
            if active.len() <= remaining_k {
                accepted.extend(active.drain(..));
                break;
            }

            let budget = self.batch.min(active.len() as u64 * self.per_round_cap);
            let allocation = cyclic_allocate(arena, &active, budget, self.per_round_cap)?;
            run_allocation(arena, service, label, allocation)?;

            let mut stats = snapshot(arena, &active)?;
            stats.sort_by(|a, b| b.precision.partial_cmp(&a.precision).unwrap());
            let m = remaining_k.min(stats.len());
            let border_in = stats[m - 1].precision;
            let border_out = stats.get(m).map(|s| s.precision).unwrap_or(0.0);

            let mut best_index = 0;
            let mut best_gap = f64::NEG_INFINITY;
            for (i, s) in stats.iter().enumerate() {
                let gap = if i < m {
                    s.precision - border_out
                } else {
                    border_in - s.precision
                };
                if gap > best_gap {
                    best_gap = gap;
                    best_index = i;
                }
            }

            let decided = stats.remove(best_index);
            active.retain(|&c| c != decided.candidate);
            if best_index < m {
                accepted.push(decided.candidate);
                remaining_k -= 1;
            }
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::SamplingExecution;
    use crate::sampling::SamplingFunction;
    use crate::testing::ConstantClassifier;
    use crate::testing::UniformOracle;
    use std::sync::Arc;

    #[test]
    fn terminates_and_accepts_exactly_k() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..5).map(|i| arena.insert_root(i)).collect();
        let function = SamplingFunction::new(
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(5, 9)),
        );
        let service = SamplingService::new(function, SamplingExecution::Linear).unwrap();
        let winners = BatchSar::default()
            .identify(&arena, &service, 1, &ids, 0.1, 0.1, 2)
            .unwrap();
        assert_eq!(winners.len(), 2);
    }
}
