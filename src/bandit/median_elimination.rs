use super::traits::BestAnchorIdentification;
use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::Confidence;
use crate::instance::Label;
use crate::instance::Precision;
use crate::instance::Tolerance;
use crate::sampling::SamplingService;
use crate::sampling::SamplingSession;

/// classical phased elimination: halve the candidate pool each phase,
/// tightening (ε, δ) geometrically, until one arm remains. extended to
/// top-k by repeatedly running it on the surviving pool and removing the
/// winner.
#[derive(Default, Clone)]
pub struct MedianElimination;

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

impl MedianElimination {
    fn identify_single(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        pool: &[CandidateId],
        mut delta: Confidence,
        mut epsilon: Tolerance,
    ) -> Result<CandidateId, AnchorError> {
        let mut remaining = pool.to_vec();
        while remaining.len() > 1 {
            let sample_count = ((2.0 / epsilon).powi(2) * (3.0 / delta).ln()).ceil().max(1.0) as u64;
            let mut session = SamplingSession::new(label);
            for &c in &remaining {
                session.register(c, sample_count);
            }
            service.run(arena, &session)?;

            let mut stats = snapshot(arena, &remaining)?;
            stats.sort_by(|a, b| b.precision.partial_cmp(&a.precision).unwrap());
            let keep = (stats.len() + 1) / 2;
            remaining = stats.into_iter().take(keep.max(1)).map(|s| s.candidate).collect();

            epsilon *= 0.75;
            delta /= 2.0;
        }
        Ok(remaining[0])
    }
}

impl BestAnchorIdentification for MedianElimination {
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
        let mut pool = candidates.to_vec();
        let mut winners = Vec::new();
        while winners.len() < k && !pool.is_empty() {
            if pool.len() == 1 {
                winners.push(pool.remove(0));
                break;
            }
            let winner = self.identify_single(arena, service, label, &pool, delta, epsilon)?;
            pool.retain(|&c| c != winner);
            winners.push(winner);
        }
        Ok(winners)
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
    fn single_candidate_pool_returns_immediately() {
        let mut arena = Arena::new();
        let a = arena.insert_root(0);
        let function = SamplingFunction::new(
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(1, 3)),
        );
        let service = SamplingService::new(function, SamplingExecution::Linear).unwrap();
        let winners = MedianElimination
            .identify(&arena, &service, 1, &[a], 0.1, 0.1, 1)
            .unwrap();
        assert_eq!(winners, vec![a]);
    }

    #[test]
    fn constant_classifier_picks_a_perfect_arm() {
        let mut arena = Arena::new();
        let a = arena.insert_root(0);
        let b = arena.insert_root(1);
        let function = SamplingFunction::new(
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(2, 5)),
        );
        let service = SamplingService::new(function, SamplingExecution::Linear).unwrap();
        let winners = MedianElimination
            .identify(&arena, &service, 1, &[a, b], 0.2, 0.3, 1)
            .unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(arena.get(winners[0]).unwrap().precision().unwrap(), 1.0);
    }
}
