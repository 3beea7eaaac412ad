use super::kl::lower_bound;
use super::kl::upper_bound;
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

const MAX_ROUNDS: u64 = 10_000;

/// Jun et al. (2016) Batch Racing: round-robin pulls in batches of `batch`
/// (per-arm cap `per_round_cap`); an arm is eliminated once its confidence
/// interval is dominated by the k-th best arm's, accepted once it clearly
/// dominates the rest.
#[derive(Clone)]
pub struct BatchRacing {
    pub batch: u64,
    pub per_round_cap: u64,
}

impl Default for BatchRacing {
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
    pulls: u64,
}

fn snapshot(arena: &Arena, candidates: &[CandidateId]) -> Result<Vec<Stats>, AnchorError> {
    candidates
        .iter()
        .map(|&c| {
            let cand = arena.get(c)?;
            Ok(Stats {
                candidate: c,
                precision: cand.precision()?,
                pulls: cand.total()?,
            })
        })
        .collect()
}

impl BestAnchorIdentification for BatchRacing {
    fn identify(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        candidates: &[CandidateId],
        delta: Confidence,
        _epsilon: Tolerance,
        k: usize,
    ) -> Result<Vec<CandidateId>, AnchorError> {
        let total_arms = candidates.len().max(1);
        let mut active = candidates.to_vec();
        let mut accepted = Vec::new();
        let mut remaining_k = k;
        let mut t: u64 = 1;

        while !active.is_empty() && remaining_k > 0 && t < MAX_ROUNDS {
            if active.len() <= remaining_k {
                accepted.extend(active.drain(..));
                break;
            }

            let budget = self.batch.min(active.len() as u64 * self.per_round_cap);
            let allocation = cyclic_allocate(arena, &active, budget, self.per_round_cap)?;
            run_allocation(arena, service, label, allocation)?;

            let mut stats = snapshot(arena, &active)?;
            stats.sort_by(|a, b| b.precision.partial_cmp(&a.precision).unwrap());

            let lowers: Vec<f64> = stats
                .iter()
                .map(|s| lower_bound(s.precision, s.pulls, total_arms, t, delta))
                .collect();
            let uppers: Vec<f64> = stats
                .iter()
                .map(|s| upper_bound(s.precision, s.pulls, total_arms, t, delta))
                .collect();

            let threshold_lower = lowers[remaining_k - 1];
            let threshold_upper = uppers.get(remaining_k).copied().unwrap_or(0.0);

            let mut removed = Vec::new();
            for (i, s) in stats.iter().enumerate() {
                if i >= remaining_k && uppers[i] < threshold_lower {
                    removed.push((i, false));
                } else if i < remaining_k && lowers[i] > threshold_upper {
                    removed.push((i, true));
                }
            }

            if removed.is_empty() {
                // no clear separation yet: keep sampling next round.
                t += 1;
                continue;
            }

            // apply removals back-to-front so earlier indices stay valid.
            removed.sort_by(|a, b| b.0.cmp(&a.0));
            for (i, is_accept) in removed {
                let s = stats.remove(i);
                active.retain(|&c| c != s.candidate);
                if is_accept {
                    accepted.push(s.candidate);
                    remaining_k -= 1;
                }
            }
            t += 1;
        }

        if accepted.len() < k {
            // budget exhausted without full separation: fill the rest with
            // the current empirical leaders among whatever remains active.
            let mut stats = snapshot(arena, &active)?;
            stats.sort_by(|a, b| b.precision.partial_cmp(&a.precision).unwrap());
            accepted.extend(stats.into_iter().take(k - accepted.len()).map(|s| s.candidate));
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
    fn terminates_and_returns_exactly_k() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..5).map(|i| arena.insert_root(i)).collect();
        let function = SamplingFunction::new(
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(5, 13)),
        );
        let service = SamplingService::new(function, SamplingExecution::Linear).unwrap();
        let winners = BatchRacing::default()
            .identify(&arena, &service, 1, &ids, 0.1, 0.1, 2)
            .unwrap();
        assert_eq!(winners.len(), 2);
    }
}
