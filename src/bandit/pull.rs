//! shared pull-allocation helper used by every bandit: "distribute pulls
//! across a candidate set using a cyclic iterator over the set sorted
//! ascending by current sample count, capped at `min(budget, |S|*per_arm_cap)`."

use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::sampling::SamplingService;
use crate::sampling::SamplingSession;
use crate::instance::Label;
use std::collections::HashMap;

fn current_total(arena: &Arena, candidate: CandidateId) -> u64 {
    arena
        .get(candidate)
        .and_then(|c| c.total())
        .unwrap_or(0)
}

/// allocate `budget` pulls one at a time, round-robin, always to whichever
/// remaining candidate currently has the fewest samples; no candidate is
/// given more than `per_arm_cap` pulls by this call. returns the pulls
/// actually registered so callers can tell how the budget was spent.
pub fn cyclic_allocate(
    arena: &Arena,
    candidates: &[CandidateId],
    budget: u64,
    per_arm_cap: u64,
) -> Result<HashMap<CandidateId, u64>, AnchorError> {
    let mut remaining_cap: HashMap<CandidateId, u64> = candidates
        .iter()
        .map(|&c| (c, per_arm_cap))
        .collect();
    let mut allocated: HashMap<CandidateId, u64> = HashMap::new();
    let mut spent = 0u64;

    while spent < budget {
        let mut ordered: Vec<CandidateId> = remaining_cap
            .iter()
            .filter(|(_, &cap)| cap > 0)
            .map(|(&c, _)| c)
            .collect();
        if ordered.is_empty() {
            break;
        }
        ordered.sort_by_key(|&c| current_total(arena, c));
        for c in ordered {
            if spent >= budget {
                break;
            }
            let cap = remaining_cap.get_mut(&c).expect("candidate present in cap map");
            if *cap == 0 {
                continue;
            }
            *cap -= 1;
            *allocated.entry(c).or_insert(0) += 1;
            spent += 1;
        }
    }
    Ok(allocated)
}

/// run one session pulling exactly the allocation computed by
/// [`cyclic_allocate`], blocking until done.
pub fn run_allocation(
    arena: &Arena,
    service: &SamplingService,
    label: Label,
    allocation: HashMap<CandidateId, u64>,
) -> Result<(), AnchorError> {
    if allocation.is_empty() {
        return Ok(());
    }
    let mut session = SamplingSession::new(label);
    for (c, n) in allocation {
        session.register(c, n);
    }
    service.run(arena, &session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Arena;

    #[test]
    fn cyclic_allocate_favors_least_sampled_first() {
        let mut arena = Arena::new();
        let a = arena.insert_root(0);
        let b = arena.insert_root(1);
        arena.get(a).unwrap().record(5, 3).unwrap();
        let allocation = cyclic_allocate(&arena, &[a, b], 3, 100).unwrap();
        assert_eq!(*allocation.get(&b).unwrap(), 3);
        assert!(allocation.get(&a).is_none());
    }

    #[test]
    fn cyclic_allocate_respects_per_arm_cap() {
        let mut arena = Arena::new();
        let a = arena.insert_root(0);
        let b = arena.insert_root(1);
        let allocation = cyclic_allocate(&arena, &[a, b], 10, 2).unwrap();
        assert_eq!(allocation.values().sum::<u64>(), 4);
        assert_eq!(*allocation.get(&a).unwrap(), 2);
        assert_eq!(*allocation.get(&b).unwrap(), 2);
    }
}
