use super::function::SamplingFunction;
use super::session::SamplingSession;
use super::strategy::SamplingExecution;
use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// owns the worker pool (when the chosen execution needs one) for the
/// lifetime of one construction's inner sampling. the pool is destroyed
/// along with the service; nothing about it outlives a single
/// [`crate::construction::beam::BeamSearch`] run.
pub struct SamplingService {
    function: SamplingFunction,
    execution: SamplingExecution,
    pool: Option<rayon::ThreadPool>,
    cancel: Arc<AtomicBool>,
}

impl SamplingService {
    pub fn new(function: SamplingFunction, execution: SamplingExecution) -> Result<Self, AnchorError> {
        let pool = match execution {
            SamplingExecution::Linear => None,
            SamplingExecution::Parallel { threads } | SamplingExecution::BalancedParallel { threads } => {
                if threads == 0 {
                    return Err(AnchorError::InvalidParameter(
                        "parallel sampling requires at least one thread".into(),
                    ));
                }
                Some(
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()
                        .map_err(|e| AnchorError::InvalidParameter(e.to_string()))?,
                )
            }
        };
        Ok(Self {
            function,
            execution,
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// cooperative cancellation handle: setting this flag aborts the
    /// in-flight session at its next dispatch point with
    /// [`AnchorError::Interrupted`]. Rust gives no safe way to forcibly
    /// abort a running thread, so this is the only interruption mechanism.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn create_session(&self, label: crate::instance::Label) -> SamplingSession {
        SamplingSession::new(label)
    }

    /// execute every accumulated pull in `session` and block until done.
    pub fn run(&self, arena: &Arena, session: &SamplingSession) -> Result<(), AnchorError> {
        if session.is_empty() {
            return Ok(());
        }
        if self.cancel.load(Ordering::Acquire) {
            return Err(AnchorError::Interrupted);
        }
        match self.execution {
            SamplingExecution::Linear => self.run_linear(arena, session),
            SamplingExecution::Parallel { .. } => self.run_parallel(arena, session),
            SamplingExecution::BalancedParallel { .. } => self.run_balanced(arena, session),
        }
    }

    fn run_linear(&self, arena: &Arena, session: &SamplingSession) -> Result<(), AnchorError> {
        for (&candidate, &n) in session.pulls() {
            self.function.evaluate(arena, candidate, n, session.label())?;
        }
        Ok(())
    }

    fn run_parallel(&self, arena: &Arena, session: &SamplingSession) -> Result<(), AnchorError> {
        let pool = self.pool.as_ref().expect("parallel execution owns a pool");
        let cancel = &self.cancel;
        pool.install(|| -> Result<(), AnchorError> {
            use rayon::prelude::*;
            session
                .pulls()
                .par_iter()
                .map(|(&candidate, &n)| {
                    if cancel.load(Ordering::Acquire) {
                        return Err(AnchorError::Interrupted);
                    }
                    self.function.evaluate(arena, candidate, n, session.label())?;
                    Ok(())
                })
                .collect::<Result<(), AnchorError>>()
        })
    }

    /// split total pulls into near-equal chunks (one per thread, remainder
    /// spread over the first chunks); each chunk may span multiple
    /// candidates. unlike a naive "advance a shared cursor" implementation,
    /// the split below is computed once, up front, as plain data -- so a
    /// chunk boundary can never silently drop a candidate's remaining pulls.
    fn run_balanced(&self, arena: &Arena, session: &SamplingSession) -> Result<(), AnchorError> {
        let threads = self.execution.threads();
        let chunks = split_into_chunks(session.pulls(), threads);
        let pool = self.pool.as_ref().expect("balanced-parallel execution owns a pool");
        let cancel = &self.cancel;
        pool.install(|| -> Result<(), AnchorError> {
            use rayon::prelude::*;
            chunks
                .into_par_iter()
                .map(|chunk| {
                    for (candidate, n) in chunk {
                        if cancel.load(Ordering::Acquire) {
                            return Err(AnchorError::Interrupted);
                        }
                        self.function.evaluate(arena, candidate, n, session.label())?;
                    }
                    Ok(())
                })
                .collect::<Result<(), AnchorError>>()
        })
    }
}

/// split an (unordered) map of candidate -> pull-count into `threads`
/// near-equal chunks by total pull volume. candidates are visited in a
/// stable (sorted by id) order so the split is deterministic given the same
/// session contents.
fn split_into_chunks(
    pulls: &std::collections::HashMap<CandidateId, u64>,
    threads: usize,
) -> Vec<Vec<(CandidateId, u64)>> {
    let mut entries: Vec<(CandidateId, u64)> = pulls.iter().map(|(&c, &n)| (c, n)).collect();
    entries.sort_by_key(|(c, _)| *c);
    let total: u64 = entries.iter().map(|(_, n)| n).sum();
    let threads = threads.max(1) as u64;
    let base = total / threads;
    let remainder = total % threads;

    let mut chunks = Vec::with_capacity(threads as usize);
    let mut entry_iter = entries.into_iter().peekable();
    let mut remaining_in_current: u64 = 0;
    let mut current: Option<CandidateId> = None;

    for chunk_index in 0..threads {
        let mut target = base + if (chunk_index as u64) < remainder { 1 } else { 0 };
        let mut chunk = Vec::new();
        while target > 0 {
            if remaining_in_current == 0 {
                match entry_iter.next() {
                    Some((c, n)) => {
                        current = Some(c);
                        remaining_in_current = n;
                    }
                    None => break,
                }
            }
            let take = remaining_in_current.min(target);
            if take > 0 {
                chunk.push((current.expect("current set alongside remaining_in_current"), take));
                remaining_in_current -= take;
                target -= take;
            } else {
                break;
            }
        }
        chunks.push(chunk);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> CandidateId {
        let mut arena = crate::candidate::Arena::new();
        let mut last = arena.insert_root(0);
        for i in 0..n {
            last = arena.insert_root(i as usize + 1);
        }
        last
    }

    #[test]
    fn balanced_split_preserves_total_and_never_drops_a_remainder() {
        let mut pulls = std::collections::HashMap::new();
        pulls.insert(id(0), 7);
        pulls.insert(id(1), 3);
        pulls.insert(id(2), 10);
        let chunks = split_into_chunks(&pulls, 4);
        let recovered: u64 = chunks.iter().flatten().map(|(_, n)| n).sum();
        assert_eq!(recovered, 20);
    }

    #[test]
    fn balanced_split_handles_more_threads_than_pulls() {
        let mut pulls = std::collections::HashMap::new();
        pulls.insert(id(0), 2);
        let chunks = split_into_chunks(&pulls, 8);
        let recovered: u64 = chunks.iter().flatten().map(|(_, n)| n).sum();
        assert_eq!(recovered, 2);
    }
}
