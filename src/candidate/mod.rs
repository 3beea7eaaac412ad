mod arena;
mod candidate;
mod counters;

pub use arena::Arena;
pub use candidate::Candidate;
pub use candidate::CandidateId;
pub use counters::CandidateCounters;
