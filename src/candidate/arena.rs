use super::candidate::Candidate;
use super::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::FeatureIndex;

/// owns every [`Candidate`] created over the lifetime of one
/// [`crate::construction::beam::BeamSearch`] run.
///
/// candidates are appended in waves (one per beam depth) and never removed:
/// a child's `parent` handle must always resolve, so ancestors live at least
/// as long as their descendants, which an append-only arena gives for free.
#[derive(Debug, Default)]
pub struct Arena {
    candidates: Vec<Candidate>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_root(&mut self, feature: FeatureIndex) -> CandidateId {
        let id = CandidateId(self.candidates.len() as u32);
        self.candidates.push(Candidate::root(feature));
        id
    }

    pub fn insert_extension(
        &mut self,
        parent: CandidateId,
        feature: FeatureIndex,
    ) -> Result<CandidateId, AnchorError> {
        let parent_order = self.get(parent)?.order().to_vec();
        let candidate = Candidate::extend(parent, &parent_order, feature)?;
        let id = CandidateId(self.candidates.len() as u32);
        self.candidates.push(candidate);
        Ok(id)
    }

    pub fn get(&self, id: CandidateId) -> Result<&Candidate, AnchorError> {
        self.candidates
            .get(id.0 as usize)
            .ok_or_else(|| AnchorError::InvalidParameter(format!("unknown candidate id {id:?}")))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
