use std::sync::PoisonError;

/// Errors surfaced by the anchor search engine.
///
/// `InvalidParameter` is a configuration-time error: it is raised before any
/// sampling happens and the caller should treat it as fatal to the whole
/// call. `NoCandidateFound` and `Interrupted` can surface mid-search; a
/// construction that returns either must not be reused.
///
/// global mode's "perturbation function must be reconfigurable" requirement
/// is enforced by `BatchExplainer::obtain_anchors` taking an
/// `Arc<dyn ReconfigurablePerturbationFunction>` rather than by a runtime
/// check here: a caller without one cannot call that entry point at all, so
/// there is no fallible path left to report.
#[derive(thiserror::Error, Debug)]
pub enum AnchorError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no candidate had a positive sample after the first beam depth")]
    NoCandidateFound,

    #[error("worker was interrupted during a sampling session")]
    Interrupted,

    #[error("candidate counter lock was poisoned by a panicking worker")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for AnchorError {
    fn from(_: PoisonError<T>) -> Self {
        AnchorError::Poisoned
    }
}
