mod batch;
mod coverage_pick;
mod submodular_pick;

pub use batch::BatchExplainer;
pub use coverage_pick::coverage_pick;
pub use submodular_pick::submodular_pick;
