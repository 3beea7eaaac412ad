use crate::bandit::Bandit;
use crate::coverage::CoverageIdentifier;
use crate::errors::AnchorError;
use crate::instance::Confidence;
use crate::instance::FeatureIndex;
use crate::instance::Precision;
use crate::instance::Tolerance;
use crate::sampling::SamplingExecution;
use std::collections::BTreeSet;

/// immutable, validated configuration produced by [`AnchorBuilder::build`].
#[derive(Clone)]
pub struct AnchorConfig {
    pub tau: Precision,
    pub delta: Confidence,
    pub epsilon: Tolerance,
    pub beam_width: usize,
    pub max_anchor_size: usize,
    pub initial_samples: u64,
    pub batch_size: u64,
    pub allow_suboptimal: bool,
    pub immutable: BTreeSet<FeatureIndex>,
    pub bandit: Bandit,
    pub coverage: CoverageIdentifier,
    pub execution: SamplingExecution,
}

/// fluent builder validating τ/δ/ε/beam/etc. at `build()` time, since unlike
/// the teacher's compile-time poker constants this crate's configuration
/// varies per caller.
pub struct AnchorBuilder {
    tau: Precision,
    delta: Confidence,
    epsilon: Tolerance,
    beam_width: usize,
    max_anchor_size: usize,
    initial_samples: u64,
    batch_size: u64,
    allow_suboptimal: bool,
    immutable: BTreeSet<FeatureIndex>,
    bandit: Bandit,
    coverage: CoverageIdentifier,
    execution: SamplingExecution,
}

impl Default for AnchorBuilder {
    fn default() -> Self {
        Self {
            tau: 1.0,
            delta: 0.1,
            epsilon: 0.1,
            beam_width: 2,
            max_anchor_size: 0,
            initial_samples: 1,
            batch_size: 100,
            allow_suboptimal: false,
            immutable: BTreeSet::new(),
            bandit: Bandit::default(),
            coverage: CoverageIdentifier::disabled(),
            execution: SamplingExecution::Linear,
        }
    }
}

impl AnchorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tau(mut self, tau: Precision) -> Self {
        self.tau = tau;
        self
    }

    pub fn delta(mut self, delta: Confidence) -> Self {
        self.delta = delta;
        self
    }

    pub fn epsilon(mut self, epsilon: Tolerance) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    /// 0 means unbounded (limited only by the instance's feature count).
    pub fn max_anchor_size(mut self, max_anchor_size: usize) -> Self {
        self.max_anchor_size = max_anchor_size;
        self
    }

    pub fn initial_samples(mut self, initial_samples: u64) -> Self {
        self.initial_samples = initial_samples;
        self
    }

    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn allow_suboptimal(mut self, allow_suboptimal: bool) -> Self {
        self.allow_suboptimal = allow_suboptimal;
        self
    }

    pub fn immutable(mut self, immutable: BTreeSet<FeatureIndex>) -> Self {
        self.immutable = immutable;
        self
    }

    pub fn bandit(mut self, bandit: Bandit) -> Self {
        self.bandit = bandit;
        self
    }

    pub fn coverage(mut self, coverage: CoverageIdentifier) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn execution(mut self, execution: SamplingExecution) -> Self {
        self.execution = execution;
        self
    }

    pub fn build(self) -> Result<AnchorConfig, AnchorError> {
        if !(0.0..=1.0).contains(&self.tau) {
            return Err(AnchorError::InvalidParameter(format!("tau {} outside [0, 1]", self.tau)));
        }
        if !(0.0..1.0).contains(&self.delta) {
            return Err(AnchorError::InvalidParameter(format!(
                "delta {} outside (0, 1)",
                self.delta
            )));
        }
        if self.epsilon <= 0.0 {
            return Err(AnchorError::InvalidParameter(format!(
                "epsilon {} must be positive",
                self.epsilon
            )));
        }
        if self.beam_width == 0 {
            return Err(AnchorError::InvalidParameter("beam_width must be at least 1".into()));
        }
        if self.initial_samples == 0 {
            return Err(AnchorError::InvalidParameter("initial_samples must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(AnchorError::InvalidParameter("batch_size must be at least 1".into()));
        }
        Ok(AnchorConfig {
            tau: self.tau,
            delta: self.delta,
            epsilon: self.epsilon,
            beam_width: self.beam_width,
            max_anchor_size: self.max_anchor_size,
            initial_samples: self.initial_samples,
            batch_size: self.batch_size,
            allow_suboptimal: self.allow_suboptimal,
            immutable: self.immutable,
            bandit: self.bandit,
            coverage: self.coverage,
            execution: self.execution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        assert!(AnchorBuilder::new().build().is_ok());
    }

    #[test]
    fn rejects_tau_outside_unit_interval() {
        assert!(AnchorBuilder::new().tau(1.5).build().is_err());
    }

    #[test]
    fn rejects_zero_beam_width() {
        assert!(AnchorBuilder::new().beam_width(0).build().is_err());
    }
}
