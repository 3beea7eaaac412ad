use super::config::AnchorConfig;
use super::result::AnchorResult;
use crate::bandit::BestAnchorIdentification;
use crate::bandit::dlow_bernoulli;
use crate::bandit::dup_bernoulli;
use crate::bandit::exploration_rate;
use crate::candidate::Arena;
use crate::candidate::CandidateId;
use crate::errors::AnchorError;
use crate::instance::DataInstance;
use crate::instance::Label;
use crate::sampling::SamplingFunction;
use crate::sampling::SamplingService;
use crate::sampling::SamplingSession;
use crate::traits::ClassificationFunction;
use crate::traits::PerturbationFunction;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// per-level budget safety valve on the borderline back-off loop: caps how
/// many rounds a single candidate may absorb while waiting to separate from
/// τ, each round pulling `batch_size << min(round, MAX_BACKOFF_SHIFT)`
/// samples.
const MAX_BACKOFF_ROUNDS: u64 = 50;

/// caps the geometric growth of a single round's pull size at
/// `batch_size * 2^MAX_BACKOFF_SHIFT`, so a borderline candidate's sample
/// request can't blow past a sane bound even after many rounds.
const MAX_BACKOFF_SHIFT: u32 = 10;

/// beam search anchor constructor. owns its own arena and sampling service
/// for the lifetime of one [`AnchorConstructor::construct`] call; nothing
/// from one call is shared with the next.
pub struct AnchorConstructor {
    config: AnchorConfig,
    classifier: Arc<dyn ClassificationFunction>,
    oracle: Arc<dyn PerturbationFunction>,
}

impl AnchorConstructor {
    pub fn new(
        config: AnchorConfig,
        classifier: Arc<dyn ClassificationFunction>,
        oracle: Arc<dyn PerturbationFunction>,
    ) -> Self {
        Self {
            config,
            classifier,
            oracle,
        }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// run the full EXPAND/SAMPLE/SELECT state machine for `instance`,
    /// explaining why the classifier assigned `label`.
    pub fn construct(&self, instance: &DataInstance, label: Label) -> Result<AnchorResult, AnchorError> {
        let start = Instant::now();
        let mut sampling_elapsed = Duration::ZERO;

        let function = SamplingFunction::new(self.classifier.clone(), self.oracle.clone());
        let service = SamplingService::new(function, self.config.execution)?;
        let mut arena = Arena::new();

        let feature_count = instance.len();
        let max_depth = if self.config.max_anchor_size == 0 {
            feature_count
        } else {
            self.config.max_anchor_size.min(feature_count)
        };

        let mut beam: Vec<CandidateId> = Vec::new();
        let mut best_seen: Option<CandidateId> = None;
        let mut best_seen_precision = -1.0_f64;
        let mut accepted: Option<CandidateId> = None;

        let progress = crate::progress::bar(max_depth);
        for depth in 1..=max_depth {
            log::debug!("beam search depth {depth}");
            let level = self.generate_level(&mut arena, &beam, feature_count)?;
            if level.is_empty() {
                break;
            }

            let mut session = service.create_session(label);
            for &c in &level {
                session.register(c, self.config.initial_samples);
            }
            let t0 = Instant::now();
            service.run(&arena, &session)?;
            sampling_elapsed += t0.elapsed();

            if depth == 1 {
                let any_positive = level
                    .iter()
                    .map(|&c| arena.get(c).and_then(|cand| cand.positive()))
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .any(|positive| positive > 0);
                if !any_positive {
                    return Err(AnchorError::NoCandidateFound);
                }
            }

            let level_delta = self.config.delta / (depth as f64 * self.config.beam_width as f64);
            let k = self.config.beam_width.min(level.len());
            let t1 = Instant::now();
            let selected = self
                .config
                .bandit
                .identify(&arena, &service, label, &level, level_delta, self.config.epsilon, k)?;
            sampling_elapsed += t1.elapsed();

            for &c in &selected {
                let precision = arena.get(c)?.precision()?;
                if precision > best_seen_precision {
                    best_seen_precision = precision;
                    best_seen = Some(c);
                }
            }

            let mut scored = Vec::with_capacity(selected.len());
            for &c in &selected {
                let cand = arena.get(c)?;
                let coverage = match cand.coverage() {
                    Some(cov) => cov,
                    None => {
                        let cov = self.config.coverage.calculate(cand.features())?;
                        cand.set_coverage(cov)?;
                        cov
                    }
                };
                scored.push((c, coverage));
            }
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

            let backoff_result =
                self.accept_or_reject(&arena, &service, label, &scored, level.len().max(1), depth, level_delta, &mut sampling_elapsed)?;

            progress.inc(1);
            if let Some(c) = backoff_result {
                accepted = Some(c);
                break;
            }

            beam = selected;
        }
        progress.finish();

        let elapsed = start.elapsed();
        let winner = accepted
            .map(|c| (c, true))
            .or_else(|| {
                if self.config.allow_suboptimal {
                    best_seen.map(|c| (c, false))
                } else {
                    None
                }
            });

        let (winner, is_anchor) = match winner {
            Some(pair) => pair,
            None => return Err(AnchorError::NoCandidateFound),
        };

        let cand = arena.get(winner)?;
        let coverage = match cand.coverage() {
            Some(cov) => cov,
            None => {
                let cov = self.config.coverage.calculate(cand.features())?;
                cand.set_coverage(cov)?;
                cov
            }
        };
        Ok(AnchorResult {
            order: cand.order().to_vec(),
            features: cand.features().clone(),
            instance: instance.clone(),
            label,
            is_anchor,
            precision: cand.precision()?,
            coverage,
            total: cand.total()?,
            positive: cand.positive()?,
            elapsed,
            sampling_elapsed,
        })
    }

    /// produce the next beam level: every extension of a current parent (or
    /// of the virtual empty parent, at depth 1) by one feature not already
    /// present in the parent or in the globally immutable set, deduplicated
    /// by canonical feature set.
    fn generate_level(
        &self,
        arena: &mut Arena,
        beam: &[CandidateId],
        feature_count: usize,
    ) -> Result<Vec<CandidateId>, AnchorError> {
        let mut seen = HashSet::new();
        let mut level = Vec::new();

        if beam.is_empty() {
            for feature in 0..feature_count {
                if self.config.immutable.contains(&feature) {
                    continue;
                }
                let id = arena.insert_root(feature);
                if seen.insert(arena.get(id)?.features().clone()) {
                    level.push(id);
                }
            }
        } else {
            for &parent in beam {
                let parent_order = arena.get(parent)?.order().to_vec();
                for feature in 0..feature_count {
                    if self.config.immutable.contains(&feature) || parent_order.contains(&feature) {
                        continue;
                    }
                    let id = arena.insert_extension(parent, feature)?;
                    if seen.insert(arena.get(id)?.features().clone()) {
                        level.push(id);
                    }
                }
            }
        }
        Ok(level)
    }

    /// τ-check with KL bounds: accept the highest-coverage candidate whose
    /// KL lower bound clears τ, rejecting outright any whose upper bound
    /// falls short, and pulling extra samples (geometric back-off, capped)
    /// for anything still borderline.
    #[allow(clippy::too_many_arguments)]
    fn accept_or_reject(
        &self,
        arena: &Arena,
        service: &SamplingService,
        label: Label,
        scored: &[(CandidateId, crate::instance::Coverage)],
        n_candidates: usize,
        depth: usize,
        level_delta: crate::instance::Confidence,
        sampling_elapsed: &mut Duration,
    ) -> Result<Option<CandidateId>, AnchorError> {
        for &(c, _coverage) in scored {
            let mut rounds = 0u64;
            loop {
                let cand = arena.get(c)?;
                let precision = cand.precision()?;
                let total = cand.total()?;
                let beta = exploration_rate(n_candidates, depth as u64, level_delta);
                let level = beta / total.max(1) as f64;
                let lower = dlow_bernoulli(precision, level);
                let upper = dup_bernoulli(precision, level);

                if lower >= self.config.tau {
                    return Ok(Some(c));
                }
                if upper < self.config.tau {
                    break;
                }
                if rounds >= MAX_BACKOFF_ROUNDS {
                    break;
                }

                let shift = (rounds as u32).min(MAX_BACKOFF_SHIFT);
                let pulls = self.config.batch_size.saturating_mul(1u64 << shift);
                let mut session = SamplingSession::new(label);
                session.register(c, pulls);
                let t = Instant::now();
                service.run(arena, &session)?;
                *sampling_elapsed += t.elapsed();
                rounds += 1;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::config::AnchorBuilder;
    use crate::instance::FeatureValue;
    use crate::testing::ConstantClassifier;
    use crate::testing::SingleFeatureClassifier;
    use crate::testing::UniformOracle;

    fn instance(n: usize) -> DataInstance {
        DataInstance::new((0..n).map(|_| FeatureValue::Categorical(0)).collect())
    }

    #[test]
    fn constant_classifier_yields_a_perfect_singleton_anchor() {
        let config = AnchorBuilder::new()
            .tau(1.0)
            .delta(0.1)
            .epsilon(0.1)
            .beam_width(2)
            .initial_samples(10)
            .build()
            .unwrap();
        let constructor = AnchorConstructor::new(
            config,
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(5, 42)),
        );
        let result = constructor.construct(&instance(5), 1).unwrap();
        assert!(result.is_anchor);
        assert_eq!(result.precision, 1.0);
        assert_eq!(result.feature_count(), 1);
    }

    #[test]
    fn single_discriminative_feature_is_recovered() {
        let config = AnchorBuilder::new()
            .tau(0.95)
            .delta(0.1)
            .epsilon(0.1)
            .beam_width(2)
            .initial_samples(20)
            .build()
            .unwrap();
        let constructor = AnchorConstructor::new(
            config,
            Arc::new(SingleFeatureClassifier::new(0)),
            Arc::new(UniformOracle::new(4, 7)),
        );
        let base = DataInstance::new(vec![
            FeatureValue::Categorical(1),
            FeatureValue::Categorical(0),
            FeatureValue::Categorical(1),
            FeatureValue::Categorical(0),
        ]);
        let result = constructor.construct(&base, 1).unwrap();
        assert!(result.is_anchor);
        assert!(result.features.contains(&0));
    }

    #[test]
    fn no_candidate_found_without_suboptimal_fallback() {
        let config = AnchorBuilder::new()
            .tau(1.0)
            .delta(0.1)
            .epsilon(0.1)
            .beam_width(1)
            .initial_samples(5)
            .allow_suboptimal(false)
            .build()
            .unwrap();
        // classifier always returns 0, label we ask for is 1: no candidate
        // can ever have a positive sample.
        let constructor = AnchorConstructor::new(
            config,
            Arc::new(ConstantClassifier::new(0)),
            Arc::new(UniformOracle::new(3, 3)),
        );
        let err = constructor.construct(&instance(3), 1).unwrap_err();
        assert!(matches!(err, AnchorError::NoCandidateFound));
    }

    #[test]
    fn noise_only_classifier_yields_no_anchor_or_an_honest_fallback() {
        use crate::testing::CoinClassifier;

        let config = AnchorBuilder::new()
            .tau(0.95)
            .delta(0.1)
            .epsilon(0.1)
            .beam_width(2)
            .initial_samples(20)
            .allow_suboptimal(true)
            .build()
            .unwrap();
        let constructor = AnchorConstructor::new(
            config,
            Arc::new(CoinClassifier::new(123)),
            Arc::new(UniformOracle::new(4, 456)),
        );
        match constructor.construct(&instance(4), 1) {
            Ok(result) => assert!(!result.is_anchor, "a coin-flip label should never meet tau=0.95"),
            Err(AnchorError::NoCandidateFound) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
