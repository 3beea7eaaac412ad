use crate::construction::AnchorConfig;
use crate::construction::AnchorConstructor;
use crate::construction::AnchorResult;
use crate::errors::AnchorError;
use crate::instance::DataInstance;
use crate::traits::ClassificationFunction;
use crate::traits::PerturbationFunction;
use crate::traits::ReconfigurablePerturbationFunction;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// runs one [`AnchorConstructor`] per instance across a dataset, in
/// parallel. owns the outer worker pool (T_outer); each task gets its own
/// builder-reconfigured oracle and its own inner pool, so effective
/// parallelism is T_outer × T_inner.
pub struct BatchExplainer {
    pool: rayon::ThreadPool,
    cancel: Arc<AtomicBool>,
}

impl BatchExplainer {
    /// one task per available core, the same default the teacher uses for
    /// its own worker pools.
    pub fn with_default_parallelism() -> Result<Self, AnchorError> {
        Self::new(num_cpus::get())
    }

    pub fn new(threads: usize) -> Result<Self, AnchorError> {
        if threads == 0 {
            return Err(AnchorError::InvalidParameter(
                "batch explainer requires at least one thread".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| AnchorError::InvalidParameter(e.to_string()))?;
        Ok(Self {
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// explain every instance, dropping (with a log warning) any instance
    /// for which no candidate was found or construction errored, and
    /// stopping early on the rest once cancellation is observed.
    pub fn obtain_anchors(
        &self,
        config: &AnchorConfig,
        classifier: Arc<dyn ClassificationFunction>,
        oracle: Arc<dyn ReconfigurablePerturbationFunction>,
        instances: &[DataInstance],
    ) -> Vec<AnchorResult> {
        let cancel = self.cancel.clone();
        let progress = crate::progress::bar(instances.len());
        let results = self.pool.install(|| {
            use rayon::prelude::*;
            instances
                .par_iter()
                .filter_map(|instance| {
                    if cancel.load(Ordering::Acquire) {
                        return None;
                    }
                    let per_instance_oracle: Arc<dyn PerturbationFunction> = Arc::from(oracle.for_instance(instance));
                    let label = classifier.predict_one(instance);
                    let constructor = AnchorConstructor::new(config.clone(), classifier.clone(), per_instance_oracle);
                    let result = match constructor.construct(instance, label) {
                        Ok(result) => Some(result),
                        Err(AnchorError::NoCandidateFound) => {
                            log::warn!("no anchor found for an instance; skipping it");
                            None
                        }
                        Err(e) => {
                            log::warn!("anchor construction failed ({e}); skipping instance");
                            None
                        }
                    };
                    progress.inc(1);
                    result
                })
                .collect()
        });
        progress.finish();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::AnchorBuilder;
    use crate::instance::FeatureValue;
    use crate::testing::ConstantClassifier;
    use crate::testing::UniformOracle;

    #[test]
    fn explains_every_instance_with_a_discriminative_constant_classifier() {
        let config = AnchorBuilder::new()
            .tau(1.0)
            .delta(0.1)
            .epsilon(0.1)
            .beam_width(2)
            .initial_samples(10)
            .build()
            .unwrap();
        let explainer = BatchExplainer::new(2).unwrap();
        let instances: Vec<DataInstance> = (0..4)
            .map(|_| DataInstance::new(vec![FeatureValue::Categorical(0); 3]))
            .collect();
        let results = explainer.obtain_anchors(
            &config,
            Arc::new(ConstantClassifier::new(1)),
            Arc::new(UniformOracle::new(3, 99)),
            &instances,
        );
        assert_eq!(results.len(), instances.len());
        assert!(results.iter().all(|r| r.is_anchor));
    }

    #[test]
    fn default_parallelism_matches_available_cores() {
        let explainer = BatchExplainer::with_default_parallelism().unwrap();
        assert_eq!(explainer.pool.current_num_threads(), num_cpus::get());
    }
}
