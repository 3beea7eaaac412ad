use crate::construction::AnchorResult;

/// greedy submodular maximization over column (feature) coverage: builds an
/// importance matrix `W[i, j] = sqrt(precision_i)` where feature `j` appears
/// in result `i`'s anchor (else 0), scores each column by its total
/// importance across all results, then repeatedly picks the result whose
/// addition grows covered-column importance the most.
pub fn submodular_pick(results: &[AnchorResult], feature_count: usize, budget: usize) -> Vec<usize> {
    if results.is_empty() || budget == 0 {
        return Vec::new();
    }

    let mut column_importance = vec![0.0_f64; feature_count];
    for result in results {
        let weight = result.precision.max(0.0).sqrt();
        for &feature in &result.features {
            if feature < feature_count {
                column_importance[feature] += weight;
            }
        }
    }

    let mut chosen = Vec::new();
    let mut remaining: Vec<usize> = (0..results.len()).collect();
    let mut covered = vec![false; feature_count];
    let mut current_value = 0.0_f64;

    while chosen.len() < budget && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_gain = f64::NEG_INFINITY;

        for (pos, &idx) in remaining.iter().enumerate() {
            let mut value = current_value;
            for &feature in &results[idx].features {
                if feature < feature_count && !covered[feature] {
                    value += column_importance[feature];
                }
            }
            let gain = value - current_value;
            if gain > best_gain {
                best_gain = gain;
                best_pos = pos;
            }
        }

        let picked = remaining.remove(best_pos);
        for &feature in &results[picked].features {
            if feature < feature_count {
                covered[feature] = true;
            }
        }
        current_value = covered
            .iter()
            .enumerate()
            .filter(|(_, &c)| c)
            .map(|(j, _)| column_importance[j])
            .sum();
        chosen.push(picked);
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::DataInstance;
    use crate::instance::FeatureValue;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn result(features: &[usize], precision: f64) -> AnchorResult {
        AnchorResult {
            order: features.to_vec(),
            features: features.iter().copied().collect::<BTreeSet<_>>(),
            instance: DataInstance::new(vec![FeatureValue::Categorical(0); 3]),
            label: 1,
            is_anchor: true,
            precision,
            coverage: 0.5,
            total: 100,
            positive: (precision * 100.0) as u64,
            elapsed: Duration::ZERO,
            sampling_elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn picks_at_most_budget_results() {
        let results = vec![
            result(&[0], 0.9),
            result(&[1], 0.9),
            result(&[0, 1], 0.95),
            result(&[2], 0.8),
        ];
        let picked = submodular_pick(&results, 3, 2);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn prefers_results_that_extend_column_coverage() {
        let results = vec![result(&[0], 0.9), result(&[0], 0.9), result(&[1], 0.9)];
        let picked = submodular_pick(&results, 2, 2);
        // the two chosen anchors must between them touch both columns.
        let touched: BTreeSet<usize> = picked.iter().flat_map(|&i| results[i].features.clone()).collect();
        assert_eq!(touched.len(), 2);
    }
}
