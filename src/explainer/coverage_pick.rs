use crate::construction::AnchorResult;

/// repeatedly picks the surviving result with the largest coverage, then
/// removes every other survivor that shares a (feature, value) pair with it
/// -- restricted to same-label survivors when `include_target_value` is set,
/// so that results explaining a different label are never excluded purely
/// for overlapping on feature values.
pub fn coverage_pick(results: &[AnchorResult], budget: usize, include_target_value: bool) -> Vec<usize> {
    let mut survivors: Vec<usize> = (0..results.len()).collect();
    let mut chosen = Vec::new();

    while chosen.len() < budget && !survivors.is_empty() {
        let (pos, &picked) = survivors
            .iter()
            .enumerate()
            .max_by(|(_, &a), (_, &b)| results[a].coverage.partial_cmp(&results[b].coverage).unwrap())
            .expect("survivors non-empty");
        survivors.remove(pos);
        chosen.push(picked);

        survivors.retain(|&idx| {
            let same_label = results[idx].label == results[picked].label;
            let overlaps = shares_feature_value(&results[idx], &results[picked]);
            !(overlaps && (!include_target_value || same_label))
        });
    }

    chosen
}

fn shares_feature_value(a: &AnchorResult, b: &AnchorResult) -> bool {
    a.features
        .intersection(&b.features)
        .any(|&feature| a.instance.value(feature) == b.instance.value(feature))
}
