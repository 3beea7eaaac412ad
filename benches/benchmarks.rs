criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        kl_bernoulli_divergence,
        upper_inversion_bisection,
        lower_inversion_bisection,
        beam_search_constant_classifier,
        kllucb_select_top_k,
}

fn kl_bernoulli_divergence(c: &mut criterion::Criterion) {
    c.bench_function("KL(0.6, 0.4)", |b| {
        b.iter(|| anchors::bandit::kl_bernoulli(0.6, 0.4))
    });
}

fn upper_inversion_bisection(c: &mut criterion::Criterion) {
    c.bench_function("dupBernoulli(0.4, 0.2458933742)", |b| {
        b.iter(|| anchors::bandit::dup_bernoulli(0.4, 0.2458933742))
    });
}

fn lower_inversion_bisection(c: &mut criterion::Criterion) {
    c.bench_function("dlowBernoulli(0.5, 2.32114463107)", |b| {
        b.iter(|| anchors::bandit::dlow_bernoulli(0.5, 2.32114463107))
    });
}

fn beam_search_constant_classifier(c: &mut criterion::Criterion) {
    use anchors::construction::AnchorBuilder;
    use anchors::construction::AnchorConstructor;
    use anchors::instance::DataInstance;
    use anchors::instance::FeatureValue;
    use anchors::testing::ConstantClassifier;
    use anchors::testing::UniformOracle;
    use std::sync::Arc;

    let config = AnchorBuilder::new()
        .tau(1.0)
        .delta(0.1)
        .epsilon(0.1)
        .beam_width(2)
        .initial_samples(10)
        .build()
        .unwrap();
    let instance = DataInstance::new(vec![FeatureValue::Categorical(0); 8]);

    c.bench_function("beam search over an 8-feature constant classifier", |b| {
        b.iter(|| {
            let constructor = AnchorConstructor::new(
                config.clone(),
                Arc::new(ConstantClassifier::new(1)),
                Arc::new(UniformOracle::new(8, 1234)),
            );
            constructor.construct(&instance, 1).unwrap()
        })
    });
}

fn kllucb_select_top_k(c: &mut criterion::Criterion) {
    use anchors::bandit::BestAnchorIdentification;
    use anchors::bandit::KlLucb;
    use anchors::candidate::Arena;
    use anchors::sampling::SamplingExecution;
    use anchors::sampling::SamplingFunction;
    use anchors::sampling::SamplingService;
    use anchors::testing::ConstantClassifier;
    use anchors::testing::UniformOracle;
    use std::sync::Arc;

    let mut arena = Arena::new();
    let ids: Vec<_> = (0..10).map(|i| arena.insert_root(i)).collect();
    let function = SamplingFunction::new(
        Arc::new(ConstantClassifier::new(1)),
        Arc::new(UniformOracle::new(10, 55)),
    );
    let service = SamplingService::new(function, SamplingExecution::Linear).unwrap();
    let bandit = KlLucb::default();

    c.bench_function("KL-LUCB top-3 of 10 identical arms", |b| {
        b.iter(|| bandit.identify(&arena, &service, 1, &ids, 0.1, 0.1, 3).unwrap())
    });
}
