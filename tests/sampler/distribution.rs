use metalg::{Choice, Distribution, Error};

fn floats(d: &Distribution, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = fastrand::Rng::with_seed(seed);
    d.draw(n, &mut rng)
        .iter()
        .map(|c| c.as_f64().unwrap())
        .collect()
}

#[test]
fn test_float_draws_are_uniform() {
    let d = Distribution::float(0.0, 1.0, false).unwrap();
    let mut samples = floats(&d, 1000, 42);
    for &s in &samples {
        assert!((0.0..=1.0).contains(&s), "sample {s} out of range [0, 1]");
    }

    samples.sort_by(f64::total_cmp);
    let q1 = samples[250];
    let q2 = samples[500];
    let q3 = samples[750];
    assert!((q1 - 0.25).abs() < 0.1, "Q1 {q1} should be close to 0.25");
    assert!((q2 - 0.5).abs() < 0.1, "Q2 {q2} should be close to 0.5");
    assert!((q3 - 0.75).abs() < 0.1, "Q3 {q3} should be close to 0.75");
}

#[test]
fn test_log_float_draws_are_uniform_in_log_space() {
    let d = Distribution::float(1e-4, 1.0, true).unwrap();
    let mut logs: Vec<f64> = floats(&d, 2000, 7).iter().map(|v| v.log10()).collect();
    assert!(logs.iter().all(|&l| (-4.0..=0.0).contains(&l)));

    logs.sort_by(f64::total_cmp);
    let median = logs[1000];
    assert!((median + 2.0).abs() < 0.3, "median exponent {median} should be close to -2");
}

#[test]
fn test_int_draws_cover_every_value() {
    let d = Distribution::int(1, 10, false).unwrap();
    let mut rng = fastrand::Rng::with_seed(123);
    let mut counts = [0_u32; 10];
    for c in d.draw(5000, &mut rng) {
        let Choice::Int(v) = c else {
            panic!("expected an int draw")
        };
        assert!((1..=10).contains(&v));
        counts[(v - 1) as usize] += 1;
    }
    for (i, &count) in counts.iter().enumerate() {
        assert!(
            (300..=700).contains(&count),
            "value {} drawn {count} times",
            i + 1
        );
    }
}

#[test]
fn test_log_int_draws_favor_small_values() {
    let d = Distribution::int(1, 1024, true).unwrap();
    let mut rng = fastrand::Rng::with_seed(9);
    let draws: Vec<i64> = d
        .draw(2000, &mut rng)
        .iter()
        .map(|c| c.as_i64().unwrap())
        .collect();
    assert!(draws.iter().all(|v| (1..=1024).contains(v)));
    let below_32 = draws.iter().filter(|&&v| v <= 32).count();
    // Half of the log range lies below 32.
    assert!((800..=1200).contains(&below_32), "{below_32} draws below 32");
}

#[test]
fn test_categorical_draws_are_indices() {
    let d = Distribution::categorical(3).unwrap();
    let mut rng = fastrand::Rng::with_seed(1);
    let mut seen = [false; 3];
    for c in d.draw(200, &mut rng) {
        let i = usize::try_from(c.as_i64().unwrap()).unwrap();
        seen[i] = true;
    }
    assert_eq!(seen, [true; 3]);
}

#[test]
fn test_distribution_validation() {
    assert!(matches!(
        Distribution::float(1.0, 0.0, false),
        Err(Error::InvalidBounds { .. })
    ));
    assert!(matches!(
        Distribution::float(0.0, f64::INFINITY, false),
        Err(Error::InvalidBounds { .. })
    ));
    assert!(matches!(
        Distribution::int(0, 10, true),
        Err(Error::InvalidLogBounds)
    ));
    assert!(matches!(
        Distribution::categorical(0),
        Err(Error::EmptyChoices)
    ));
    assert!(Distribution::int(3, 3, false).is_ok());
}

#[test]
fn test_internal_bounds() {
    let d = Distribution::int(1, 100, true).unwrap();
    let (lo, hi) = d.internal_bounds().unwrap();
    assert!(lo.abs() < 1e-12);
    assert!((hi - 100_f64.ln()).abs() < 1e-12);
    assert!(Distribution::categorical(4).unwrap().internal_bounds().is_none());
}
