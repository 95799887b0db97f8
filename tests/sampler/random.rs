use metalg::sampler::{RandomSampler, Sampler};
use metalg::{Choice, Distribution, Expr, Float, Int, List, Term, Value, args, function};

fn pair() -> Expr {
    function("pair", |a| Ok(Value::List(a.positional.clone())))
}

#[test]
fn test_seeded_samplers_are_reproducible() {
    let program = pair().call(args![
        Int::new(0, 100).name("a"),
        Float::new(0.0, 1.0).name("b"),
    ]);
    let first = RandomSampler::with_seed(program.clone(), 42).sample_n(25).unwrap();
    let second = RandomSampler::with_seed(program.clone(), 42).sample_n(25).unwrap();
    assert_eq!(first, second);

    let other = RandomSampler::with_seed(program, 43).sample_n(25).unwrap();
    assert_ne!(first, other);
}

#[test]
fn test_successive_samples_differ() {
    let x: Expr = Float::new(0.0, 1.0).name("x").into();
    let sampler = RandomSampler::with_seed(x, 5);
    let draws = sampler.sample_n(10).unwrap();
    let distinct = draws.windows(2).filter(|w| w[0] != w[1]).count();
    assert!(distinct > 0);
}

#[test]
fn test_float_quartiles_through_expression() {
    let x: Expr = Float::new(0.0, 1.0).name("x").into();
    let sampler = RandomSampler::with_seed(x, 42);
    let mut samples: Vec<f64> = sampler
        .sample_n(1000)
        .unwrap()
        .iter()
        .map(|b| b.get("x").and_then(Choice::as_f64).unwrap())
        .collect();
    samples.sort_by(f64::total_cmp);
    let q2 = samples[500];
    assert!((q2 - 0.5).abs() < 0.1, "Q2 (median) {q2} should be close to 0.5");
}

#[test]
fn test_list_branches_are_drawn_evenly() {
    let l: Expr = List::new(["a", "b", "c", "d"]).name("l").into();
    let sampler = RandomSampler::with_seed(l, 77);
    let mut counts = [0_u32; 4];
    for b in sampler.sample_n(4000).unwrap() {
        let i = b.get("l").and_then(Choice::as_i64).unwrap();
        counts[i as usize] += 1;
    }
    for &c in &counts {
        assert!((800..=1200).contains(&c), "{counts:?}");
    }
}

#[test]
fn test_nested_list_activation() {
    let inner: Expr = Int::new(0, 9).name("inner").into();
    let mid: Expr = List::new(vec![Term::from(&inner), Term::from("leaf")])
        .name("mid")
        .into();
    let outer: Expr = List::new(vec![Term::from(&mid), Term::from(0)])
        .name("outer")
        .into();

    let sampler = RandomSampler::with_seed(outer, 31);
    for b in sampler.sample_n(200).unwrap() {
        let outer_i = b.get("outer").and_then(Choice::as_i64).unwrap();
        assert_eq!(b.contains("mid"), outer_i == 0);
        let mid_i = b.get("mid").and_then(Choice::as_i64);
        assert_eq!(b.contains("inner"), mid_i == Some(0));
    }
}

#[test]
fn test_expression_sample_without_rng() {
    let x: Expr = Int::new(3, 3).name("x").into();
    let b = x.sample(None).unwrap();
    assert_eq!(b.get("x"), Some(&Choice::Int(3)));
}

#[test]
fn test_distribution_override_applies_to_named_variable_only() {
    let program = pair().call(args![
        Int::new(0, 1000).name("a"),
        Int::new(0, 1000).name("b"),
    ]);
    let sampler = RandomSampler::with_seed(program, 11)
        .with_distribution("a", Distribution::int(5, 6, false).unwrap());
    let mut b_values = Vec::new();
    for b in sampler.sample_n(50).unwrap() {
        let a = b.get("a").and_then(Choice::as_i64).unwrap();
        assert!((5..=6).contains(&a));
        b_values.push(b.get("b").and_then(Choice::as_i64).unwrap());
    }
    assert!(b_values.iter().any(|&v| v > 6));
}

#[test]
fn test_sampled_programs_evaluate() {
    let add = function("add", |a| {
        Ok(Value::Int(a.arg(0)?.as_i64()? + a.arg(1)?.as_i64()?))
    });
    let program = add.call(args![Int::new(0, 5).name("x"), Int::new(10, 15).name("y")]);
    let sampler = RandomSampler::with_seed(program, 2);
    for _ in 0..20 {
        let (bindings, frozen) = sampler.sample_program().unwrap();
        let x = bindings.get("x").and_then(Choice::as_i64).unwrap();
        let y = bindings.get("y").and_then(Choice::as_i64).unwrap();
        assert_eq!(frozen.evaluate().unwrap(), Value::Int(x + y));
    }
}

#[test]
fn test_sampler_is_shareable_across_threads() {
    let x: Expr = Int::new(0, 100).name("x").into();
    let sampler = std::sync::Arc::new(RandomSampler::with_seed(x, 4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sampler = std::sync::Arc::clone(&sampler);
            std::thread::spawn(move || sampler.sample_n(25).unwrap().len())
        })
        .collect();
    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 100);
}
