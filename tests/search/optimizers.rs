use metalg::optimizer::{Optimizer, RandomSearch};
use metalg::{Error, Expr, Float, Int, List, Search, SearchSpace, Value, args, function};

fn identity() -> Expr {
    function("f", |a| Ok(a.arg(0)?.clone()))
}

#[cfg(feature = "gp")]
#[test]
fn test_bayesian_ask_tell_loop() {
    use metalg::optimizer::BayesianOptimizer;

    let program = identity().call(args![Float::new(0.0, 10.0).name("x")]);
    let space = SearchSpace::from_expr(&program).unwrap();
    let mut opt = BayesianOptimizer::builder()
        .n_initial_points(5)
        .n_candidates(500)
        .seed(42)
        .build(&space);

    let mut results = Vec::new();
    for _ in 0..30 {
        let x = opt.ask().unwrap();
        let bindings = space.decode(&x).unwrap();
        let frozen = program.clone_shallow().frozen(&bindings).unwrap();
        let y = frozen.evaluate().unwrap().as_f64().unwrap();
        opt.tell(&x, y, true).unwrap();
        results.push(y);
    }
    assert_eq!(opt.observations().len(), 30);
    let best = results.iter().copied().fold(f64::INFINITY, f64::min);
    assert!(best < 2.0, "best {best}");
    assert!(results.iter().all(|y| (0.0..=10.0).contains(y)));
}

#[cfg(feature = "gp")]
#[test]
fn test_bayesian_search_on_mixed_space() {
    use metalg::optimizer::BayesianOptimizer;

    let score = function("score", |a| {
        let x = a.arg(0)?.as_f64()?;
        let n = a.arg(1)?.as_i64()?;
        let bonus = match a.arg(2)?.as_str() {
            Some("good") => 0.0,
            _ => 1.0,
        };
        Ok(Value::Float((x - 0.3).powi(2) + (n as f64 - 4.0).abs() + bonus))
    });
    let program = score.call(args![
        Float::new(0.0, 1.0).name("x"),
        Int::new(1, 8).name("n"),
        List::new(["bad", "good"]).name("kind"),
    ]);
    let space = SearchSpace::from_expr(&program).unwrap();
    let optimizer = BayesianOptimizer::builder()
        .n_initial_points(6)
        .n_candidates(300)
        .seed(8)
        .build(&space);
    let mut search = Search::builder(program)
        .optimizer(optimizer)
        .limit(25)
        .build()
        .unwrap();
    for item in search.by_ref() {
        let (_, mut e) = item.unwrap();
        let y = e.evaluate().unwrap().as_f64().unwrap();
        e.report(y).unwrap();
    }
    let best = search.best().unwrap();
    assert!(best.value.is_finite());
    assert!(search.history().iter().all(|o| o.value >= best.value));
}

#[test]
fn test_random_search_records_observations() {
    let x: Expr = Int::new(0, 9).into();
    let space = SearchSpace::from_expr(&x).unwrap();
    let mut opt = RandomSearch::with_seed(&space, 4);
    for i in 0..5 {
        let p = opt.ask().unwrap();
        opt.tell(&p, f64::from(i), false).unwrap();
    }
    assert_eq!(opt.observations().len(), 5);
    assert!(matches!(
        opt.tell(&[1.0, 2.0], 0.0, false),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_boxed_optimizer_is_an_optimizer() {
    let x: Expr = Float::new(-1.0, 1.0).into();
    let space = SearchSpace::from_expr(&x).unwrap();
    let mut boxed: Box<dyn Optimizer> = Box::new(RandomSearch::with_seed(&space, 2));
    let p = boxed.ask().unwrap();
    assert_eq!(p.len(), 1);
    assert!((-1.0..=1.0).contains(&p[0]));
    boxed.tell(&p, 0.5, true).unwrap();
}
