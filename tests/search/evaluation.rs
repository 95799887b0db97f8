use metalg::{Choice, Expr, Float, Int, List, Search, Value, args, function};

#[test]
fn test_maximize_reports_raw_values() {
    let x: Expr = Int::new(0, 50).name("x").into();
    let mut search = Search::builder(&x * 2).maximize().limit(15).seed(3).build().unwrap();
    for item in search.by_ref() {
        let (_, mut e) = item.unwrap();
        let y = e.evaluate().unwrap().as_f64().unwrap();
        assert!(e.report(y).unwrap());
    }
    let history = search.history();
    assert_eq!(history.len(), 15);
    for o in &history {
        let x = o.bindings.get("x").and_then(Choice::as_f64).unwrap();
        assert!((o.value - 2.0 * x).abs() < 1e-12);
    }
    let best = search.best().unwrap();
    assert!(history.iter().all(|o| o.value <= best.value));
}

#[test]
fn test_ties_keep_the_earliest() {
    let l: Expr = List::new([0, 1]).name("l").into();
    let mut search = Search::builder(l).limit(4).seed(1).build().unwrap();
    for item in search.by_ref() {
        let (_, mut e) = item.unwrap();
        e.report(1.0).unwrap();
    }
    assert_eq!(search.best().unwrap().index, 0);
}

#[test]
fn test_all_failures_have_no_best() {
    let x: Expr = Float::new(0.0, 1.0).into();
    let mut search = Search::builder(x).limit(3).seed(9).build().unwrap();
    for item in search.by_ref() {
        let (_, mut e) = item.unwrap();
        e.report_failure().unwrap();
    }
    assert!(search.best().is_none());
    assert!(search.history().iter().all(metalg::Observation::is_failure));
}

#[test]
fn test_host_error_can_be_reported_as_failure() {
    let picky = function("picky", |a| {
        let v = a.arg(0)?.as_i64()?;
        if v % 2 == 0 {
            Ok(Value::Int(v))
        } else {
            Err(metalg::Error::host("odd input"))
        }
    });
    let program = picky.call(args![Int::new(0, 9).name("v")]);
    let mut search = Search::builder(program).limit(20).seed(12).build().unwrap();
    for item in search.by_ref() {
        let (_, mut e) = item.unwrap();
        match e.evaluate() {
            Ok(v) => e.report(v.as_f64().unwrap()).unwrap(),
            Err(_) => e.report_failure().unwrap(),
        };
    }
    let history = search.history();
    assert_eq!(history.len(), 20);
    for o in history {
        let v = o.bindings.get("v").and_then(Choice::as_i64).unwrap();
        assert_eq!(o.is_failure(), v % 2 != 0);
    }
}

#[test]
fn test_evaluation_vector_encodes_bindings() {
    let program = function("f", |_| Ok(Value::None)).call(args![
        Int::new(1, 100).log_scale().name("a"),
        List::new(["p", "q", "r"]).name("b"),
    ]);
    let mut search = Search::builder(program).limit(1).seed(2).build().unwrap();
    let (_, e) = search.next().unwrap().unwrap();
    let encoded = search.space().encode(e.bindings()).unwrap();
    assert_eq!(encoded.len(), e.vector().len());
    // The categorical component round-trips exactly.
    assert!((encoded[1] - e.vector()[1].round()).abs() < 1e-12);
}
