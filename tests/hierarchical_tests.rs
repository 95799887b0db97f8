use metalg::sampler::{RandomSampler, Sampler};
use metalg::{Bindings, Choice, Expr, Int, List, Term, Value, args, function};

fn f() -> Expr {
    function("f", |a| Ok(a.arg(0)?.clone()))
}

fn g() -> Expr {
    function("g", |a| Ok(Value::Int(-a.arg(0)?.as_i64()?)))
}

fn h() -> Expr {
    function("h", |a| Ok(Value::Int(a.arg(0)?.as_i64()? + 1)))
}

fn id_of(e: &Expr) -> String {
    e.as_var().unwrap().id().to_string()
}

#[test]
fn test_choice_between_functions() {
    let (f, g) = (f(), g());
    let choose = List::new([f.clone(), g.clone()]);
    let program = h().call(args![Expr::from(choose).call(args![1])]);

    let choices = program.choices();
    assert_eq!(choices.len(), 1);
    // Same configuration, different id.
    assert_eq!(choices[0], Expr::from(List::new([f, g])));

    let id = id_of(&choices[0]);
    program.freeze(&Bindings::from([(id.as_str(), 0)])).unwrap();
    assert_eq!(program.evaluate().unwrap(), Value::Int(2));
}

#[test]
fn test_choice_between_sub_programs() {
    let a: Expr = List::new([1, 3, 5]).name("a").into();
    let b: Expr = List::new([2, 4, 6]).name("b").into();
    let outer: Expr = List::new([f().call(args![&a]), g().call(args![&b])])
        .name("outer")
        .into();
    let program = h().call(args![&outer]);

    let choices = program.choices();
    assert_eq!(choices.len(), 1);
    assert_eq!(id_of(&choices[0]), "outer");
    assert_eq!(program.variables().len(), 3);

    // Only the selected branch needs a binding.
    program
        .freeze(&Bindings::from([("outer", 0), ("a", 2)]))
        .unwrap();
    assert_eq!(program.evaluate().unwrap(), Value::Int(6));
    assert!(!b.as_var().unwrap().is_bound());
}

#[test]
fn test_freeze_reports_missing_active_binding() {
    let a: Expr = List::new([1, 3, 5]).name("a").into();
    let outer: Expr = List::new([f().call(args![&a]), g().call(args![0])])
        .name("outer")
        .into();
    let err = outer.freeze(&Bindings::from([("outer", 0)])).unwrap_err();
    assert!(matches!(err, metalg::Error::MissingBinding(id) if id.as_str() == "a"));
}

#[test]
fn test_sampled_bindings_cover_only_active_variables() {
    let a: Expr = Int::new(0, 9).name("a").into();
    let b: Expr = Int::new(0, 9).name("b").into();
    let outer: Expr = List::new([f().call(args![&a]), g().call(args![&b])])
        .name("outer")
        .into();

    let sampler = RandomSampler::with_seed(h().call(args![&outer]), 17);
    let mut seen_both_branches = [false; 2];
    for bindings in sampler.sample_n(100).unwrap() {
        match bindings.get("outer") {
            Some(Choice::Int(0)) => {
                seen_both_branches[0] = true;
                assert!(bindings.contains("a") && !bindings.contains("b"));
            }
            Some(Choice::Int(1)) => {
                seen_both_branches[1] = true;
                assert!(bindings.contains("b") && !bindings.contains("a"));
            }
            other => panic!("unexpected choice {other:?}"),
        }
    }
    assert_eq!(seen_both_branches, [true, true]);
}

fn invariant_network() -> Expr {
    let network = function("network", |a| Ok(a.arg(0)?.clone()));
    let max_layers: i64 = 5;
    let num_layers: Expr = Int::new(1, max_layers).name("num_layers").into();
    let layers = List::new((0..max_layers).map(|i| {
        Expr::from(List::new([format!("dense_{i}"), format!("conv_{i}")]).name(format!("layer_{i}")))
    }))
    .k(&num_layers)
    .invariant()
    .name("layers");

    let stack = Term::from(vec!["input_layer"]) + layers + vec!["output_layer"];
    network.call(args![stack])
}

#[test]
fn test_invariant_variables_order() {
    let net = invariant_network();
    let ids: Vec<String> = net.variables().iter().map(id_of).collect();
    assert_eq!(
        ids,
        ["layers", "num_layers", "layer_0", "layer_1", "layer_2", "layer_3", "layer_4"]
    );
    let roots: Vec<String> = net.choices().iter().map(id_of).collect();
    assert_eq!(roots, ["layers", "num_layers"]);
}

#[test]
fn test_invariant_selection_is_a_prefix() {
    let net = invariant_network();
    let sampler = RandomSampler::with_seed(net, 42);

    for _ in 0..30 {
        let (bindings, program) = sampler.sample_program().unwrap();
        let Some(Choice::Int(k)) = bindings.get("num_layers") else {
            panic!("num_layers must be drawn")
        };
        let k = usize::try_from(*k).unwrap();
        assert_eq!(
            bindings.get("layers"),
            Some(&Choice::Indices((0..k).collect()))
        );
        for i in 0..5 {
            assert_eq!(bindings.contains(&format!("layer_{i}")), i < k);
        }

        let out = program.evaluate().unwrap();
        let items = out.as_list().unwrap();
        assert_eq!(items.len(), k + 2);
        assert_eq!(items[0], Value::str("input_layer"));
        assert_eq!(items[k + 1], Value::str("output_layer"));
        for (i, item) in items[1..=k].iter().enumerate() {
            let name = item.as_str().unwrap();
            assert!(name == format!("dense_{i}") || name == format!("conv_{i}"));
        }
    }
}

#[test]
fn test_explicit_invariant_freeze() {
    let net = invariant_network();
    let bindings = Bindings::from([
        ("layers", Choice::Indices(vec![0, 1])),
        ("num_layers", Choice::Int(2)),
        ("layer_0", Choice::Int(1)),
        ("layer_1", Choice::Int(0)),
    ]);
    let program = net.clone_shallow().frozen(&bindings).unwrap();
    assert_eq!(
        program.evaluate().unwrap(),
        Value::List(vec![
            Value::str("input_layer"),
            Value::str("conv_0"),
            Value::str("dense_1"),
            Value::str("output_layer"),
        ])
    );

    let wrong_len = Bindings::from([
        ("layers", Choice::Indices(vec![0, 1, 2])),
        ("num_layers", Choice::Int(2)),
    ]);
    assert!(net.clone_shallow().freeze(&wrong_len).is_err());
}

#[test]
fn test_nested_int_bounds() {
    let layers = function("layers", |a| Ok(Value::List(a.positional.clone())));
    let u1: Expr = Int::new(32, 512).into();
    let u2: Expr = Int::new(32, &u1).into();
    let u3: Expr = Int::new(32, &u2).into();
    let u4: Expr = Int::new(32, &u3).into();
    let exp = layers.call(args![&u1, &u2, &u3, &u4]);

    let sampler = RandomSampler::with_seed(exp, 42);
    for _ in 0..50 {
        let (_, program) = sampler.sample_program().unwrap();
        let units: Vec<i64> = program
            .evaluate()
            .unwrap()
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(units.len(), 4);
        assert!(units[0] <= 512);
        assert!(units.windows(2).all(|w| w[0] >= w[1]), "{units:?}");
        assert!(units[3] >= 32);
    }
}

#[test]
fn test_nested_float_bounds() {
    let pair = function("pair", |a| Ok(Value::List(a.positional.clone())));
    let hi: metalg::Expr = metalg::Float::new(32.0, 512.0).into();
    let lo: metalg::Expr = metalg::Float::new(32.0, &hi).into();
    let sampler = RandomSampler::with_seed(pair.call(args![&hi, &lo]), 5);
    for _ in 0..50 {
        let (_, program) = sampler.sample_program().unwrap();
        let v = program.evaluate().unwrap();
        let items = v.as_list().unwrap();
        let (a, b) = (items[0].as_f64().unwrap(), items[1].as_f64().unwrap());
        assert!((32.0..=512.0).contains(&a));
        assert!((32.0..=a).contains(&b));
    }
}

#[test]
fn test_shared_variable_is_drawn_once() {
    let x: Expr = Int::new(0, 1_000_000).name("x").into();
    let pair = function("pair", |a| Ok(Value::List(a.positional.clone())));
    let sampler = RandomSampler::with_seed(pair.call(args![&x, &x + 0]), 8);
    for _ in 0..10 {
        let (_, program) = sampler.sample_program().unwrap();
        let v = program.evaluate().unwrap();
        let items = v.as_list().unwrap();
        assert_eq!(items[0], items[1]);
    }
}
