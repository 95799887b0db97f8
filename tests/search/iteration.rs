use std::sync::Arc;

use metalg::optimizer::{Optimizer, RandomSearch};
use metalg::sampler::RandomSampler;
use metalg::{
    Direction, Error, Expr, Float, Int, List, Search, SearchSpace, SearchState, Value, args,
    function,
};

fn identity() -> Expr {
    function("f", |a| Ok(a.arg(0)?.clone()))
}

#[test]
fn test_limit_counts_proposals() {
    let x: Expr = Int::new(0, 9).name("x").into();
    let search = Search::builder(x).limit(7).seed(1).build().unwrap();
    assert_eq!(search.count(), 7);
}

#[test]
fn test_indices_are_sequential() {
    let x: Expr = Float::new(0.0, 1.0).into();
    let search = Search::builder(x).limit(5).seed(4).build().unwrap();
    let indices: Vec<usize> = search.map(|r| r.unwrap().0).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4]);
}

#[test]
fn test_unreported_proposals_do_not_block() {
    let x: Expr = Int::new(0, 9).name("x").into();
    let mut search = Search::builder(x).limit(10).seed(2).build().unwrap();
    let pending: Vec<_> = search.by_ref().map(|r| r.unwrap().1).collect();
    assert_eq!(pending.len(), 10);
    assert!(search.history().is_empty());
    assert_eq!(search.state(), SearchState::Exhausted);
}

#[test]
fn test_reports_in_any_order() {
    let x: Expr = Int::new(0, 9).name("x").into();
    let mut search = Search::builder(x).limit(3).seed(8).build().unwrap();
    let mut pending: Vec<_> = search.by_ref().map(|r| r.unwrap().1).collect();
    while let Some(mut e) = pending.pop() {
        let y = e.evaluate().unwrap().as_f64().unwrap();
        e.report(y).unwrap();
    }
    let order: Vec<usize> = search.history().iter().map(|o| o.index).collect();
    assert_eq!(order, [2, 1, 0]);
}

#[test]
fn test_proposals_are_valid_programs() {
    let program = identity().call(args![List::new(vec![
        metalg::Term::from(-1),
        List::new(["a", "b"]).name("letters").into(),
        Int::new(10, 20).name("n").into(),
    ])
    .name("branch")]);
    let search = Search::builder(program).limit(30).seed(5).build().unwrap();
    for item in search {
        let (_, e) = item.unwrap();
        let bindings = e.bindings();
        match e.evaluate().unwrap() {
            Value::Int(-1) => {
                assert_eq!(bindings.get("branch").and_then(metalg::Choice::as_i64), Some(0));
            }
            Value::Str(s) => assert!(&*s == "a" || &*s == "b"),
            Value::Int(n) => assert!((10..=20).contains(&n)),
            other => panic!("unexpected value {other:?}"),
        }
    }
}

#[test]
fn test_search_from_sampler() {
    let x: Expr = Int::new(0, 9).name("x").into();
    let sampler = RandomSampler::with_seed(x, 3);
    let mut search = Search::from_sampler(&sampler).unwrap();
    assert_eq!(search.direction(), Direction::Minimize);
    assert_eq!(search.space().len(), 1);
    assert!(search.next().is_some());
}

#[test]
fn test_unsupported_variables_fail_at_build() {
    let hi: Expr = Int::new(1, 10).name("hi").into();
    let x: Expr = Int::new(0, &hi).name("x").into();
    assert!(matches!(
        Search::new(x),
        Err(Error::UnsupportedDimension { id, .. }) if id.as_str() == "x"
    ));
}

#[test]
fn test_bad_proposal_is_an_error_item() {
    // An optimizer built for a different space proposes vectors of the wrong length.
    let other: Expr = Float::new(0.0, 1.0).into();
    let other_space = SearchSpace::from_expr(&other).unwrap();
    let program = identity().call(args![
        Int::new(0, 3).name("a"),
        Int::new(0, 3).name("b"),
    ]);
    let mut search = Search::builder(program)
        .optimizer(RandomSearch::with_seed(&other_space, 1))
        .limit(2)
        .build()
        .unwrap();
    assert!(matches!(
        search.next(),
        Some(Err(Error::DimensionMismatch {
            expected: 2,
            got: 1
        }))
    ));
    let history = search.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_failure());
    assert!(search.best().is_none());
}

/// Always proposes the same vector and records what it is told.
struct Fixed {
    proposal: Vec<f64>,
    told: Arc<parking_lot::Mutex<Vec<(Vec<f64>, f64)>>>,
}

impl Optimizer for Fixed {
    fn ask(&mut self) -> metalg::Result<Vec<f64>> {
        Ok(self.proposal.clone())
    }

    fn tell(&mut self, x: &[f64], y: f64, _fit: bool) -> metalg::Result<()> {
        self.told.lock().push((x.to_vec(), y));
        Ok(())
    }
}

#[test]
fn test_unfreezable_proposal_is_told_as_failure() {
    let told = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let program = identity().call(args![Int::new(0, 3).name("a")]);
    let mut search = Search::builder(program)
        .optimizer(Fixed {
            proposal: vec![9.0],
            told: Arc::clone(&told),
        })
        .limit(2)
        .build()
        .unwrap();

    assert!(matches!(search.next(), Some(Err(Error::OutOfRange { .. }))));
    assert!(matches!(search.next(), Some(Err(Error::OutOfRange { .. }))));
    assert!(search.next().is_none());

    let told = told.lock();
    assert_eq!(told.len(), 2);
    assert!(told.iter().all(|(x, y)| x == &[9.0] && y.is_nan()));

    let history = search.history();
    assert_eq!(history.iter().map(|o| o.index).collect::<Vec<_>>(), [0, 1]);
    assert!(history.iter().all(|o| o.is_failure()));
    assert_eq!(history[0].bindings.get("a"), Some(&metalg::Choice::Int(9)));
}

#[test]
fn test_template_is_never_bound() {
    let x: Expr = Int::new(0, 9).name("x").into();
    let search = Search::builder(&x + 1).limit(5).seed(6).build().unwrap();
    for item in search {
        let (_, mut e) = item.unwrap();
        e.report(0.0).unwrap();
    }
    assert!(!x.as_var().unwrap().is_bound());
}
