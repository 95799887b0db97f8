//! Generated ids come from a process-wide counter, so this file holds a single
//! test and runs in its own binary.

use metalg::{Expr, Float, Int, List, reset_var_ids};

fn id_of(e: &Expr) -> String {
    e.as_var().unwrap().id().to_string()
}

#[test]
fn test_generated_ids_count_from_zero() {
    reset_var_ids();
    let a: Expr = Int::new(0, 1).into();
    let b: Expr = Float::new(0.0, 1.0).into();
    let named: Expr = List::new([1, 2]).name("named").into();
    let c: Expr = List::new([1, 2]).into();
    assert_eq!(id_of(&a), "0");
    assert_eq!(id_of(&b), "1");
    assert_eq!(id_of(&named), "named");
    // Naming after construction still consumes a counter value.
    assert_eq!(id_of(&c), "3");

    // Clones keep ids.
    assert_eq!(id_of(&a.clone_deep()), "0");

    reset_var_ids();
    let d: Expr = Int::new(0, 1).into();
    assert_eq!(id_of(&d), "0");
}
