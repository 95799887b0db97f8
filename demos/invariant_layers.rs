//! Variable-depth layer stacks with an invariant list.
//!
//! `num_layers` picks how many layers are active; the invariant list always
//! keeps the first `num_layers` entries, and each entry chooses its own kind.
//! Layers past the active prefix are never drawn.
//!
//! Run with: `cargo run --example invariant_layers`

use metalg::prelude::*;

fn main() -> metalg::Result<()> {
    let max_layers: i64 = 5;
    let num_layers: Expr = Int::new(1, max_layers).name("num_layers").into();
    let layers = List::new((0..max_layers).map(|i| {
        Expr::from(List::new([format!("dense_{i}"), format!("conv_{i}")]).name(format!("layer_{i}")))
    }))
    .k(&num_layers)
    .invariant()
    .name("layers");
    let stack = Term::from(vec!["input_layer"]) + layers + vec!["output_layer"];
    println!("{stack}");

    let ids: Vec<String> = stack
        .variables()
        .iter()
        .filter_map(|v| v.as_var().map(|v| v.id().to_string()))
        .collect();
    println!("variables: {ids:?}");

    let sampler = RandomSampler::with_seed(stack, 42);
    for _ in 0..3 {
        let (bindings, program) = sampler.sample_program()?;
        println!("{bindings}");
        println!("  -> {}", program.evaluate()?);
    }

    // The same template drives an optimizer: the list itself has no
    // dimension, its length comes from `num_layers`.
    let space = SearchSpace::from_expr(sampler.expression())?;
    println!("search space:\n{space}");
    Ok(())
}
