//! Basic example: a program with one categorical decision.
//!
//! Wraps a host function, builds a call whose argument is a list variable and
//! draws a few random programs from it.
//!
//! Run with: `cargo run --example basic`

use metalg::prelude::*;

fn main() -> metalg::Result<()> {
    // `square` now builds call nodes instead of running.
    let square = metalg::function("square", |args| {
        let x = args.arg(0)?.as_i64()?;
        Ok(Value::Int(x * x))
    });

    let program = square.call(metalg::args![List::new([0, 1, 2, 3, 4]).name("x")]);
    println!("Program: {program}");
    println!("Variables: {:?}", program.choices());

    let sampler = RandomSampler::with_seed(program, 42);
    for _ in 0..5 {
        let (bindings, sampled) = sampler.sample_program()?;
        println!("{bindings}: {sampled} = {}", sampled.evaluate()?);
    }
    Ok(())
}
