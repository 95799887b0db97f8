//! Bayesian optimization over a small mixed search space, with logging.
//!
//! Minimizes a synthetic "validation loss" over a learning rate, a depth and
//! an activation. Structured events from the search loop are printed through
//! `tracing-subscriber`; set `RUST_LOG=metalg=debug` for per-iteration detail.
//!
//! Run with: `cargo run --example optimization --features tracing`

use metalg::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> metalg::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let train = metalg::function("train", |args| {
        let lr = args.param(0, "lr")?.as_f64()?;
        let depth = args.param(1, "depth")?.as_i64()?;
        let penalty = match args.param(2, "activation")?.as_str() {
            Some("relu") => 0.0,
            Some("tanh") => 0.1,
            _ => 0.3,
        };
        let loss = (lr.log10() + 2.5).powi(2) + 0.05 * (depth - 6).abs() as f64 + penalty;
        Ok(Value::Float(loss))
    });

    let program = train.call(metalg::args![
        Float::new(1e-5, 1e-1).log_scale().name("lr"),
        Int::new(1, 12).name("depth"),
        List::new(["relu", "tanh", "sigmoid"]).name("activation"),
    ]);

    let mut search = Search::builder(program).limit(40).seed(7).build()?;
    for item in search.by_ref() {
        let (index, mut evaluation) = item?;
        match evaluation.evaluate() {
            Ok(loss) => evaluation.report(loss.as_f64()?)?,
            Err(err) => {
                tracing::warn!(index, %err, "evaluation failed");
                evaluation.report_failure()?
            }
        };
    }

    if let Some(best) = search.best() {
        println!("best #{}: {} -> {:.4}", best.index, best.bindings, best.value);
    }
    Ok(())
}
