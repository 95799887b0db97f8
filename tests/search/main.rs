#![allow(clippy::cast_precision_loss)]

mod evaluation;
mod iteration;
mod optimizers;
