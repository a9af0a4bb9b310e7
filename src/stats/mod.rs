//! Stats module - regression modeling

mod regression;

pub use regression::{Coefficient, PredictedCount, RaceModel};
