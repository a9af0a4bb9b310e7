//! Charts module - static chart rendering

mod plotter;

pub use plotter::{race_color, ChartError, ChartPlotter, PALETTE};
