//! Shooting Trends - NYPD shooting incident trend analysis
//!
//! Loads the public NYPD shooting-incident dataset, cleans it into typed
//! records, aggregates incident counts by victim race over time, fits an
//! OLS model of daily counts on victim race, and renders an HTML report
//! with charts, a coefficient table and a bias/limitations discussion.
//!
//! The pipeline is a straight line, one immutable table per stage:
//! fetch -> load -> clean -> aggregate -> model -> report.

pub mod charts;
pub mod data;
pub mod report;
pub mod stats;
