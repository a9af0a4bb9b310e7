//! Regression Module
//! Ordinary least squares of daily incident count on victim-race category.
//!
//! With a single categorical predictor the closed-form OLS solution is the
//! per-category sample mean: the intercept is the reference category's mean
//! and each dummy coefficient is that category's mean minus the reference
//! mean. The model is fit that way directly instead of materializing a
//! design matrix; the coefficient table (std error, t, p) follows the usual
//! pooled-residual-variance formulas.

use crate::data::{DailyCount, Race};
use chrono::NaiveDate;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// One fitted model term.
#[derive(Debug, Clone)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// A daily count row augmented with its model prediction.
///
/// Predictions are real-valued and unclamped: an unconstrained linear model
/// may produce non-integer (and in general negative) values even though the
/// observed counts are non-negative integers.
#[derive(Debug, Clone, Copy)]
pub struct PredictedCount {
    pub date: NaiveDate,
    pub vic_race: Race,
    pub count: u32,
    pub predicted: f64,
}

/// OLS fit of daily incident counts on victim race.
#[derive(Debug, Clone)]
pub struct RaceModel {
    /// Reference (baseline) level: the first race present in the fixed
    /// category ordering. `None` only for an empty fit.
    pub reference: Option<Race>,
    /// Fitted mean daily count per category present in the input.
    pub category_means: Vec<(Race, f64)>,
    /// Intercept followed by one dummy coefficient per non-reference level.
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub residual_std_error: f64,
    pub df_residual: usize,
    pub n_observations: usize,
}

impl RaceModel {
    /// Fit the model. An empty input yields an empty model rather than an
    /// error; degenerate inputs (zero residual degrees of freedom) yield
    /// NaN diagnostics.
    pub fn fit(daily: &[DailyCount]) -> RaceModel {
        let mut by_race: BTreeMap<Race, Vec<f64>> = BTreeMap::new();
        for dc in daily {
            by_race.entry(dc.vic_race).or_default().push(f64::from(dc.count));
        }

        if by_race.is_empty() {
            return RaceModel {
                reference: None,
                category_means: Vec::new(),
                coefficients: Vec::new(),
                r_squared: f64::NAN,
                residual_std_error: f64::NAN,
                df_residual: 0,
                n_observations: 0,
            };
        }

        let n = daily.len();
        let k = by_race.len();
        let df_residual = n.saturating_sub(k);

        let category_means: Vec<(Race, f64)> = by_race
            .iter()
            .map(|(race, values)| (*race, values.iter().sum::<f64>() / values.len() as f64))
            .collect();

        let grand_mean = daily.iter().map(|dc| f64::from(dc.count)).sum::<f64>() / n as f64;
        let mut rss = 0.0;
        let mut tss = 0.0;
        for (idx, (_, values)) in by_race.iter().enumerate() {
            let mean = category_means[idx].1;
            for v in values {
                rss += (v - mean).powi(2);
                tss += (v - grand_mean).powi(2);
            }
        }

        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
        let residual_variance = if df_residual > 0 {
            rss / df_residual as f64
        } else {
            f64::NAN
        };
        let residual_std_error = residual_variance.sqrt();

        let reference = *by_race.keys().next().unwrap_or(&Race::Unknown);
        let n_ref = by_race[&reference].len() as f64;
        let mean_ref = category_means[0].1;

        let mut coefficients = Vec::with_capacity(k);
        coefficients.push(Self::coefficient(
            "(Intercept)".to_string(),
            mean_ref,
            residual_std_error * (1.0 / n_ref).sqrt(),
            df_residual,
        ));
        for (idx, (race, values)) in by_race.iter().enumerate().skip(1) {
            let n_cat = values.len() as f64;
            coefficients.push(Self::coefficient(
                race.label().to_string(),
                category_means[idx].1 - mean_ref,
                residual_std_error * (1.0 / n_ref + 1.0 / n_cat).sqrt(),
                df_residual,
            ));
        }

        RaceModel {
            reference: Some(reference),
            category_means,
            coefficients,
            r_squared,
            residual_std_error,
            df_residual,
            n_observations: n,
        }
    }

    fn coefficient(term: String, estimate: f64, std_error: f64, df: usize) -> Coefficient {
        let t_value = estimate / std_error;
        // Two-tailed p-value from the t distribution; NaN when the residual
        // degrees of freedom cannot support it.
        let p_value = match StudentsT::new(0.0, 1.0, df as f64) {
            Ok(dist) if t_value.is_finite() => 2.0 * (1.0 - dist.cdf(t_value.abs())),
            _ => f64::NAN,
        };
        Coefficient {
            term,
            estimate,
            std_error,
            t_value,
            p_value,
        }
    }

    /// Fitted mean for a category, if it was present in the training data.
    pub fn fitted_mean(&self, race: Race) -> Option<f64> {
        self.category_means
            .iter()
            .find(|(r, _)| *r == race)
            .map(|(_, m)| *m)
    }

    /// Augment daily rows with their predictions (the fitted category mean).
    pub fn predict(&self, daily: &[DailyCount]) -> Vec<PredictedCount> {
        daily
            .iter()
            .map(|dc| PredictedCount {
                date: dc.date,
                vic_race: dc.vic_race,
                count: dc.count,
                predicted: self.fitted_mean(dc.vic_race).unwrap_or(f64::NAN),
            })
            .collect()
    }
}
