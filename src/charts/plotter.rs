//! Chart Plotter Module
//! Renders the report charts as PNG files with plotters.

use crate::data::{CumulativeCount, Race};
use crate::stats::PredictedCount;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const CHART_SIZE: (u32, u32) = (1200, 700);

/// Color palette for victim-race series, indexed by category position.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart rendering failed: {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Color for a race series, stable across charts.
pub fn race_color(race: Race) -> RGBColor {
    let idx = Race::ALL.iter().position(|r| *r == race).unwrap_or(0);
    PALETTE[idx % PALETTE.len()]
}

/// Renders the three report charts as static PNGs.
pub struct ChartPlotter;

impl ChartPlotter {
    /// The victim-race category with the largest cumulative total, used for
    /// the single-category chart.
    pub fn top_race(cumulative: &[CumulativeCount]) -> Option<Race> {
        let mut totals: BTreeMap<Race, u64> = BTreeMap::new();
        for c in cumulative {
            let entry = totals.entry(c.vic_race).or_insert(0);
            *entry = (*entry).max(c.cumulative);
        }
        totals
            .into_iter()
            .max_by_key(|(_, total)| *total)
            .map(|(race, _)| race)
    }

    /// Multi-series line chart of cumulative incidents vs. date, one series
    /// per victim-race category. With `filter` set, only that category is
    /// drawn. Gaps between observed dates are bridged by the line segment,
    /// never dropped to zero.
    pub fn cumulative_chart(
        path: &Path,
        cumulative: &[CumulativeCount],
        filter: Option<Race>,
        title: &str,
    ) -> Result<(), ChartError> {
        let rows: Vec<&CumulativeCount> = cumulative
            .iter()
            .filter(|c| filter.map_or(true, |race| c.vic_race == race))
            .collect();

        let (x_range, y_max) = Self::date_bounds(&rows);

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(x_range, 0u64..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Cumulative incidents")
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
            .draw()
            .map_err(render_err)?;

        let mut races: Vec<Race> = rows.iter().map(|c| c.vic_race).collect();
        races.dedup();

        for race in races {
            let points: Vec<(NaiveDate, u64)> = rows
                .iter()
                .filter(|c| c.vic_race == race)
                .map(|c| (c.date, c.cumulative))
                .collect();
            let color = race_color(race);
            let style = color.stroke_width(2);

            chart
                .draw_series(LineSeries::new(points, style))
                .map_err(render_err)?
                .label(race.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Scatter of actual daily counts over a categorical x axis (one slot
    /// per race label present) with the fitted per-category means overlaid
    /// as a line.
    pub fn regression_chart(
        path: &Path,
        predictions: &[PredictedCount],
    ) -> Result<(), ChartError> {
        let mut races: Vec<Race> = predictions.iter().map(|p| p.vic_race).collect();
        races.sort();
        races.dedup();

        let y_max = predictions
            .iter()
            .map(|p| f64::from(p.count))
            .fold(1.0f64, f64::max)
            * 1.1;
        let x_max = races.len().max(1) as f64 - 0.5;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Daily incident counts and fitted means by victim race",
                ("sans-serif", 28),
            )
            .margin(12)
            .x_label_area_size(64)
            .y_label_area_size(72)
            .build_cartesian_2d(-0.5f64..x_max, 0.0f64..y_max)
            .map_err(render_err)?;

        let labels: Vec<String> = races.iter().map(|r| r.label().to_string()).collect();
        chart
            .configure_mesh()
            .x_desc("Victim race")
            .y_desc("Daily incident count")
            .x_labels(races.len().max(1))
            .x_label_formatter(&move |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .draw()
            .map_err(render_err)?;

        let slot = |race: Race| races.iter().position(|r| *r == race).unwrap_or(0) as f64;

        chart
            .draw_series(predictions.iter().map(|p| {
                Circle::new(
                    (slot(p.vic_race), f64::from(p.count)),
                    3,
                    race_color(p.vic_race).mix(0.5).filled(),
                )
            }))
            .map_err(render_err)?
            .label("Observed daily count")
            .legend(|(x, y)| Circle::new((x + 9, y), 3, BLACK.filled()));

        // One fitted value per category; connecting them mirrors the
        // prediction overlay of the source report.
        let mut fit_points: Vec<(f64, f64)> = Vec::with_capacity(races.len());
        for race in &races {
            if let Some(p) = predictions.iter().find(|p| p.vic_race == *race) {
                fit_points.push((slot(*race), p.predicted));
            }
        }
        chart
            .draw_series(LineSeries::new(fit_points, BLUE.stroke_width(3)))
            .map_err(render_err)?
            .label("Fitted mean (OLS)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE.stroke_width(3)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Date range and y ceiling for the cumulative chart; defaults keep an
    /// empty dataset renderable.
    fn date_bounds(rows: &[&CumulativeCount]) -> (std::ops::Range<NaiveDate>, u64) {
        let fallback = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid fallback date");
        let min = rows.iter().map(|c| c.date).min().unwrap_or(fallback);
        let mut max = rows.iter().map(|c| c.date).max().unwrap_or(fallback);
        if max <= min {
            max = min + Duration::days(1);
        }
        let y_max = rows.iter().map(|c| c.cumulative).max().unwrap_or(0).max(1);
        (min..max, y_max + y_max / 10 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cumulative(day: u32, race: Race, cumulative: u64) -> CumulativeCount {
        CumulativeCount {
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            vic_race: race,
            count: 1,
            cumulative,
        }
    }

    #[test]
    fn top_race_is_highest_cumulative_total() {
        let rows = vec![
            cumulative(1, Race::Black, 2),
            cumulative(2, Race::Black, 5),
            cumulative(1, Race::White, 3),
        ];
        assert_eq!(ChartPlotter::top_race(&rows), Some(Race::Black));
    }

    #[test]
    fn top_race_of_empty_series_is_none() {
        assert_eq!(ChartPlotter::top_race(&[]), None);
    }

    #[test]
    fn colors_are_stable_per_race() {
        assert_eq!(race_color(Race::Black), race_color(Race::Black));
        assert_ne!(race_color(Race::Black), race_color(Race::White));
    }
}
