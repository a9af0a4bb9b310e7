//! Report module - summary table, HTML report assembly and JSON sidecar.
//!
//! Pure presentation: the only computation here is the three summary
//! counts. The HTML document is assembled section by section from the
//! tables produced upstream.

use crate::data::{Incident, Race};
use crate::stats::RaceModel;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Three-row dataset summary: total incidents and the distinct category
/// counts the source report tabulates.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total_incidents: usize,
    pub victim_race_categories: usize,
    pub precinct_categories: usize,
}

impl DatasetSummary {
    /// Count over the cleaned table. `total_incidents` equals the cleaned
    /// row count exactly; cleaning never drops rows.
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        let races: BTreeSet<Race> = incidents.iter().map(|i| i.vic_race).collect();
        // A missing precinct is its own category, like the other unknowns.
        let precincts: BTreeSet<Option<i32>> = incidents.iter().map(|i| i.precinct).collect();
        DatasetSummary {
            total_incidents: incidents.len(),
            victim_race_categories: races.len(),
            precinct_categories: precincts.len(),
        }
    }
}

/// Session metadata rendered at the foot of the report.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub generated_at: DateTime<Local>,
    pub tool: &'static str,
    pub version: &'static str,
    pub dataset_source: String,
}

impl SessionInfo {
    pub fn now(dataset_source: String) -> Self {
        SessionInfo {
            generated_at: Local::now(),
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            dataset_source,
        }
    }
}

/// Relative file names of the rendered charts inside the output directory.
#[derive(Debug, Clone)]
pub struct ReportCharts {
    pub cumulative: String,
    pub filtered: String,
    pub filtered_race: Option<Race>,
    pub regression: String,
}

#[derive(Serialize)]
struct CoefficientJson {
    term: String,
    estimate: f64,
    std_error: f64,
    t_value: f64,
    p_value: f64,
}

#[derive(Serialize)]
struct ModelJson {
    reference_level: Option<String>,
    n_observations: usize,
    df_residual: usize,
    r_squared: f64,
    residual_std_error: f64,
    coefficients: Vec<CoefficientJson>,
}

#[derive(Serialize)]
struct SidecarJson<'a> {
    generated_at: String,
    dataset_source: &'a str,
    summary: &'a DatasetSummary,
    model: ModelJson,
}

/// Assembles the HTML report and the machine-readable summary sidecar.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Write `report.html` into `out_dir` and return its path.
    pub fn write_html(
        out_dir: &Path,
        session: &SessionInfo,
        summary: &DatasetSummary,
        model: &RaceModel,
        charts: &ReportCharts,
    ) -> Result<PathBuf, ReportError> {
        let mut html = String::with_capacity(16 * 1024);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<title>NYPD Shooting Incident Trends</title>\n");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");
        html.push_str("<h1>NYPD Shooting Incident Trends by Victim Race</h1>\n");

        html.push_str(&Self::summary_section(summary));
        html.push_str(&Self::charts_section(charts));
        html.push_str(&Self::model_section(model));
        html.push_str(NARRATIVE);
        html.push_str(&Self::session_section(session, summary));

        html.push_str("</body>\n</html>\n");

        let path = out_dir.join("report.html");
        fs::write(&path, html)?;
        Ok(path)
    }

    /// Write the `summary.json` sidecar next to the report.
    pub fn write_summary_json(
        out_dir: &Path,
        session: &SessionInfo,
        summary: &DatasetSummary,
        model: &RaceModel,
    ) -> Result<PathBuf, ReportError> {
        let sidecar = SidecarJson {
            generated_at: session.generated_at.to_rfc3339(),
            dataset_source: &session.dataset_source,
            summary,
            model: ModelJson {
                reference_level: model.reference.map(|r| r.label().to_string()),
                n_observations: model.n_observations,
                df_residual: model.df_residual,
                r_squared: model.r_squared,
                residual_std_error: model.residual_std_error,
                coefficients: model
                    .coefficients
                    .iter()
                    .map(|c| CoefficientJson {
                        term: c.term.clone(),
                        estimate: c.estimate,
                        std_error: c.std_error,
                        t_value: c.t_value,
                        p_value: c.p_value,
                    })
                    .collect(),
            },
        };

        let path = out_dir.join("summary.json");
        fs::write(&path, serde_json::to_string_pretty(&sidecar)?)?;
        Ok(path)
    }

    fn summary_section(summary: &DatasetSummary) -> String {
        format!(
            "<h2>Dataset summary</h2>\n<table>\n\
             <tr><th>Measure</th><th>Value</th></tr>\n\
             <tr><td>Total incidents</td><td>{}</td></tr>\n\
             <tr><td>Victim race categories</td><td>{}</td></tr>\n\
             <tr><td>Precinct categories</td><td>{}</td></tr>\n\
             </table>\n",
            summary.total_incidents, summary.victim_race_categories, summary.precinct_categories
        )
    }

    fn charts_section(charts: &ReportCharts) -> String {
        let mut s = String::new();
        s.push_str("<h2>Cumulative incidents by victim race</h2>\n");
        s.push_str(&Self::figure(&charts.cumulative, "Cumulative incident trend"));

        let filtered_title = match charts.filtered_race {
            Some(race) => format!(
                "Cumulative incidents, {} victims only",
                Self::escape(race.label())
            ),
            None => "Cumulative incidents, single category".to_string(),
        };
        s.push_str(&format!("<h2>{}</h2>\n", filtered_title));
        s.push_str(&Self::figure(&charts.filtered, "Single-category trend"));

        s.push_str("<h2>Daily counts vs. fitted model</h2>\n");
        s.push_str(&Self::figure(&charts.regression, "Regression overlay"));
        s
    }

    fn figure(file: &str, alt: &str) -> String {
        format!(
            "<figure><img src=\"{}\" alt=\"{}\"></figure>\n",
            Self::escape(file),
            Self::escape(alt)
        )
    }

    fn model_section(model: &RaceModel) -> String {
        let mut s = String::new();
        s.push_str("<h2>Linear model: daily count ~ victim race</h2>\n");

        if model.coefficients.is_empty() {
            s.push_str("<p>No observations; no model was fit.</p>\n");
            return s;
        }

        if let Some(reference) = model.reference {
            s.push_str(&format!(
                "<p>Reference level: <strong>{}</strong>. \
                 Predictions are real-valued and unclamped; an unconstrained \
                 linear model may predict non-integer values.</p>\n",
                Self::escape(reference.label())
            ));
        }

        s.push_str(
            "<table>\n<tr><th>Term</th><th>Estimate</th><th>Std. error</th>\
             <th>t value</th><th>p value</th></tr>\n",
        );
        for coef in &model.coefficients {
            s.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                Self::escape(&coef.term),
                Self::num(coef.estimate, 4),
                Self::num(coef.std_error, 4),
                Self::num(coef.t_value, 3),
                Self::num(coef.p_value, 4),
            ));
        }
        s.push_str("</table>\n");

        s.push_str(&format!(
            "<p>n = {}, residual df = {}, R&sup2; = {}, residual std. error = {}</p>\n",
            model.n_observations,
            model.df_residual,
            Self::num(model.r_squared, 4),
            Self::num(model.residual_std_error, 4),
        ));
        s
    }

    fn session_section(session: &SessionInfo, summary: &DatasetSummary) -> String {
        format!(
            "<h2>Session</h2>\n<table>\n\
             <tr><td>Generated</td><td>{}</td></tr>\n\
             <tr><td>Tool</td><td>{} {}</td></tr>\n\
             <tr><td>Dataset</td><td>{}</td></tr>\n\
             <tr><td>Rows analyzed</td><td>{}</td></tr>\n\
             </table>\n",
            session.generated_at.format("%Y-%m-%d %H:%M:%S %Z"),
            Self::escape(session.tool),
            Self::escape(session.version),
            Self::escape(&session.dataset_source),
            summary.total_incidents,
        )
    }

    /// Format a statistic for display; NaN renders as "NA".
    fn num(v: f64, decimals: usize) -> String {
        if v.is_nan() {
            "NA".to_string()
        } else {
            format!("{:.*}", decimals, v)
        }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

const STYLE: &str = "<style>\n\
    body { font-family: Georgia, serif; max-width: 60rem; margin: 2rem auto; \
    padding: 0 1rem; color: #222; }\n\
    table { border-collapse: collapse; margin: 1rem 0; }\n\
    th, td { border: 1px solid #999; padding: 0.35rem 0.8rem; text-align: left; }\n\
    th { background: #eee; }\n\
    figure { margin: 1rem 0; }\n\
    img { max-width: 100%; border: 1px solid #ccc; }\n\
    </style>\n";

const NARRATIVE: &str = "<h2>Bias and limitations</h2>\n\
    <p>This report counts recorded shooting incidents; it says nothing about \
    incidents that were never reported or never recorded. Reporting and \
    enforcement intensity differ across precincts and over time, so raw \
    counts partially reflect policing practice as well as underlying \
    violence.</p>\n\
    <p>Demographic fields are frequently missing, especially for \
    perpetrators. Missing values are carried through as an explicit UNKNOWN \
    category rather than dropped, which keeps totals honest but means the \
    per-race series undercount whenever race went unrecorded. Counts are \
    also not normalized by population; comparing absolute counts across \
    groups without denominators invites misreading.</p>\n\
    <p>The linear model treats victim race as the only predictor, so its \
    fitted values are merely per-category average daily counts. It is a \
    descriptive summary, not a causal model, and its predictions are \
    unconstrained real numbers. Readers &mdash; and the author &mdash; bring \
    their own priors to data like this; keeping the pipeline fixed, \
    re-runnable and fully scripted is the main mitigation applied here.</p>\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Borough, DailyCount, Sex};
    use crate::stats::RaceModel;
    use chrono::NaiveDate;

    fn incident(race: Race, precinct: Option<i32>) -> Incident {
        Incident {
            key: String::new(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            borough: Borough::Bronx,
            precinct,
            perp_age_group: "UNKNOWN".to_string(),
            perp_sex: Sex::Unknown,
            perp_race: Race::Unknown,
            vic_age_group: "25-44".to_string(),
            vic_sex: Sex::Male,
            vic_race: race,
        }
    }

    #[test]
    fn summary_counts_match_cleaned_table() {
        let incidents = vec![
            incident(Race::Black, Some(73)),
            incident(Race::Black, Some(73)),
            incident(Race::White, Some(40)),
            incident(Race::Black, None),
        ];
        let summary = DatasetSummary::from_incidents(&incidents);
        assert_eq!(summary.total_incidents, 4);
        assert_eq!(summary.victim_race_categories, 2);
        assert_eq!(summary.precinct_categories, 3); // 73, 40 and missing
    }

    #[test]
    fn empty_table_summarizes_to_zero() {
        let summary = DatasetSummary::from_incidents(&[]);
        assert_eq!(summary.total_incidents, 0);
        assert_eq!(summary.victim_race_categories, 0);
        assert_eq!(summary.precinct_categories, 0);
    }

    #[test]
    fn html_report_contains_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let incidents = vec![incident(Race::Black, Some(73))];
        let summary = DatasetSummary::from_incidents(&incidents);
        let daily = vec![
            DailyCount {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                vic_race: Race::Black,
                count: 1,
            },
            DailyCount {
                date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                vic_race: Race::Black,
                count: 3,
            },
        ];
        let model = RaceModel::fit(&daily);
        let session = SessionInfo::now("test://dataset".to_string());
        let charts = ReportCharts {
            cumulative: "cumulative.png".to_string(),
            filtered: "cumulative_top.png".to_string(),
            filtered_race: Some(Race::Black),
            regression: "regression.png".to_string(),
        };

        let path =
            ReportGenerator::write_html(dir.path(), &session, &summary, &model, &charts).unwrap();
        let html = std::fs::read_to_string(path).unwrap();

        assert!(html.contains("Dataset summary"));
        assert!(html.contains("Total incidents"));
        assert!(html.contains("cumulative.png"));
        assert!(html.contains("regression.png"));
        assert!(html.contains("(Intercept)"));
        assert!(html.contains("Bias and limitations"));
        assert!(html.contains("Session"));
    }

    #[test]
    fn json_sidecar_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let incidents = vec![incident(Race::Black, Some(73))];
        let summary = DatasetSummary::from_incidents(&incidents);
        let model = RaceModel::fit(&[]);
        let session = SessionInfo::now("test://dataset".to_string());

        let path =
            ReportGenerator::write_summary_json(dir.path(), &session, &summary, &model).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(parsed["summary"]["total_incidents"], 1);
        assert!(parsed["model"]["reference_level"].is_null());
        // NaN diagnostics serialize as null, never break the sidecar.
        assert!(parsed["model"]["r_squared"].is_null());
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            ReportGenerator::escape("a<b & \"c\""),
            "a&lt;b &amp; &quot;c&quot;"
        );
    }
}
