//! Data Cleaner Module
//! Turns the raw shooting-incident DataFrame into typed incident records.
//!
//! Columns the pipeline never reads (geocoordinates, occurrence time,
//! jurisdiction/location metadata) are simply not extracted. No rows are
//! dropped: demographic values outside their categorical domain map to the
//! explicit `Unknown` bucket so the cleaned row count always equals the raw
//! row count.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;
use thiserror::Error;

/// Date format used by the NYC Open Data export (e.g. "08/27/2019").
const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(&'static str),
    #[error("Row {row}: missing occurrence date")]
    MissingDate { row: usize },
    #[error("Row {row}: unparseable occurrence date '{value}'")]
    BadDate { row: usize, value: String },
}

/// City borough, with an overflow bucket for out-of-domain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Borough {
    Bronx,
    Brooklyn,
    Manhattan,
    Queens,
    StatenIsland,
    Unknown,
}

impl Borough {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "BRONX" => Borough::Bronx,
            "BROOKLYN" => Borough::Brooklyn,
            "MANHATTAN" => Borough::Manhattan,
            "QUEENS" => Borough::Queens,
            "STATEN ISLAND" => Borough::StatenIsland,
            _ => Borough::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Borough::Bronx => "BRONX",
            Borough::Brooklyn => "BROOKLYN",
            Borough::Manhattan => "MANHATTAN",
            Borough::Queens => "QUEENS",
            Borough::StatenIsland => "STATEN ISLAND",
            Borough::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sex of a perpetrator or victim, restricted to the closed set {M, F, U}.
///
/// Anything outside that set (null, empty, stray values) maps to `Unknown`;
/// rows are never rejected for an out-of-domain sex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "M" => Sex::Male,
            "F" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "U",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Race category as recorded in the dataset.
///
/// Variants are declared in alphabetical label order; that ordering drives
/// the aggregation sort and pins the regression reference level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Race {
    AmericanIndianAlaskanNative,
    AsianPacificIslander,
    Black,
    BlackHispanic,
    Unknown,
    White,
    WhiteHispanic,
}

impl Race {
    pub const ALL: [Race; 7] = [
        Race::AmericanIndianAlaskanNative,
        Race::AsianPacificIslander,
        Race::Black,
        Race::BlackHispanic,
        Race::Unknown,
        Race::White,
        Race::WhiteHispanic,
    ];

    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "AMERICAN INDIAN/ALASKAN NATIVE" => Race::AmericanIndianAlaskanNative,
            "ASIAN / PACIFIC ISLANDER" => Race::AsianPacificIslander,
            "BLACK" => Race::Black,
            "BLACK HISPANIC" => Race::BlackHispanic,
            "WHITE" => Race::White,
            "WHITE HISPANIC" => Race::WhiteHispanic,
            _ => Race::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Race::AmericanIndianAlaskanNative => "AMERICAN INDIAN/ALASKAN NATIVE",
            Race::AsianPacificIslander => "ASIAN / PACIFIC ISLANDER",
            Race::Black => "BLACK",
            Race::BlackHispanic => "BLACK HISPANIC",
            Race::Unknown => "UNKNOWN",
            Race::White => "WHITE",
            Race::WhiteHispanic => "WHITE HISPANIC",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cleaned shooting incident. Immutable once built.
#[derive(Debug, Clone)]
pub struct Incident {
    pub key: String,
    pub date: NaiveDate,
    pub borough: Borough,
    pub precinct: Option<i32>,
    pub perp_age_group: String,
    pub perp_sex: Sex,
    pub perp_race: Race,
    pub vic_age_group: String,
    pub vic_sex: Sex,
    pub vic_race: Race,
}

/// Handles cleaning of the raw dataset into [`Incident`] records.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean the raw DataFrame. Fails the whole run on a missing column or
    /// an unparseable occurrence date; never drops rows.
    pub fn clean(df: &DataFrame) -> Result<Vec<Incident>, CleanError> {
        let keys = Self::required(df, "INCIDENT_KEY")?;
        let dates = Self::required(df, "OCCUR_DATE")?;
        let boroughs = Self::required(df, "BORO")?;
        let precinct_i32 = Self::required(df, "PRECINCT")?.cast(&DataType::Int32)?;
        let precincts = precinct_i32.i32()?;
        let perp_ages = Self::required(df, "PERP_AGE_GROUP")?;
        let perp_sexes = Self::required(df, "PERP_SEX")?;
        let perp_races = Self::required(df, "PERP_RACE")?;
        let vic_ages = Self::required(df, "VIC_AGE_GROUP")?;
        let vic_sexes = Self::required(df, "VIC_SEX")?;
        let vic_races = Self::required(df, "VIC_RACE")?;

        let mut incidents = Vec::with_capacity(df.height());

        for i in 0..df.height() {
            let raw_date = Self::cell(dates, i);
            let raw_date = match raw_date {
                Some(s) if !s.is_empty() => s,
                _ => return Err(CleanError::MissingDate { row: i }),
            };
            let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
                .map_err(|_| CleanError::BadDate {
                    row: i,
                    value: raw_date.clone(),
                })?;

            incidents.push(Incident {
                key: Self::cell(keys, i).unwrap_or_default(),
                date,
                borough: Borough::from_raw(&Self::cell(boroughs, i).unwrap_or_default()),
                precinct: precincts.get(i),
                perp_age_group: Self::age_group(Self::cell(perp_ages, i)),
                perp_sex: Sex::from_raw(&Self::cell(perp_sexes, i).unwrap_or_default()),
                perp_race: Race::from_raw(&Self::cell(perp_races, i).unwrap_or_default()),
                vic_age_group: Self::age_group(Self::cell(vic_ages, i)),
                vic_sex: Sex::from_raw(&Self::cell(vic_sexes, i).unwrap_or_default()),
                vic_race: Race::from_raw(&Self::cell(vic_races, i).unwrap_or_default()),
            });
        }

        Ok(incidents)
    }

    fn required<'a>(df: &'a DataFrame, name: &'static str) -> Result<&'a Column, CleanError> {
        df.column(name).map_err(|_| CleanError::MissingColumn(name))
    }

    /// Read one cell as trimmed text; `None` for nulls.
    fn cell(col: &Column, i: usize) -> Option<String> {
        let val = col.get(i).ok()?;
        if val.is_null() {
            None
        } else {
            Some(val.to_string().trim_matches('"').trim().to_string())
        }
    }

    /// Age groups stay free-form strings; null, empty and the literal
    /// "(null)" placeholder all collapse to "UNKNOWN".
    fn age_group(raw: Option<String>) -> String {
        match raw {
            Some(s) if !s.is_empty() && s != "(null)" => s,
            _ => "UNKNOWN".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("INCIDENT_KEY".into(), ["1", "2", "3"]),
            Column::new("OCCUR_DATE".into(), ["01/01/2020", "01/02/2020", "01/01/2020"]),
            Column::new("OCCUR_TIME".into(), ["22:10:00", "01:05:00", "13:30:00"]),
            Column::new("BORO".into(), ["BROOKLYN", "QUEENS", "NOWHERE"]),
            Column::new("PRECINCT".into(), [73i32, 105, 40]),
            Column::new("PERP_AGE_GROUP".into(), ["18-24", "(null)", "25-44"]),
            Column::new("PERP_SEX".into(), ["M", "", "X"]),
            Column::new("PERP_RACE".into(), ["BLACK", "", "WHITE HISPANIC"]),
            Column::new("VIC_AGE_GROUP".into(), ["25-44", "18-24", "45-64"]),
            Column::new("VIC_SEX".into(), ["M", "F", "M"]),
            Column::new("VIC_RACE".into(), ["BLACK", "WHITE", "BLACK"]),
            Column::new("Latitude".into(), [40.6f64, 40.7, 40.8]),
        ])
        .unwrap()
    }

    #[test]
    fn cleans_all_rows_without_dropping() {
        let incidents = DataCleaner::clean(&raw_frame()).unwrap();
        assert_eq!(incidents.len(), 3);
        assert_eq!(
            incidents[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
        assert_eq!(incidents[0].borough, Borough::Brooklyn);
        assert_eq!(incidents[0].precinct, Some(73));
        assert_eq!(incidents[1].vic_race, Race::White);
    }

    #[test]
    fn out_of_domain_values_map_to_unknown() {
        let incidents = DataCleaner::clean(&raw_frame()).unwrap();
        // "NOWHERE" borough, "X"/"" sex, "" race, "(null)" age group
        assert_eq!(incidents[2].borough, Borough::Unknown);
        assert_eq!(incidents[2].perp_sex, Sex::Unknown);
        assert_eq!(incidents[1].perp_sex, Sex::Unknown);
        assert_eq!(incidents[1].perp_race, Race::Unknown);
        assert_eq!(incidents[1].perp_age_group, "UNKNOWN");
    }

    #[test]
    fn sex_stays_in_closed_domain() {
        let incidents = DataCleaner::clean(&raw_frame()).unwrap();
        for inc in &incidents {
            assert!(matches!(inc.perp_sex, Sex::Male | Sex::Female | Sex::Unknown));
            assert!(matches!(inc.vic_sex, Sex::Male | Sex::Female | Sex::Unknown));
        }
    }

    #[test]
    fn bad_date_is_fatal() {
        let df = DataFrame::new(vec![
            Column::new("INCIDENT_KEY".into(), ["1"]),
            Column::new("OCCUR_DATE".into(), ["2020-01-01"]),
            Column::new("BORO".into(), ["BRONX"]),
            Column::new("PRECINCT".into(), [40i32]),
            Column::new("PERP_AGE_GROUP".into(), ["18-24"]),
            Column::new("PERP_SEX".into(), ["M"]),
            Column::new("PERP_RACE".into(), ["BLACK"]),
            Column::new("VIC_AGE_GROUP".into(), ["18-24"]),
            Column::new("VIC_SEX".into(), ["M"]),
            Column::new("VIC_RACE".into(), ["BLACK"]),
        ])
        .unwrap();
        let err = DataCleaner::clean(&df).unwrap_err();
        assert!(matches!(err, CleanError::BadDate { row: 0, .. }));
    }

    #[test]
    fn missing_column_is_fatal() {
        let df = DataFrame::new(vec![Column::new("INCIDENT_KEY".into(), ["1"])]).unwrap();
        let err = DataCleaner::clean(&df).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn("OCCUR_DATE")));
    }

    #[test]
    fn empty_frame_cleans_to_empty() {
        let df = DataFrame::new(vec![
            Column::new("INCIDENT_KEY".into(), Vec::<String>::new()),
            Column::new("OCCUR_DATE".into(), Vec::<String>::new()),
            Column::new("BORO".into(), Vec::<String>::new()),
            Column::new("PRECINCT".into(), Vec::<i32>::new()),
            Column::new("PERP_AGE_GROUP".into(), Vec::<String>::new()),
            Column::new("PERP_SEX".into(), Vec::<String>::new()),
            Column::new("PERP_RACE".into(), Vec::<String>::new()),
            Column::new("VIC_AGE_GROUP".into(), Vec::<String>::new()),
            Column::new("VIC_SEX".into(), Vec::<String>::new()),
            Column::new("VIC_RACE".into(), Vec::<String>::new()),
        ])
        .unwrap();
        assert!(DataCleaner::clean(&df).unwrap().is_empty());
    }
}
