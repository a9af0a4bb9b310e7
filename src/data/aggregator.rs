//! Aggregator Module
//! Groups cleaned incidents into daily counts per victim race and derives
//! the cumulative trend series.

use crate::data::cleaner::{Incident, Race};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Incident count for one (date, victim race) pair. Unique per key by
/// construction of the grouping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub vic_race: Race,
    pub count: u32,
}

/// A [`DailyCount`] extended with the running total for its race partition,
/// ordered by date ascending. Non-decreasing within a partition since daily
/// counts are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeCount {
    pub date: NaiveDate,
    pub vic_race: Race,
    pub count: u32,
    pub cumulative: u64,
}

/// Handles the group-by/cumulative-sum pipeline stage.
pub struct Aggregator;

impl Aggregator {
    /// Partition incidents by (victim race, date) and count each partition.
    ///
    /// Output is sorted by (race, date); a (race, date) pair with no
    /// incidents emits no record rather than a zero row.
    pub fn daily_counts(incidents: &[Incident]) -> Vec<DailyCount> {
        let mut counts: BTreeMap<(Race, NaiveDate), u32> = BTreeMap::new();
        for inc in incidents {
            *counts.entry((inc.vic_race, inc.date)).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((vic_race, date), count)| DailyCount {
                date,
                vic_race,
                count,
            })
            .collect()
    }

    /// Running sum per race partition in date order.
    ///
    /// Relies on [`daily_counts`](Self::daily_counts) output ordering:
    /// rows arrive grouped by race with dates ascending inside each group.
    pub fn cumulative_counts(daily: &[DailyCount]) -> Vec<CumulativeCount> {
        let mut result = Vec::with_capacity(daily.len());
        let mut current_race: Option<Race> = None;
        let mut running: u64 = 0;

        for dc in daily {
            if current_race != Some(dc.vic_race) {
                current_race = Some(dc.vic_race);
                running = 0;
            }
            running += u64::from(dc.count);
            result.push(CumulativeCount {
                date: dc.date,
                vic_race: dc.vic_race,
                count: dc.count,
                cumulative: running,
            });
        }

        result
    }

    /// Distinct victim-race categories present, in the fixed category order.
    pub fn races_present(daily: &[DailyCount]) -> Vec<Race> {
        let mut races: Vec<Race> = daily.iter().map(|dc| dc.vic_race).collect();
        races.dedup();
        races
    }
}
