//! Calendar heatmap projection.
//!
//! Everything here is a pure function of a topic's data map and an explicit
//! `today`; nothing reads the clock or mutates the input.

use crate::models::{HeatmapCell, MonthGrid, Stats, TopicData, YearGrid};
use crate::stats::build_stats_at;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeSet;

pub const MAX_LEVEL: u8 = 5;
pub const WEEKS_IN_STRIP: usize = 53;
pub const STRIP_CELLS: usize = WEEKS_IN_STRIP * 7;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Strip,
    Months,
}

/// Per-topic intensity scale, relative to the topic's own peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    max_value: f64,
}

impl Scale {
    pub fn from_data(data: &TopicData) -> Self {
        let peak = data.values().copied().fold(0.0_f64, f64::max);
        Self {
            max_value: if peak > 0.0 { peak } else { 1.0 },
        }
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn level(&self, value: f64) -> u8 {
        level(value, self.max_value)
    }

    fn cell(&self, data: &TopicData, date: NaiveDate) -> HeatmapCell {
        let value = data.get(&date).copied().unwrap_or(0.0);
        HeatmapCell {
            date,
            value,
            level: self.level(value),
        }
    }
}

/// Buckets `value / max_value` into five equal-width bands; zero maps to level 0.
pub fn level(value: f64, max_value: f64) -> u8 {
    if value <= 0.0 || max_value <= 0.0 {
        return 0;
    }
    let ratio = value / max_value;
    if ratio <= 0.2 {
        1
    } else if ratio <= 0.4 {
        2
    } else if ratio <= 0.6 {
        3
    } else if ratio <= 0.8 {
        4
    } else {
        MAX_LEVEL
    }
}

/// First day of the year strip: 364 days before `today`, moved back to a Sunday.
pub fn strip_start(today: NaiveDate) -> NaiveDate {
    let start = today - Duration::days(364);
    start - Duration::days(i64::from(start.weekday().num_days_from_sunday()))
}

/// 53 Sunday-first week columns covering the past year, ending with the week holding `today`.
pub fn year_strip(data: &TopicData, today: NaiveDate, scale: &Scale) -> Vec<HeatmapCell> {
    strip_start(today)
        .iter_days()
        .take(STRIP_CELLS)
        .map(|date| scale.cell(data, date))
        .collect()
}

/// One grid per year that has a positive entry, plus the year of `today`.
pub fn month_grids(data: &TopicData, today: NaiveDate, scale: &Scale) -> Vec<YearGrid> {
    let mut years: BTreeSet<i32> = data
        .iter()
        .filter(|(_, value)| **value > 0.0)
        .map(|(date, _)| date.year())
        .collect();
    years.insert(today.year());

    years
        .into_iter()
        .map(|year| YearGrid {
            year,
            months: (1..=12)
                .filter_map(|month| month_grid(data, year, month, scale))
                .collect(),
        })
        .collect()
}

fn month_grid(data: &TopicData, year: i32, month: u32, scale: &Scale) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let cells = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| scale.cell(data, date))
        .collect();

    Some(MonthGrid {
        year,
        month,
        label: MONTH_LABELS[month as usize - 1],
        leading_blanks: first.weekday().num_days_from_sunday(),
        cells,
    })
}

/// Layout-independent result of projecting one topic at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub today: NaiveDate,
    pub scale: Scale,
    pub stats: Stats,
    pub cells: Vec<HeatmapCell>,
}

impl Projection {
    pub fn cell_at(&self, date: NaiveDate) -> Option<&HeatmapCell> {
        let first = self.cells.first()?.date;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        self.cells.get(offset)
    }
}

pub fn project(data: &TopicData, today: NaiveDate) -> Projection {
    let scale = Scale::from_data(data);
    Projection {
        today,
        scale,
        stats: build_stats_at(today, data),
        cells: year_strip(data, today, &scale),
    }
}
