use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse date → value map. Zero values are never stored.
pub type TopicData = BTreeMap<NaiveDate, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub data: TopicData,
}

impl Topic {
    pub fn value_on(&self, date: NaiveDate) -> f64 {
        self.data.get(&date).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTopic {
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub data: TopicData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicPatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub data: Option<TopicData>,
}

#[derive(Debug, Deserialize)]
pub struct EntryUpdate {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub value: f64,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub total_all_time: f64,
    pub total_this_week: f64,
    pub today_value: f64,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    /// Blank cells before the 1st, counted from Sunday.
    pub leading_blanks: u32,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearGrid {
    pub year: i32,
    pub months: Vec<MonthGrid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapResponse {
    pub topic_id: String,
    pub name: String,
    pub unit: String,
    pub today: NaiveDate,
    pub max_value: f64,
    pub stats: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<HeatmapCell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<YearGrid>>,
}

/// Sidebar row: a topic without its data map, plus its stats as of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub stats: Stats,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub topics: Vec<Topic>,
}

/// Returns `data` with `date` set to `value`, or removed when `value` is zero.
pub fn with_entry(data: &TopicData, date: NaiveDate, value: f64) -> TopicData {
    let mut next = data.clone();
    if value == 0.0 {
        next.remove(&date);
    } else {
        next.insert(date, value);
    }
    next
}
