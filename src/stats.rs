use crate::models::{Stats, Topic, TopicData, TopicSummary};
use chrono::{Days, NaiveDate};

/// Length of the trailing window used for `total_this_week`, today included.
pub const WEEK_DAYS: u64 = 7;

pub fn build_stats_at(today: NaiveDate, data: &TopicData) -> Stats {
    let week_start = today
        .checked_sub_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);

    Stats {
        total_all_time: data.values().sum(),
        total_this_week: data.range(week_start..=today).map(|(_, value)| value).sum(),
        today_value: data.get(&today).copied().unwrap_or(0.0),
        current_streak: current_streak(today, data),
    }
}

pub fn current_streak(today: NaiveDate, data: &TopicData) -> u32 {
    let mut streak = 0;
    let mut date = today;
    while data.get(&date).is_some_and(|value| *value > 0.0) {
        streak += 1;
        match date.pred_opt() {
            Some(previous) => date = previous,
            None => break,
        }
    }
    streak
}

pub fn summarize(topics: &[Topic], today: NaiveDate) -> Vec<TopicSummary> {
    topics
        .iter()
        .map(|topic| TopicSummary {
            id: topic.id.clone(),
            name: topic.name.clone(),
            unit: topic.unit.clone(),
            stats: build_stats_at(today, &topic.data),
        })
        .collect()
}
