use crate::models::{Topic, TopicData};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Starter topics for a fresh install: one with a year of history, two empty.
pub fn sample_topics(today: NaiveDate) -> Vec<Topic> {
    vec![
        topic("Coding", "hours", sample_history(today)),
        topic("Reading", "pages", TopicData::new()),
        topic("Exercise", "minutes", TopicData::new()),
    ]
}

fn topic(name: &str, unit: &str, data: TopicData) -> Topic {
    Topic {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        data,
    }
}

/// Busy weekdays, occasional weekends. Deterministic per date.
fn sample_history(today: NaiveDate) -> TopicData {
    let mut data = TopicData::new();
    for offset in 0..365 {
        let date = today - Duration::days(offset);
        let mut rng = StdRng::seed_from_u64(date.num_days_from_ce() as u64);
        let value: u32 = match date.weekday() {
            Weekday::Sat | Weekday::Sun if rng.random_bool(0.3) => rng.random_range(0..4),
            Weekday::Sat | Weekday::Sun => 0,
            _ => rng.random_range(0..9),
        };
        if value > 0 {
            data.insert(date, f64::from(value));
        }
    }
    data
}
