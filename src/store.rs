//! Topic store: owns the persisted topics and hands out copies.
//!
//! Each mutation builds the next topic list, flushes it to the backend and only
//! then swaps it in, so a failed write leaves both memory and disk as they were.
//! Updates replace whole data maps; with several writers the last one wins.

use crate::errors::StoreError;
use crate::models::{with_entry, NewTopic, Topic, TopicPatch};
use crate::storage::{load_topics, persist_topics};
use crate::validation::{entry_value, import_payload, normalize_data, required_text};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File(PathBuf),
}

#[derive(Debug)]
pub struct TopicStore {
    backend: Backend,
    topics: Vec<Topic>,
}

impl TopicStore {
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            topics: Vec::new(),
        }
    }

    pub async fn open(backend: Backend) -> Result<Self, StoreError> {
        let topics = match &backend {
            Backend::Memory => Vec::new(),
            Backend::File(path) => load_topics(path).await?,
        };
        info!(count = topics.len(), ?backend, "topic store opened");
        Ok(Self { backend, topics })
    }

    pub fn list(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, id: &str) -> Result<&Topic, StoreError> {
        self.topics
            .iter()
            .find(|topic| topic.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub async fn create(&mut self, new: NewTopic) -> Result<Topic, StoreError> {
        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            name: required_text("name", &new.name)?,
            unit: required_text("unit", &new.unit)?,
            data: normalize_data(new.data)?,
        };

        let mut next = self.topics.clone();
        next.push(topic.clone());
        self.commit(next).await?;
        info!(id = %topic.id, name = %topic.name, "topic created");
        Ok(topic)
    }

    pub async fn update(&mut self, id: &str, patch: TopicPatch) -> Result<Topic, StoreError> {
        let index = self.position(id)?;
        let mut topic = self.topics[index].clone();
        if let Some(name) = patch.name {
            topic.name = required_text("name", &name)?;
        }
        if let Some(unit) = patch.unit {
            topic.unit = required_text("unit", &unit)?;
        }
        if let Some(data) = patch.data {
            topic.data = normalize_data(data)?;
        }
        self.replace(index, topic).await
    }

    /// Sets one date's value; zero removes the entry.
    pub async fn set_entry(
        &mut self,
        id: &str,
        date: NaiveDate,
        value: f64,
    ) -> Result<Topic, StoreError> {
        let index = self.position(id)?;
        let value = entry_value(value)?;
        let mut topic = self.topics[index].clone();
        topic.data = with_entry(&topic.data, date, value);
        self.replace(index, topic).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self.position(id)?;
        let mut next = self.topics.clone();
        next.remove(index);
        self.commit(next).await?;
        info!(%id, "topic deleted");
        Ok(())
    }

    pub fn export_all(&self) -> Vec<Topic> {
        self.topics.clone()
    }

    /// Replaces the whole store with a validated payload.
    pub async fn import_all(&mut self, payload: &Value) -> Result<Vec<Topic>, StoreError> {
        let topics = import_payload(payload)?;
        self.commit(topics.clone()).await?;
        info!(count = topics.len(), "topics imported");
        Ok(topics)
    }

    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new()).await?;
        info!("topic store cleared");
        Ok(())
    }

    /// Installs `topics` only when the store holds nothing yet.
    pub async fn seed_if_empty(&mut self, topics: Vec<Topic>) -> Result<bool, StoreError> {
        if !self.topics.is_empty() {
            return Ok(false);
        }
        self.commit(topics).await?;
        Ok(true)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.topics
            .iter()
            .position(|topic| topic.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn replace(&mut self, index: usize, topic: Topic) -> Result<Topic, StoreError> {
        let mut next = self.topics.clone();
        next[index] = topic.clone();
        self.commit(next).await?;
        Ok(topic)
    }

    async fn commit(&mut self, next: Vec<Topic>) -> Result<(), StoreError> {
        if let Backend::File(path) = &self.backend {
            persist_topics(path, &next).await?;
        }
        self.topics = next;
        Ok(())
    }
}
