use crate::store::TopicStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TopicStore>>,
}

impl AppState {
    pub fn new(store: TopicStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}
