pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod heatmap;
pub mod models;
pub mod sample;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod ui;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use heatmap::{project, Projection};
pub use state::AppState;
pub use store::{Backend, TopicStore};
