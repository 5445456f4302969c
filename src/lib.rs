pub mod app;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod render;
pub mod sessions;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod world;

pub use app::router;
pub use config::Config;
pub use state::AppState;
