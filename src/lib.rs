pub mod app;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod overlay;
pub mod playback;
pub mod state;
pub mod stats;
pub mod sync;
pub mod timeline;
pub mod ui;

#[cfg(test)]
mod testing;

pub use app::router;
pub use config::ViewerConfig;
pub use state::AppState;
pub use sync::TimelineSync;
