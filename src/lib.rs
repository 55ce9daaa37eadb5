pub mod analytics_fetch;
pub mod config;
pub mod fake_feed;
pub mod heatmap;
pub mod provider;
pub mod state;
