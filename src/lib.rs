pub mod analysis;
pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod game_mode;
pub mod llm;
pub mod metrics;
pub mod stats;
