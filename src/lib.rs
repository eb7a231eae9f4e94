pub mod args;
pub mod config;
pub mod diff;
pub mod engine;
pub mod errors;
pub mod github;
pub mod normalizer;
pub mod producers;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod security;
pub mod server;
pub mod structural;
pub mod types;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use engine::ReviewEngine;
pub use errors::AppError;
pub use types::{Category, Issue, ReviewOutcome, RiskLevel};
