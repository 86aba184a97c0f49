//! # Collectors Module
//!
//! The data collection side of the collector binary.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: one external source queried once per cycle
//! - **`XFollowersCollector`**: follower count of an X account
//! - **`TelegramMembersCollector`**: member count of a Telegram chat
//! - **`TokenHoldersCollector`**: holder count of a token contract
//! - **`GithubCollector`**: stars, forks or the latest release of a repository
//! - **`Orchestrator`**: runs the collectors of one cycle, checks milestones and persists the values
//!
//! Collectors run one after another. A failing collector only loses its own value.

pub mod collector;
pub mod github;
pub mod http;
pub mod orchestrator;
pub mod telegram;
pub mod token_holders;
pub mod x_followers;

// Re-export the main types for easy access
pub use collector::Collector;
pub use github::{
    GithubApi,
    GithubCollector,
    GithubMetric,
};
pub use orchestrator::Orchestrator;
pub use telegram::TelegramMembersCollector;
pub use token_holders::TokenHoldersCollector;
pub use x_followers::XFollowersCollector;
