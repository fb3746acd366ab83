//! Typed client for the parts of the Jira Cloud REST API the report needs.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::JiraError;
pub use models::{IssueRef, Worklog, WorklogPage};
pub use rate_limiter::RateLimiter;
