//! Compare two refs of a GitHub repository: commits, changed files, line
//! diffs and aggregate statistics, all reshaped from the GitHub REST API.

pub mod compare;
pub mod config;
pub mod github;
pub mod patch;
pub mod report;
pub mod store;
