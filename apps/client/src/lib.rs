//! Client for a two-sided recruitment platform.
//!
//! HR users publish jobs and review ranked candidates; applicants upload
//! resumes and apply. All data lives in a remote service reached through
//! [`gateway::ResourceGateway`]; this crate owns session handling, status
//! lifecycle rules, analytics and dashboard composition.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gateway;
pub mod lifecycle;
pub mod models;
pub mod ranking;
pub mod session;

#[cfg(test)]
mod fixtures;
