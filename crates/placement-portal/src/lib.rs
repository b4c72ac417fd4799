//! Eligibility matching and application gating for a campus placement portal.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
