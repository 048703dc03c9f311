//! Shared utilities and common types for the Fleet Beacon backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Field validators plugged into `validator` derives
//! - Geographic range checks shared by editors and configuration

pub mod validation;
