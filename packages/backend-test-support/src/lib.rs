//! Backend test support utilities
//!
//! This crate provides utilities shared by backend unit and integration
//! tests: unified logging initialization and Problem Details assertions.

pub mod logging;
pub mod problem_details;
