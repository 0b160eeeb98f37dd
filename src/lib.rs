//! Keyboard and mouse activity detection.
//!
//! Listens to raw input, drops events that do not indicate a user at the
//! machine (mouse movement, synthetic input, deny-listed devices) and reports
//! once per tick whether anything else happened.

pub mod config;
pub mod contract;
pub mod error;
pub mod listing;
pub mod monitor;
pub mod output;

#[cfg(windows)]
pub mod winapi_utils;
