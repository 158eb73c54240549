//! numkit library: application logic for the numeric toolkit CLI.

pub mod app;
pub mod config;
pub mod errors;
