//! Runtime configuration for the console host.

pub mod config;
