//! Task manager library.
//!
//! This module exports the core components for the binary and for testing.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod logging;
pub mod password;
pub mod query;
pub mod types;
pub mod web;
