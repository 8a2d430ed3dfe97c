//! Nimbus CLI Library
//!
//! Core modules for the Nimbus command-line client.

pub mod activity;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod logstream;
pub mod models;
pub mod platform;
pub mod registry;
pub mod utils;
