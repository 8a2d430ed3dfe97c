//! Data models shared across the CLI

pub mod application;
pub mod deployment;
pub mod log;
