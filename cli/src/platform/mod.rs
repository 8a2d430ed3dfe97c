//! Platform API capability
//!
//! Everything the CLI knows about the remote platform goes through the
//! [`PlatformApi`] trait; [`http::HttpPlatform`] is the production
//! implementation, tests script their own.

pub mod api;
pub mod http;

pub use api::{ActivityScope, LogStream, PlatformApi};
pub use http::HttpPlatform;
