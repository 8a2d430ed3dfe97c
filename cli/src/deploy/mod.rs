//! Deployment orchestration

pub mod driver;
pub mod publisher;

pub use driver::{DeploymentDriver, DriverOptions};
pub use publisher::SourcePublisher;
