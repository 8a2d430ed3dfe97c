//! Application models

use serde::{Deserialize, Serialize};

/// An application record on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Platform-assigned application ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Owning organisation ID, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Region code, e.g. 'par' or 'mtl'
    pub region: String,

    /// Instance type
    pub instance_type: String,
}

/// Request payload for creating an application
#[derive(Debug, Clone, Serialize)]
pub struct CreateApplication {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    pub region: String,

    pub instance_type: String,
}

/// An environment variable on an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}
