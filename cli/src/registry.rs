//! Alias registry and application resolution
//!
//! Aliases are short local names for remote applications, stored in a
//! `.nimbus.json` file scoped to the working tree. The file is found
//! by walking up from the current directory, so subdirectories of a
//! linked tree resolve the same applications.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CliError;
use crate::models::application::Application;
use crate::platform::PlatformApi;

/// One alias binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub alias: String,
    pub app: Application,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    apps: Vec<RegistryEntry>,
}

/// Alias → application registry backed by a working-tree file
pub struct AliasRegistry {
    path: PathBuf,
}

impl AliasRegistry {
    pub const FILE_NAME: &'static str = ".nimbus.json";

    /// Use an explicit registry file path
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Locate the registry for the working tree containing `start`.
    ///
    /// Walks up the directory tree; if no registry file exists yet,
    /// new bindings land in `start` itself.
    pub fn discover(start: &Path) -> Self {
        let mut dir = start;
        loop {
            let candidate = dir.join(Self::FILE_NAME);
            if candidate.is_file() {
                debug!("Using alias registry at {}", candidate.display());
                return Self::at(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Self::at(start.join(Self::FILE_NAME)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<RegistryFile, CliError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CliError::Registry(format!(
                    "invalid registry file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RegistryFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &RegistryFile) -> Result<(), CliError> {
        let bytes = serde_json::to_vec_pretty(file)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// Resolve an alias to its bound application
    pub async fn resolve(&self, alias: &str) -> Result<Option<Application>, CliError> {
        let file = self.load().await?;
        Ok(file
            .apps
            .into_iter()
            .find(|e| e.alias == alias)
            .map(|e| e.app))
    }

    /// Bind an alias to an application; rebinding replaces the old entry
    pub async fn bind(&self, alias: &str, app: &Application) -> Result<(), CliError> {
        let mut file = self.load().await?;
        file.apps.retain(|e| e.alias != alias);
        file.apps.push(RegistryEntry {
            alias: alias.to_string(),
            app: app.clone(),
        });
        self.save(&file).await
    }

    /// Remove an alias binding; returns whether it existed
    pub async fn unbind(&self, alias: &str) -> Result<bool, CliError> {
        let mut file = self.load().await?;
        let before = file.apps.len();
        file.apps.retain(|e| e.alias != alias);
        let removed = file.apps.len() < before;
        if removed {
            self.save(&file).await?;
        }
        Ok(removed)
    }

    /// All alias bindings in this working tree
    pub async fn entries(&self) -> Result<Vec<RegistryEntry>, CliError> {
        Ok(self.load().await?.apps)
    }
}

/// Resolves command-line targets to concrete application records
pub struct AliasResolver<'a, P: PlatformApi + ?Sized> {
    registry: &'a AliasRegistry,
    platform: &'a P,
}

impl<'a, P: PlatformApi + ?Sized> AliasResolver<'a, P> {
    pub fn new(registry: &'a AliasRegistry, platform: &'a P) -> Self {
        Self { registry, platform }
    }

    /// Resolve `--app ID` / `--alias A` / neither to an application.
    ///
    /// An explicit ID bypasses the registry and fetches the record
    /// from the platform. With no alias at all, a registry holding
    /// exactly one entry acts as the default.
    pub async fn resolve(
        &self,
        alias: Option<&str>,
        app_id: Option<&str>,
    ) -> Result<Application, CliError> {
        if let Some(id) = app_id {
            return self.platform.get_application(id).await;
        }

        match alias {
            Some(a) => self
                .registry
                .resolve(a)
                .await?
                .ok_or_else(|| CliError::UnknownAlias(a.to_string())),
            None => {
                let mut entries = self.registry.entries().await?;
                if entries.len() == 1 {
                    match entries.pop() {
                        Some(entry) => Ok(entry.app),
                        None => Err(CliError::UnresolvedAlias),
                    }
                } else {
                    Err(CliError::UnresolvedAlias)
                }
            }
        }
    }
}
