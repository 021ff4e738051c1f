//! Settings persistence.
//!
//! The configuration lives as one JSON blob at `<vault>/.mdai/settings.json`.
//! Fields absent from the blob take their defaults; every edit is written back
//! immediately.

use std::path::{Path, PathBuf};

use pipeline::{Configuration, ConfigurationError, SettingsUpdate};
use thiserror::Error;

/// Directory under the vault root that holds MDAI state.
pub const SETTINGS_DIR: &str = ".mdai";

/// File name of the settings blob inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigurationError,
    },
}

/// Reads and writes the settings blob at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<vault_root>/.mdai/settings.json`
    pub fn default_path(vault_root: &Path) -> PathBuf {
        vault_root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_blob(&self) -> Result<Option<String>, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no settings file; using defaults");
                Ok(None)
            }
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Loads the persisted configuration, or the defaults when no file exists.
    pub async fn load(&self) -> Result<Configuration, SettingsError> {
        let Some(blob) = self.read_blob().await? else {
            return Ok(Configuration::default());
        };
        Configuration::from_json(&blob).map_err(|source| SettingsError::Invalid {
            path: self.path.clone(),
            source,
        })
    }

    /// Loads the configuration as the starting point for a settings edit.
    ///
    /// Invalid fields fall back to their defaults with a warning, and an
    /// unparseable file yields the defaults, so a damaged file can always be
    /// repaired by the next [`SettingsStore::update`].
    pub async fn load_for_edit(&self) -> Result<Configuration, SettingsError> {
        let Some(blob) = self.read_blob().await? else {
            return Ok(Configuration::default());
        };
        match Configuration::from_json_lenient(&blob) {
            Ok((config, rejected)) => {
                for (key, error) in rejected {
                    tracing::warn!(
                        path = %self.path.display(),
                        key = %key,
                        error = %error,
                        "ignoring invalid setting; the default applies"
                    );
                }
                Ok(config)
            }
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %error,
                    "settings file is unreadable; starting from defaults"
                );
                Ok(Configuration::default())
            }
        }
    }

    /// Writes `config` as the persisted blob, creating the directory if needed.
    pub async fn save(&self, config: &Configuration) -> Result<(), SettingsError> {
        let blob = config.to_json().map_err(|source| SettingsError::Invalid {
            path: self.path.clone(),
            source,
        })?;
        let io = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io)?;
        }
        tokio::fs::write(&self.path, blob).await.map_err(io)?;

        // The blob carries the API key.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(io)?;
        }
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Applies `update` to `current`, persists the result, and returns it.
    ///
    /// Nothing is written when the edit is rejected.
    pub async fn update(
        &self,
        current: &Configuration,
        update: SettingsUpdate,
    ) -> Result<Configuration, SettingsError> {
        let next = current
            .apply(update)
            .map_err(|source| SettingsError::Invalid {
                path: self.path.clone(),
                source,
            })?;
        self.save(&next).await?;
        Ok(next)
    }
}
