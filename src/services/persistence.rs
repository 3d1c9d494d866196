//! Saved configuration storage.
//!
//! [`PersistenceClient`] enforces the save rules; the [`ConfigurationStore`]
//! behind it is host-provided (a directory of JSON files by default).

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::ConfiguratorError;
use crate::models::{Configuration, SavedConfiguration};

/// Maximum length of a configuration name.
const MAX_NAME_LEN: usize = 100;

/// Host-provided key/value store for saved configurations.
pub trait ConfigurationStore: Send + Sync {
    /// Inserts or replaces an entry.
    fn put(&self, saved: &SavedConfiguration) -> Result<()>;

    /// Fetches an entry, `Ok(None)` when absent.
    fn get(&self, name: &str) -> Result<Option<SavedConfiguration>>;

    /// Every entry, in no particular order.
    fn list(&self) -> Result<Vec<SavedConfiguration>>;

    /// Removes an entry. Returns false when it did not exist.
    fn delete(&self, name: &str) -> Result<bool>;
}

/// Stores each configuration as `<name>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileConfigurationStore {
    root: PathBuf,
}

impl FileConfigurationStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn read(path: &Path) -> Result<SavedConfiguration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration: {}", path.display()))
    }
}

impl ConfigurationStore for FileConfigurationStore {
    fn put(&self, saved: &SavedConfiguration) -> Result<()> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create configuration directory: {}", self.root.display())
        })?;

        let content =
            serde_json::to_string_pretty(saved).context("Failed to serialize configuration")?;

        let path = self.path_for(&saved.name);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<SavedConfiguration>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn list(&self) -> Result<Vec<SavedConfiguration>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).with_context(|| {
            format!("Failed to read configuration directory: {}", self.root.display())
        })?;

        let mut saved = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match Self::read(&path) {
                    Ok(config) => saved.push(config),
                    // Skip files that aren't saved configurations
                    Err(e) => debug!("Skipping {}: {e:#}", path.display()),
                }
            }
        }

        Ok(saved)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete configuration: {}", path.display()))?;
        Ok(true)
    }
}

/// In-memory store (tests and embedded hosts).
#[derive(Debug, Default)]
pub struct MemoryConfigurationStore {
    entries: RwLock<HashMap<String, SavedConfiguration>>,
}

impl MemoryConfigurationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurationStore for MemoryConfigurationStore {
    fn put(&self, saved: &SavedConfiguration) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow::anyhow!("Configuration store lock poisoned"))?
            .insert(saved.name.clone(), saved.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<SavedConfiguration>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("Configuration store lock poisoned"))?
            .get(name)
            .cloned())
    }

    fn list(&self) -> Result<Vec<SavedConfiguration>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("Configuration store lock poisoned"))?
            .values()
            .cloned()
            .collect())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("Configuration store lock poisoned"))?
            .remove(name)
            .is_some())
    }
}

/// Validates a configuration name for use as a store key and filename.
///
/// Rejects empty names, path separators, `..`, leading dots and control
/// characters.
pub fn validate_name(name: &str) -> Result<&str, ConfiguratorError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ConfiguratorError::validation("configuration name cannot be empty"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ConfiguratorError::validation(format!(
            "configuration name exceeds {MAX_NAME_LEN} characters"
        )));
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ConfiguratorError::validation(
            "configuration name cannot contain path separators or '..'",
        ));
    }

    if name.starts_with('.') || name.chars().any(char::is_control) {
        return Err(ConfiguratorError::validation(format!(
            "invalid configuration name '{name}'"
        )));
    }

    Ok(name)
}

/// Saves and loads named configurations with validation.
#[derive(Clone)]
pub struct PersistenceClient {
    store: Arc<dyn ConfigurationStore>,
}

impl PersistenceClient {
    /// Creates a client over an injected store.
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        Self { store }
    }

    /// Convenience constructor for a directory-backed store.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileConfigurationStore::new(root)))
    }

    /// Saves `configuration` under `name`, replacing any previous entry.
    ///
    /// Fails with [`ConfiguratorError::ValidationError`] when no pegboard is
    /// selected, no accessory is placed, or the name is unusable.
    pub fn save(&self, name: &str, configuration: &Configuration) -> Result<SavedConfiguration> {
        let name = validate_name(name)?;

        if configuration.pegboard_id.is_none() {
            return Err(ConfiguratorError::validation("select a pegboard before saving").into());
        }

        if configuration.accessories.is_empty() {
            return Err(
                ConfiguratorError::validation("add at least one accessory before saving").into(),
            );
        }

        let saved = match self.store.get(name)? {
            Some(mut existing) => {
                existing.overwrite(configuration.clone());
                existing
            }
            None => SavedConfiguration::new(name, configuration.clone()),
        };

        self.store.put(&saved)?;
        info!(
            name,
            accessories = saved.configuration.accessories.len(),
            "Configuration saved"
        );
        Ok(saved)
    }

    /// Loads the configuration saved under `name`.
    pub fn load(&self, name: &str) -> Result<SavedConfiguration> {
        let name = validate_name(name)?;
        self.store
            .get(name)?
            .ok_or_else(|| ConfiguratorError::configuration_not_found(name).into())
    }

    /// Every saved configuration, most recently modified first.
    pub fn list(&self) -> Result<Vec<SavedConfiguration>> {
        let mut saved = self.store.list()?;
        saved.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(saved)
    }

    /// Deletes a saved configuration.
    pub fn delete(&self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        if !self.store.delete(name)? {
            return Err(ConfiguratorError::configuration_not_found(name).into());
        }
        info!(name, "Configuration deleted");
        Ok(())
    }
}
