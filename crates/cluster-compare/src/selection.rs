//! Feature selector configuration with pluggable persistence

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Value type of a data column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Numeric,
    Categorical,
}

/// Whether a higher value makes a location more or less suitable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Influence {
    #[default]
    Positive,
    Negative,
}

/// Per-column feature configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub influence: Influence,
}

fn default_weight() -> f64 {
    1.0
}

impl ColumnConfig {
    /// Unselected numeric column with weight 1 and positive influence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selected: false,
            weight: default_weight(),
            kind: ColumnKind::Numeric,
            influence: Influence::Positive,
        }
    }
}

/// Where the feature selector state lives between sessions
pub trait SelectionStore: Send + Sync {
    /// Saved configuration; `None` when nothing was saved
    fn load(&self) -> Result<Option<Vec<ColumnConfig>>>;

    fn save(&self, configs: &[ColumnConfig]) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Pretty JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<ColumnConfig>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let configs: Vec<ColumnConfig> = serde_json::from_str(&data).map_err(|e| {
            Error::storage(format!("Invalid selector file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(configs))
    }

    fn save(&self, configs: &[ColumnConfig]) -> Result<()> {
        let data = serde_json::to_string_pretty(configs)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store, for tests and one-shot runs
#[derive(Default)]
pub struct MemoryStore {
    saved: RwLock<Option<Vec<ColumnConfig>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<ColumnConfig>>> {
        Ok(self.saved.read().clone())
    }

    fn save(&self, configs: &[ColumnConfig]) -> Result<()> {
        *self.saved.write() = Some(configs.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.saved.write() = None;
        Ok(())
    }
}

/// Feature configuration for the current set of data columns
pub struct FeatureSelector {
    configs: Vec<ColumnConfig>,
    store: Arc<dyn SelectionStore>,
}

impl FeatureSelector {
    /// One config per column, restoring saved entries by name
    ///
    /// Saved entries for columns no longer present are dropped. An unreadable
    /// save is logged and ignored.
    pub fn load(columns: &[String], store: Arc<dyn SelectionStore>) -> Self {
        let saved = match store.load() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Could not load feature selector state: {}", e);
                Vec::new()
            }
        };

        let configs = columns
            .iter()
            .map(|column| {
                saved
                    .iter()
                    .find(|c| &c.name == column)
                    .cloned()
                    .unwrap_or_else(|| ColumnConfig::new(column.clone()))
            })
            .collect();

        Self { configs, store }
    }

    /// Features to report on for one run
    ///
    /// Explicit features win. With none given, the saved selection over
    /// `columns` applies. With `remember`, the explicit features replace the
    /// saved selection.
    pub fn resolve(
        columns: &[String],
        explicit: &[String],
        remember: bool,
        store: Arc<dyn SelectionStore>,
    ) -> Result<Vec<String>> {
        let mut known = columns.to_vec();
        for feature in explicit {
            if !known.contains(feature) {
                known.push(feature.clone());
            }
        }
        let mut selector = Self::load(&known, store);

        if explicit.is_empty() {
            return Ok(selector.selected_features());
        }
        if remember {
            selector.select_only(explicit)?;
        }
        Ok(explicit.to_vec())
    }

    pub fn configs(&self) -> &[ColumnConfig] {
        &self.configs
    }

    /// Names of selected columns, in column order
    pub fn selected_features(&self) -> Vec<String> {
        self.selected().map(|c| c.name.clone()).collect()
    }

    pub fn selected(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.configs.iter().filter(|c| c.selected)
    }

    /// Sum of weights over selected columns
    pub fn total_weight(&self) -> f64 {
        self.selected().map(|c| c.weight).sum()
    }

    /// Returns false for unknown columns
    pub fn set_selected(&mut self, name: &str, selected: bool) -> Result<bool> {
        self.update(name, |c| c.selected = selected)
    }

    pub fn set_weight(&mut self, name: &str, weight: f64) -> Result<bool> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::config(format!("Invalid weight {} for {}", weight, name)));
        }
        self.update(name, |c| c.weight = weight)
    }

    pub fn set_kind(&mut self, name: &str, kind: ColumnKind) -> Result<bool> {
        self.update(name, |c| c.kind = kind)
    }

    pub fn set_influence(&mut self, name: &str, influence: Influence) -> Result<bool> {
        self.update(name, |c| c.influence = influence)
    }

    /// Select exactly `names`, deselecting every other column
    pub fn select_only(&mut self, names: &[String]) -> Result<()> {
        for config in &mut self.configs {
            config.selected = names.contains(&config.name);
        }
        self.store.save(&self.configs)
    }

    /// Forget the saved state and return every column to its default
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        for config in &mut self.configs {
            *config = ColumnConfig::new(config.name.clone());
        }
        Ok(())
    }

    fn update(&mut self, name: &str, apply: impl FnOnce(&mut ColumnConfig)) -> Result<bool> {
        let Some(config) = self.configs.iter_mut().find(|c| c.name == name) else {
            return Ok(false);
        };
        apply(config);
        self.store.save(&self.configs)?;
        Ok(true)
    }
}
