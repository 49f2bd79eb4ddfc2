//! Configuration file support for import-fence.
//!
//! Provides YAML-based configuration through `import-fence.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use import_fence::application::services::DEFAULT_MAX_CONCURRENT_REQUESTS;
use import_fence::shared::Result;

pub const CONFIG_FILENAME: &str = "import-fence.config.yml";

const DEFAULT_PACKAGE_SERVER_URL: &str = "https://pypi.org/pypi";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PYTHON: &str = "python3";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub source_paths: Vec<String>,
    pub analysis_packages: Option<Vec<String>>,
    /// An entry without a value (`svc_c:`) allows nothing
    pub dependency_map: Option<BTreeMap<String, Option<Vec<String>>>>,
    pub check_cyclic: Option<bool>,
    pub check_requirements: Option<bool>,
    pub ignore_third_party: Option<bool>,
    pub package_server_url: Option<String>,
    pub index_options: Option<IndexOptions>,
    pub python: Option<String>,
    pub ignore: Option<Vec<String>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Remote package index tuning.
#[derive(Debug, Deserialize, Default)]
pub struct IndexOptions {
    pub timeout_secs: Option<u64>,
    pub max_concurrent_requests: Option<usize>,
}

impl ConfigFile {
    /// Source paths resolved against the directory holding the config file
    pub fn source_roots(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.source_paths
            .iter()
            .map(|p| {
                let path = Path::new(p);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base_dir.join(path)
                }
            })
            .collect()
    }

    pub fn dependency_map(&self) -> BTreeMap<String, Vec<String>> {
        self.dependency_map
            .iter()
            .flatten()
            .map(|(package, allowed)| (package.clone(), allowed.clone().unwrap_or_default()))
            .collect()
    }

    pub fn package_server_url(&self) -> &str {
        self.package_server_url
            .as_deref()
            .unwrap_or(DEFAULT_PACKAGE_SERVER_URL)
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .index_options
            .as_ref()
            .and_then(|o| o.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.index_options
            .as_ref()
            .and_then(|o| o.max_concurrent_requests)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    pub fn python(&self) -> &str {
        self.python.as_deref().unwrap_or(DEFAULT_PYTHON)
    }

    pub fn ignore_patterns(&self) -> Vec<String> {
        self.ignore.clone().unwrap_or_default()
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.source_paths.is_empty() {
        bail!(
            "Invalid config: source_paths must list at least one directory.\n\n\
             💡 Hint: Add the directories holding your packages, e.g. `source_paths: [src]`."
        );
    }

    for (i, path) in config.source_paths.iter().enumerate() {
        if path.trim().is_empty() {
            bail!("Invalid config: source_paths[{}] must not be empty.", i);
        }
    }

    if let Some(url) = &config.package_server_url {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            bail!(
                "Invalid config: package_server_url must be an http(s) URL, got '{}'.",
                url
            );
        }
    }

    if let Some(options) = &config.index_options {
        if options.timeout_secs == Some(0) {
            bail!("Invalid config: index_options.timeout_secs must be greater than 0.");
        }
        if options.max_concurrent_requests == Some(0) {
            bail!("Invalid config: index_options.max_concurrent_requests must be greater than 0.");
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<&String> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
