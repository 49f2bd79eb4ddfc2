use crate::boundary_analysis::domain::RuntimeLayout;
use crate::shared::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Printed by the interpreter as one JSON object
const INTROSPECTION_SCRIPT: &str = r#"
import json, sys, sysconfig
print(json.dumps({
    "prefix": sys.prefix,
    "base_prefix": getattr(sys, "base_prefix", sys.prefix),
    "exec_prefix": sys.exec_prefix,
    "stdlib": sysconfig.get_paths().get("stdlib"),
    "sys_path": [p for p in sys.path if p],
    "builtin_module_names": list(sys.builtin_module_names),
}))
"#;

/// Installation layout of the Python interpreter used for resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PythonEnvironment {
    prefix: Option<PathBuf>,
    base_prefix: Option<PathBuf>,
    exec_prefix: Option<PathBuf>,
    stdlib: Option<PathBuf>,
    #[serde(default)]
    sys_path: Vec<PathBuf>,
    #[serde(default)]
    builtin_module_names: Vec<String>,
}

impl PythonEnvironment {
    /// Runs `python -c <script>` once and reads the interpreter layout
    ///
    /// # Errors
    /// Returns an error if the interpreter cannot be started, exits with a
    /// failure status or prints something other than the expected JSON
    pub async fn discover(python: &str) -> Result<Self> {
        let output = Command::new(python)
            .arg("-c")
            .arg(INTROSPECTION_SCRIPT)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run Python interpreter '{}': {}", python, e))?;

        if !output.status.success() {
            anyhow::bail!(
                "Python interpreter '{}' failed ({}): {}",
                python,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Self::from_json(&String::from_utf8_lossy(&output.stdout))
    }

    /// Parses the introspection output
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json.trim())
            .map_err(|e| anyhow::anyhow!("Unexpected interpreter introspection output: {}", e))
    }

    /// Layout used when no interpreter could be run: nothing is builtin
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.prefix.is_some()
    }

    /// Directories searched for absolute imports, in interpreter order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.sys_path
    }

    pub fn builtin_modules(&self) -> HashSet<String> {
        self.builtin_module_names.iter().cloned().collect()
    }

    pub fn runtime_layout(&self) -> RuntimeLayout {
        let prefixes = [
            &self.prefix,
            &self.base_prefix,
            &self.exec_prefix,
            &self.stdlib,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        RuntimeLayout::new(prefixes, self.builtin_modules())
    }
}
