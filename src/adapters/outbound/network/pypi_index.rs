use super::artifact::{extract_archive, ArchiveFormat};
use crate::adapters::outbound::filesystem::distribution_layout::read_importable_names;
use crate::boundary_analysis::domain::{parse_requirement_name, Distribution};
use crate::ports::outbound::{IndexError, PackageIndex};
use crate::shared::security::MAX_ARTIFACT_SIZE;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
struct PyPiProject {
    info: PyPiInfo,
    #[serde(default)]
    urls: Vec<PyPiArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
struct PyPiInfo {
    name: String,
    #[serde(default)]
    requires_dist: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PyPiArtifact {
    filename: String,
    url: String,
    packagetype: String,
    #[serde(default)]
    size: Option<u64>,
}

/// PyPiPackageIndex adapter resolving distributions through the PyPI JSON API
///
/// One attempt per name, no retries: a failed attempt is reported as
/// `IndexError::Unreachable` and left to the circuit breaker.
///
/// The latest release's wheel is preferred over its sdist. The artifact is
/// extracted into a temporary directory that is removed on every path.
pub struct PyPiPackageIndex {
    client: reqwest::Client,
    base_url: String,
}

impl PyPiPackageIndex {
    /// Creates a client for `base_url` (e.g. `https://pypi.org/pypi`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("import-fence/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Validates a requirement name before it becomes part of a URL
    fn validate_url_component(component: &str, component_type: &str) -> Result<()> {
        if component.contains('/') || component.contains('\\') {
            anyhow::bail!(
                "Security: {} contains path separators which are not allowed",
                component_type
            );
        }

        if component.contains("..") {
            anyhow::bail!(
                "Security: {} contains '..' which is not allowed",
                component_type
            );
        }

        if component.contains('#') || component.contains('?') || component.contains('@') {
            anyhow::bail!("Security: {} contains URL-unsafe characters", component_type);
        }

        Ok(())
    }

    async fn fetch_project(&self, name: &str) -> std::result::Result<Option<PyPiProject>, IndexError> {
        Self::validate_url_component(name, "Package name").map_err(|e| artifact_error(name, e))?;

        let url = format!("{}/{}/json", self.base_url, urlencoding::encode(name));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(name, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() {
            return Err(IndexError::Unreachable(format!(
                "{} returned status code {}",
                url, status
            )));
        }
        if !status.is_success() {
            return Err(artifact_error(
                name,
                format!("index returned status code {}", status),
            ));
        }

        let project: PyPiProject = response.json().await.map_err(|e| request_error(name, e))?;
        Ok(Some(project))
    }

    async fn download(&self, name: &str, artifact: &PyPiArtifact) -> std::result::Result<Vec<u8>, IndexError> {
        if artifact.size.is_some_and(|size| size > MAX_ARTIFACT_SIZE) {
            return Err(artifact_error(
                name,
                format!("{} exceeds the artifact size limit", artifact.filename),
            ));
        }

        let response = self
            .client
            .get(&artifact.url)
            .send()
            .await
            .map_err(|e| request_error(name, e))?;
        if !response.status().is_success() {
            return Err(artifact_error(
                name,
                format!(
                    "download of {} returned status code {}",
                    artifact.filename,
                    response.status()
                ),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| request_error(name, e))?;
        if bytes.len() as u64 > MAX_ARTIFACT_SIZE {
            return Err(artifact_error(
                name,
                format!("{} exceeds the artifact size limit", artifact.filename),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PackageIndex for PyPiPackageIndex {
    async fn fetch_distribution(&self, name: &str) -> std::result::Result<Option<Distribution>, IndexError> {
        let Some(project) = self.fetch_project(name).await? else {
            return Ok(None);
        };

        let Some((artifact, format)) = select_artifact(&project.urls) else {
            if project.urls.is_empty() {
                return Ok(Some(distribution_from_dir(&project.info, None)));
            }
            return Err(artifact_error(name, "unsupported archive format"));
        };

        let bytes = self.download(name, &artifact).await?;
        let info = project.info.clone();
        let owned_name = name.to_string();

        // extraction is blocking filesystem work
        tokio::task::spawn_blocking(move || -> std::result::Result<Distribution, IndexError> {
            let extract_dir = TempDir::new().map_err(|e| artifact_error(&owned_name, e))?;
            extract_archive(&bytes, format, extract_dir.path())
                .map_err(|e| artifact_error(&owned_name, e))?;
            Ok(distribution_from_dir(&info, Some(extract_dir.path())))
        })
        .await
        .map_err(|e| artifact_error(name, e))?
        .map(Some)
    }
}

fn request_error(name: &str, error: reqwest::Error) -> IndexError {
    if error.is_connect() || error.is_timeout() {
        IndexError::Unreachable(error.to_string())
    } else {
        artifact_error(name, error)
    }
}

fn artifact_error(name: &str, details: impl ToString) -> IndexError {
    IndexError::Artifact {
        name: name.to_string(),
        details: details.to_string(),
    }
}

/// First wheel, otherwise the first sdist in a format we can extract
fn select_artifact(artifacts: &[PyPiArtifact]) -> Option<(PyPiArtifact, ArchiveFormat)> {
    let supported = |artifact: &&PyPiArtifact| ArchiveFormat::from_filename(&artifact.filename).is_some();
    let chosen = artifacts
        .iter()
        .filter(supported)
        .find(|a| a.packagetype == "bdist_wheel")
        .or_else(|| {
            artifacts
                .iter()
                .filter(supported)
                .find(|a| a.packagetype == "sdist")
        })?;
    let format = ArchiveFormat::from_filename(&chosen.filename)?;
    Some((chosen.clone(), format))
}

/// An sdist unpacks to a single `name-version/` directory
fn artifact_root(extract_dir: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = fs::read_dir(extract_dir)
        .map(|entries| entries.flatten().map(|e| e.path()).collect())
        .unwrap_or_default();
    match entries.as_slice() {
        [single] if single.is_dir() => single.clone(),
        _ => extract_dir.to_path_buf(),
    }
}

fn distribution_from_dir(info: &PyPiInfo, extract_dir: Option<&Path>) -> Distribution {
    let requirements = info
        .requires_dist
        .iter()
        .flatten()
        .filter_map(|requirement| parse_requirement_name(requirement))
        .collect();
    let importable = extract_dir
        .map(|dir| read_importable_names(&artifact_root(dir)))
        .unwrap_or_default();
    Distribution::new(info.name.clone(), requirements, importable)
}
