mod cli;
mod config;

use cli::Args;
use config::{discover_config, load_config_from_path, ConfigFile, CONFIG_FILENAME};
use import_fence::adapters::outbound::console::StderrProgressReporter;
use import_fence::adapters::outbound::filesystem::{
    FileSystemManifestReader, FileSystemPackageLocator,
};
use import_fence::adapters::outbound::network::{CircuitBreakingPackageIndex, PyPiPackageIndex};
use import_fence::adapters::outbound::python::{PythonEnvironment, PythonImportExtractor};
use import_fence::application::dto::CheckRequest;
use import_fence::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use import_fence::application::use_cases::CheckBoundariesUseCase;
use import_fence::boundary_analysis::domain::ModuleIndex;
use import_fence::boundary_analysis::services::IgnoreFilter;
use import_fence::ports::outbound::ProgressReporter;
use import_fence::shared::error::{ExitCode, FenceError};
use import_fence::shared::Result;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(exit_code) => process::exit(exit_code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::for_error(&e).as_i32());
        }
    }
}

async fn run() -> Result<ExitCode> {
    // Parse command-line arguments (clap exits with code 2 on usage errors)
    let args = Args::parse_args();

    // Validate project directory
    let project_dir = args.path.as_deref().unwrap_or(".");
    let project_path = PathBuf::from(project_dir);
    validate_project_path(&project_path)?;
    let project_path = project_path.canonicalize()?;

    // Load configuration
    let (config, config_dir) = load_config(&args, &project_path)?;
    let source_roots: Vec<PathBuf> = config
        .source_roots(&config_dir)
        .into_iter()
        .map(|root| root.canonicalize().unwrap_or(root))
        .collect();
    let ignore_third_party = args
        .ignore_third_party()
        .or(config.ignore_third_party)
        .unwrap_or(true);

    let progress_reporter = StderrProgressReporter::new();

    // Interpreter layout; resolution degrades to local packages without it
    let environment = match PythonEnvironment::discover(config.python()).await {
        Ok(environment) => environment,
        Err(e) => {
            progress_reporter.report_warning(&format!(
                "{}; standard library and installed packages will not be resolved",
                e
            ));
            PythonEnvironment::unavailable()
        }
    };

    // Create adapters (Dependency Injection)
    let module_index = Arc::new(ModuleIndex::new());
    let package_locator = FileSystemPackageLocator::new(
        IgnoreFilter::new(config.ignore_patterns())?,
        module_index.clone(),
    );
    let import_extractor = PythonImportExtractor::new(&environment, module_index, &source_roots)?;
    let manifest_reader = FileSystemManifestReader::new(config.python());
    let package_index = if ignore_third_party {
        None
    } else {
        Some(CircuitBreakingPackageIndex::new(PyPiPackageIndex::new(
            config.package_server_url(),
            config.timeout(),
        )?))
    };

    // Create use case with injected dependencies
    let use_case = CheckBoundariesUseCase::new(
        package_locator,
        import_extractor,
        manifest_reader,
        progress_reporter,
        package_index,
        environment.runtime_layout(),
    )
    .with_max_concurrent_requests(config.max_concurrent_requests());

    // Create request
    let request = CheckRequest::new(source_roots)
        .with_analysis_packages(config.analysis_packages.clone())
        .with_dependency_map(config.dependency_map())
        .with_check_cyclic(args.check_cyclic || config.check_cyclic.unwrap_or(false))
        .with_check_requirements(
            args.check_requirements || config.check_requirements.unwrap_or(false),
        )
        .with_ignore_third_party(ignore_third_party);

    // Execute use case
    let response = use_case.execute(request).await?;

    for pattern in use_case.package_locator().unmatched_ignore_patterns() {
        eprintln!(
            "⚠️  Warning: Ignore pattern '{}' did not match any source file.",
            pattern
        );
    }

    // Format and present output
    eprintln!("{}", FormatterFactory::progress_message(args.format));
    let formatter = FormatterFactory::create(args.format);
    let formatted_output = formatter.format(&response)?;

    let presenter = PresenterFactory::create(PresenterType::from_output(
        args.output.map(PathBuf::from),
    ));
    presenter.present(&formatted_output)?;

    if response.has_error {
        Ok(ExitCode::ViolationsFound)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Explicit `--config`, otherwise `import-fence.config.yml` in the project directory.
/// Returns the config and the directory relative source paths are resolved against.
fn load_config(args: &Args, project_path: &Path) -> Result<(ConfigFile, PathBuf)> {
    if let Some(config_path) = &args.config {
        let config_path = PathBuf::from(config_path);
        let config = load_config_from_path(&config_path)?;
        let config_dir = config_path
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| project_path.to_path_buf());
        return Ok((config, config_dir));
    }

    match discover_config(project_path)? {
        Some(config) => Ok((config, project_path.to_path_buf())),
        None => anyhow::bail!(
            "No configuration found in {}\n\n💡 Hint: Create {} with at least `source_paths`, or pass --config <FILE>.",
            project_path.display(),
            CONFIG_FILENAME
        ),
    }
}

fn validate_project_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FenceError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Directory does not exist".to_string(),
        }
        .into());
    }

    // Security check: Reject symbolic links for project paths
    let metadata =
        std::fs::symlink_metadata(path).map_err(|e| FenceError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read path metadata: {}", e),
        })?;

    if metadata.is_symlink() {
        return Err(FenceError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !path.is_dir() {
        return Err(FenceError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}
