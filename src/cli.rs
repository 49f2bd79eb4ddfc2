use clap::Parser;
use import_fence::application::dto::OutputFormat;

/// Check architectural boundaries between the packages of a Python source tree
#[derive(Parser, Debug)]
#[command(name = "import-fence")]
#[command(version)]
#[command(
    about = "Check architectural boundaries between the packages of a Python source tree",
    long_about = None
)]
pub struct Args {
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<String>,

    /// Path to the config file (defaults to import-fence.config.yml in the project directory)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Fail when the allowed-dependency graph contains a cycle
    #[arg(long)]
    pub check_cyclic: bool,

    /// Reconcile declared requirements against imported packages
    #[arg(long)]
    pub check_requirements: bool,

    /// Resolve unknown requirement names through the package index
    #[arg(long, conflicts_with = "offline")]
    pub allow_third_party: bool,

    /// Never contact the package index
    #[arg(long)]
    pub offline: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Third-party override from the flags, `None` when neither flag is set
    pub fn ignore_third_party(&self) -> Option<bool> {
        if self.offline {
            Some(true)
        } else if self.allow_third_party {
            Some(false)
        } else {
            None
        }
    }
}
