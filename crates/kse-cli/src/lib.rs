//! k8s-secret-editor command-line interface.

pub mod prompt;
pub mod render;

use std::path::PathBuf;

use clap::Parser;
use console::style;
use kse_core::config::Overrides;
use kse_core::env::{self, vars};
use kse_core::{BuildInfo, Config};
use kse_session::{ExternalEditor, SessionOutcome, SessionRunner};
use kse_store::KubeSecretStore;
use tracing::info;

use crate::prompt::TerminalPrompter;

/// Interactively edit a single key of a Kubernetes secret in your editor
#[derive(Parser, Debug)]
#[command(name = "k8s-secret-editor")]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print version information and exit
    #[arg(long)]
    pub version: bool,

    /// Editor program used to edit the secret value [default: $EDITOR]
    #[arg(short, long)]
    pub editor: Option<PathBuf>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Timeout in seconds for each request to the cluster
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the requested verbosity, used when `RUST_LOG`
    /// is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            editor: self.editor.clone(),
            kubeconfig: self.kubeconfig.clone(),
            timeout_secs: self.timeout,
        }
    }
}

/// Build metadata for this binary.
///
/// Commit, date and builder are injected at compile time through the
/// `KSE_BUILD_COMMIT`, `KSE_BUILD_DATE` and `KSE_BUILD_BY` variables.
pub fn build_info() -> BuildInfo {
    BuildInfo::new(
        env!("CARGO_PKG_VERSION"),
        option_env!("KSE_BUILD_COMMIT"),
        option_env!("KSE_BUILD_DATE"),
        option_env!("KSE_BUILD_BY"),
    )
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, build: BuildInfo) -> anyhow::Result<()> {
    if cli.version {
        println!("{build}");
        return Ok(());
    }

    let config = Config::resolve(cli.overrides())?;
    let editor =
        ExternalEditor::resolve(config.editor.as_deref(), env::get_path(vars::EDITOR).as_deref())?;
    let store = KubeSecretStore::from_kubeconfig(&config.kubeconfig)?;
    let prompter = TerminalPrompter::new();

    let runner = SessionRunner::new(&store, &editor, &prompter, config.request_timeout);

    let secret = runner.select_secret().await?;
    let mut session = runner.select_key(secret).await?;
    let outcome = runner.edit(&mut session).await?;
    info!(secret = %session.secret(), key = session.key(), ?outcome, "session finished");

    match outcome {
        SessionOutcome::Unchanged => println!("No changes detected."),
        SessionOutcome::Applied => println!(
            "{}",
            style(format!("Secret '{}' updated successfully.", session.secret())).green()
        ),
        SessionOutcome::Cancelled => println!("Save cancelled."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["k8s-secret-editor"]).unwrap();
        assert!(!cli.version);
        assert_eq!(cli.kubeconfig, None);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_parse_version_flag() {
        let cli = Cli::try_parse_from(["k8s-secret-editor", "--version"]).unwrap();
        assert!(cli.version);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "k8s-secret-editor",
            "--editor",
            "/usr/bin/vim",
            "--kubeconfig",
            "/tmp/kubeconfig",
            "--timeout",
            "5",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.editor, Some(PathBuf::from("/usr/bin/vim")));
        assert_eq!(overrides.kubeconfig, Some(PathBuf::from("/tmp/kubeconfig")));
        assert_eq!(overrides.timeout_secs, Some(5));
    }

    #[test]
    fn test_verbosity_maps_to_filter() {
        let cli = Cli::try_parse_from(["k8s-secret-editor", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "info");

        let cli = Cli::try_parse_from(["k8s-secret-editor", "-vvv"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["k8s-secret-editor", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_build_info_uses_package_version() {
        assert_eq!(build_info().version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_version_skips_configuration() {
        let cli = Cli::try_parse_from([
            "k8s-secret-editor",
            "--version",
            "--kubeconfig",
            "/nonexistent/kubeconfig",
        ])
        .unwrap();
        run(cli, build_info()).await.unwrap();
    }
}
