//! `agent-flow`: create, check and normalize flow files.

mod config;

use agent_flow_editor::{DocumentError, FlowEditor, FlowStats};
use clap::{Parser, Subcommand};
use config::CliConfig;
use rootcause::prelude::Report;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headless tooling for agent-flow flow files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./agent-flow.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new flow file holding the starter flow
    Init {
        path: PathBuf,
        /// Flow name
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a flow file and print its node and connection counts
    Check { path: PathBuf },
    /// Rewrite a flow file (including the older front-end format) in canonical form
    Normalize {
        path: PathBuf,
        /// Write here instead of in place
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Init { path, name, force } => init(&config, &path, name, force),
        Command::Check { path } => check(&config, &path).map(|stats| {
            println!("{}: {stats}", path.display());
        }),
        Command::Normalize { path, output } => {
            normalize(&config, &path, output.as_deref().unwrap_or(&path))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("error: {report}");
            ExitCode::FAILURE
        }
    }
}

fn init(
    config: &CliConfig,
    path: &Path,
    name: Option<String>,
    force: bool,
) -> Result<(), Report<DocumentError>> {
    if path.exists() && !force {
        return Err(DocumentError::Io {
            path: path.display().to_string(),
            details: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    let mut editor = FlowEditor::new(config.editor.clone());
    editor.rename(name.unwrap_or_else(|| config.default_flow_name.clone()));
    editor.save_to_path(path)?;
    info!(path = %path.display(), flow_id = %editor.flow_id(), "created flow");
    Ok(())
}

fn check(config: &CliConfig, path: &Path) -> Result<FlowStats, Report<DocumentError>> {
    let mut editor = FlowEditor::empty(config.editor.clone());
    editor.open(path)?;
    Ok(editor.stats())
}

fn normalize(config: &CliConfig, path: &Path, output: &Path) -> Result<(), Report<DocumentError>> {
    let mut editor = FlowEditor::empty(config.editor.clone());
    editor.open(path)?;
    editor.save_to_path(output)?;
    info!(from = %path.display(), to = %output.display(), "normalized flow");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_flow_editor::FlowDefinition;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["agent-flow", "init", "flow.json", "--name", "Bot"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Init { ref name, force: false, .. } if name.as_deref() == Some("Bot")
        ));

        let cli = Cli::try_parse_from(["agent-flow", "normalize", "in.json", "-o", "out.json"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Normalize { output: Some(_), .. }));
    }

    #[test]
    fn init_then_check() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flow.json");
        let config = CliConfig::default();

        init(&config, &path, Some("Support bot".to_string()), false).expect("init");
        let stats = check(&config, &path).expect("check");
        assert_eq!(
            stats,
            FlowStats {
                nodes: 3,
                connections: 2
            }
        );

        assert!(init(&config, &path, None, false).is_err());
        assert!(init(&config, &path, None, true).is_ok());
    }

    #[test]
    fn check_reports_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(
            &path,
            r#"{"nodes": [], "connections": [{"id": "c", "source": "a", "target": "b"}]}"#,
        )
        .expect("write");
        assert!(check(&CliConfig::default(), &path).is_err());
    }

    #[test]
    fn normalize_rewrites_older_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("legacy.json");
        let output = dir.path().join("flow.json");
        std::fs::write(
            &input,
            r#"{"nodes": [
                {"id": "1", "type": "trigger", "position": {"x": 250, "y": 50}, "data": {"label": "Message Trigger"}},
                {"id": "2", "type": "agent", "position": {"x": 250, "y": 200}, "data": {"label": "Main Agent", "model": "GPT-4"}}
            ], "edges": [{"id": "e1-2", "source": "1", "target": "2", "animated": true}]}"#,
        )
        .expect("write");

        normalize(&CliConfig::default(), &input, &output).expect("normalize");

        let json = std::fs::read_to_string(&output).expect("read");
        let flow = FlowDefinition::from_json(&json).expect("parse");
        assert_eq!(flow.document.nodes[1].kind, "agent");
        assert_eq!(flow.document.connections.len(), 1);
        assert!(json.contains("\"connections\""));
        assert!(!json.contains("\"edges\""));
    }
}
