use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::Cli;
use cli::commands::{Commands, PresetCommands, RepoCommands};
use wtplan::tools::{self, AddOptions, WorkspaceMode};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wtplan")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("wtplan.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_application(cli: &Cli) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;

    match &cli.command {
        Commands::Init { toolbox } => {
            handle_init(&base_dir, toolbox.as_deref(), cli.config.as_deref())
        }
        Commands::Plan { workspace_id } => {
            handle_plan(&base_dir, workspace_id.as_deref(), cli.config.as_deref())
        }
        Commands::Preset { command } => {
            handle_preset_command(&base_dir, command, cli.config.as_deref())
        }
        Commands::Repo { command } => handle_repo_command(&base_dir, command, cli.config.as_deref()),
        Commands::Completion { shell } => handle_completion(shell),
        Commands::Cd { .. } | Commands::Path { .. } => handle_deprecated(),
    }
}

fn handle_init(base_dir: &Path, toolbox: Option<&str>, config: Option<&Path>) -> Result<()> {
    info!("Initializing inventory (toolbox: {:?})", toolbox);
    let res = tools::init(base_dir, toolbox, config).context("Failed to initialize inventory")?;
    println!("{}", "Initialized .wtplan.yml".green());
    if let Some(toolbox) = toolbox {
        println!("toolbox_dir: {}", toolbox);
    }
    print_json(&res)
}

fn handle_plan(base_dir: &Path, workspace_id: Option<&str>, config: Option<&Path>) -> Result<()> {
    info!("Planning links (workspace_id: {:?})", workspace_id);
    let res = tools::plan(base_dir, workspace_id, config).context("Failed to compute plan")?;
    print_json(&res)
}

fn handle_preset_command(
    base_dir: &Path,
    command: &PresetCommands,
    config: Option<&Path>,
) -> Result<()> {
    match command {
        PresetCommands::Add {
            preset,
            issue_iid,
            base,
            apply,
            force_links,
            delete_links,
        } => {
            info!("Preset add: {} issue {}", preset, issue_iid);
            let opts = AddOptions {
                base: base.clone(),
                apply: *apply,
                force_links: *force_links,
                delete_links: *delete_links,
            };
            let res = tools::workspace_add(
                base_dir,
                WorkspaceMode::Preset,
                preset,
                *issue_iid,
                &opts,
                config,
            )
            .context("Failed to add preset workspace")?;
            print_json(&res)
        }
        PresetCommands::Rm {
            preset,
            issue_iid,
            force,
        } => {
            info!("Preset rm: {} issue {}", preset, issue_iid);
            let res = tools::workspace_remove(WorkspaceMode::Preset, preset, *issue_iid, *force, false);
            print_json(&res)
        }
        PresetCommands::Path { preset, issue_iid } => {
            let res =
                tools::workspace_path_query(base_dir, WorkspaceMode::Preset, preset, *issue_iid, config)
                    .context("Failed to resolve preset workspace path")?;
            println!("{}", res["path"].as_str().unwrap_or_default());
            Ok(())
        }
    }
}

fn handle_repo_command(base_dir: &Path, command: &RepoCommands, config: Option<&Path>) -> Result<()> {
    match command {
        RepoCommands::Add {
            repo,
            issue_iid,
            base,
            apply,
            force_links,
            delete_links,
        } => {
            info!("Repo add: {} issue {}", repo, issue_iid);
            let opts = AddOptions {
                base: base.clone(),
                apply: *apply,
                force_links: *force_links,
                delete_links: *delete_links,
            };
            let res =
                tools::workspace_add(base_dir, WorkspaceMode::Repo, repo, *issue_iid, &opts, config)
                    .context("Failed to add repo workspace")?;
            print_json(&res)
        }
        RepoCommands::Rm {
            repo,
            issue_iid,
            force,
        } => {
            info!("Repo rm: {} issue {}", repo, issue_iid);
            let res = tools::workspace_remove(WorkspaceMode::Repo, repo, *issue_iid, *force, false);
            print_json(&res)
        }
        RepoCommands::Path { repo, issue_iid } => {
            let res =
                tools::workspace_path_query(base_dir, WorkspaceMode::Repo, repo, *issue_iid, config)
                    .context("Failed to resolve repo workspace path")?;
            println!("{}", res["path"].as_str().unwrap_or_default());
            Ok(())
        }
    }
}

fn handle_completion(shell: &str) -> Result<()> {
    if shell != "bash" {
        println!("{}", "Only bash completion is provided in v0.1".yellow());
        return Ok(());
    }

    let script = r#"
_wtplan_completions() {
  local cur
  COMPREPLY=()
  cur="${COMP_WORDS[COMP_CWORD]}"
  local cmds="init plan preset repo completion"
  if [[ ${COMP_CWORD} -eq 1 ]]; then
    COMPREPLY=( $(compgen -W "${cmds}" -- "${cur}") )
    return 0
  fi
}
complete -F _wtplan_completions wtplan
"#;
    println!("{}", script.trim());
    Ok(())
}

fn handle_deprecated() -> Result<()> {
    println!(
        "{}",
        "Warning: use 'wtplan preset path <preset> <issue_iid>' or 'wtplan repo path <repo> <issue_iid>' instead."
            .yellow()
    );
    std::process::exit(1);
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run the main application logic
    run_application(&cli).context("Application failed")?;

    Ok(())
}
