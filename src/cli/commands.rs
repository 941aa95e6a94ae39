//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - init: create the inventory and workspace layout
//! - plan: show differences between inventory and actual state
//! - preset/repo: workspace management subcommand groups
//! - completion: shell completion script

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wtplan - Manage per-issue workspaces across multiple repositories
#[derive(Parser, Debug)]
#[command(name = "wtplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional inventory file path (defaults to ./.wtplan.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize .wtplan.yml and the workspace layout
    Init {
        /// Toolbox directory path
        #[arg(long)]
        toolbox: Option<String>,
    },

    /// Show differences between the inventory and actual state
    Plan {
        /// Workspace identifier
        #[arg(long)]
        workspace_id: Option<String>,
    },

    /// Manage preset-based workspaces
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Manage single repository workspaces
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(default_value = "bash")]
        shell: String,
    },

    /// [DEPRECATED] Change to workspace directory. Use 'preset path' or 'repo path' instead
    Cd {
        /// Workspace identifier
        workspace_id: String,
    },

    /// [DEPRECATED] Show workspace path. Use 'preset path' or 'repo path' instead
    Path {
        /// Workspace identifier
        workspace_id: String,
    },
}

/// Preset workspace subcommands
#[derive(Subcommand, Debug)]
pub enum PresetCommands {
    /// Create workspace from preset + issue IID
    Add {
        /// Preset name
        preset: String,

        /// Issue IID
        issue_iid: u32,

        /// Base directory
        #[arg(long)]
        base: Option<String>,

        /// Apply the plan immediately
        #[arg(long)]
        apply: bool,

        /// Force overwrite when syncing
        #[arg(long)]
        force_links: bool,

        /// Delete extra files when syncing
        #[arg(long)]
        delete_links: bool,
    },

    /// Remove workspace from preset + issue IID
    Rm {
        /// Preset name
        preset: String,

        /// Issue IID
        issue_iid: u32,

        /// Force removal without safety checks
        #[arg(long)]
        force: bool,
    },

    /// Return absolute path of preset workspace (read-only reference)
    Path {
        /// Preset name
        preset: String,

        /// Issue IID
        issue_iid: u32,
    },
}

/// Single-repo workspace subcommands
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Create workspace from single repo + issue IID
    Add {
        /// Repository name
        repo: String,

        /// Issue IID
        issue_iid: u32,

        /// Base directory
        #[arg(long)]
        base: Option<String>,

        /// Apply the plan immediately
        #[arg(long)]
        apply: bool,

        /// Force overwrite when syncing
        #[arg(long)]
        force_links: bool,

        /// Delete extra files when syncing
        #[arg(long)]
        delete_links: bool,
    },

    /// Remove workspace from single repo + issue IID
    Rm {
        /// Repository name
        repo: String,

        /// Issue IID
        issue_iid: u32,

        /// Force removal without safety checks
        #[arg(long)]
        force: bool,
    },

    /// Return absolute path of repo workspace (read-only reference)
    Path {
        /// Repository name
        repo: String,

        /// Issue IID
        issue_iid: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["wtplan", "-v", "plan"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["wtplan", "-c", "/path/to/.wtplan.yml", "plan"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/.wtplan.yml")));
    }

    #[test]
    fn test_init_with_toolbox() {
        let cli = Cli::try_parse_from(["wtplan", "init", "--toolbox", "/opt/toolbox"]).unwrap();
        match cli.command {
            Commands::Init { toolbox } => {
                assert_eq!(toolbox, Some("/opt/toolbox".to_string()));
            }
            _ => panic!("Expected init command"),
        }
    }

    #[test]
    fn test_plan_command() {
        let cli = Cli::try_parse_from(["wtplan", "plan"]).unwrap();
        match cli.command {
            Commands::Plan { workspace_id } => {
                assert!(workspace_id.is_none());
            }
            _ => panic!("Expected plan command"),
        }
    }

    #[test]
    fn test_preset_add() {
        let cli = Cli::try_parse_from(["wtplan", "preset", "add", "backend", "42"]).unwrap();
        match cli.command {
            Commands::Preset {
                command:
                    PresetCommands::Add {
                        preset,
                        issue_iid,
                        apply,
                        force_links,
                        delete_links,
                        base,
                    },
            } => {
                assert_eq!(preset, "backend");
                assert_eq!(issue_iid, 42);
                assert!(base.is_none());
                assert!(!apply);
                assert!(!force_links);
                assert!(!delete_links);
            }
            _ => panic!("Expected preset add command"),
        }
    }

    #[test]
    fn test_preset_add_with_flags() {
        let cli = Cli::try_parse_from([
            "wtplan",
            "preset",
            "add",
            "backend",
            "42",
            "--apply",
            "--force-links",
            "--delete-links",
        ])
        .unwrap();
        match cli.command {
            Commands::Preset {
                command:
                    PresetCommands::Add {
                        apply,
                        force_links,
                        delete_links,
                        ..
                    },
            } => {
                assert!(apply);
                assert!(force_links);
                assert!(delete_links);
            }
            _ => panic!("Expected preset add command"),
        }
    }

    #[test]
    fn test_preset_add_missing_args_fails() {
        assert!(Cli::try_parse_from(["wtplan", "preset", "add"]).is_err());
    }

    #[test]
    fn test_preset_add_rejects_non_numeric_iid() {
        assert!(Cli::try_parse_from(["wtplan", "preset", "add", "backend", "abc"]).is_err());
    }

    #[test]
    fn test_repo_rm() {
        let cli = Cli::try_parse_from(["wtplan", "repo", "rm", "api", "7", "--force"]).unwrap();
        match cli.command {
            Commands::Repo {
                command: RepoCommands::Rm { repo, issue_iid, force },
            } => {
                assert_eq!(repo, "api");
                assert_eq!(issue_iid, 7);
                assert!(force);
            }
            _ => panic!("Expected repo rm command"),
        }
    }

    #[test]
    fn test_repo_path() {
        let cli = Cli::try_parse_from(["wtplan", "repo", "path", "api", "7"]).unwrap();
        match cli.command {
            Commands::Repo {
                command: RepoCommands::Path { repo, issue_iid },
            } => {
                assert_eq!(repo, "api");
                assert_eq!(issue_iid, 7);
            }
            _ => panic!("Expected repo path command"),
        }
    }

    #[test]
    fn test_completion_defaults_to_bash() {
        let cli = Cli::try_parse_from(["wtplan", "completion"]).unwrap();
        match cli.command {
            Commands::Completion { shell } => assert_eq!(shell, "bash"),
            _ => panic!("Expected completion command"),
        }
    }

    #[test]
    fn test_deprecated_cd_still_parses() {
        let cli = Cli::try_parse_from(["wtplan", "cd", "API_ISSUE_0042"]).unwrap();
        match cli.command {
            Commands::Cd { workspace_id } => assert_eq!(workspace_id, "API_ISSUE_0042"),
            _ => panic!("Expected cd command"),
        }
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }
}
