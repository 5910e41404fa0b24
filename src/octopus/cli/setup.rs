use clap::{Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.1.0" for releases, "0.1.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "octopus", bin_name = "octopus", version = get_version())]
#[command(about = "Command-line client for Octopus Deploy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Space name or ID to work in (overrides OCTOPUS_SPACE)
    #[arg(short, long, global = true, value_name = "SPACE")]
    pub space: Option<String>,

    /// Never ask questions; fail if something required is missing
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage spaces
    #[command(subcommand, display_order = 1)]
    Space(SpaceCommands),

    /// Manage deployment targets
    #[command(subcommand, display_order = 2)]
    DeploymentTarget(DeploymentTargetCommands),

    /// Show the server you are connected to
    #[command(display_order = 3)]
    Whoami,

    /// Get or set configuration
    #[command(display_order = 4)]
    Config {
        /// Configuration key (url, api-key, access-token, space, no-prompt)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SpaceCommands {
    /// List spaces
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum DeploymentTargetCommands {
    /// Manage Azure Web App deployment targets
    #[command(subcommand)]
    AzureWebApp(AzureWebAppCommands),
}

#[derive(Subcommand, Debug)]
pub enum AzureWebAppCommands {
    /// List Azure Web App deployment targets
    #[command(alias = "ls")]
    List,
}

impl Commands {
    /// The subcommand path, used to label requests made on its behalf.
    pub fn path(&self) -> &'static str {
        match self {
            Commands::Space(SpaceCommands::List) => "space list",
            Commands::DeploymentTarget(DeploymentTargetCommands::AzureWebApp(
                AzureWebAppCommands::List,
            )) => "deployment-target azure-web-app list",
            Commands::Whoami => "whoami",
            Commands::Config { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_space_list_and_alias() {
        for args in [&["octopus", "space", "list"], &["octopus", "space", "ls"]] {
            let cli = parse(args);
            assert!(matches!(cli.command, Commands::Space(SpaceCommands::List)));
            assert_eq!(cli.command.path(), "space list");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "octopus",
            "deployment-target",
            "azure-web-app",
            "ls",
            "--space",
            "Integrations",
            "--no-prompt",
            "-v",
        ]);
        assert_eq!(cli.space.as_deref(), Some("Integrations"));
        assert!(cli.no_prompt);
        assert!(cli.verbose);
        assert_eq!(cli.command.path(), "deployment-target azure-web-app list");
    }

    #[test]
    fn test_short_space_flag() {
        let cli = parse(&["octopus", "-s", "Spaces-2", "whoami"]);
        assert_eq!(cli.space.as_deref(), Some("Spaces-2"));
        assert!(!cli.no_prompt);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_config_arguments() {
        let cli = parse(&["octopus", "config", "space", "Default"]);
        match cli.command {
            Commands::Config { key, value } => {
                assert_eq!(key.as_deref(), Some("space"));
                assert_eq!(value.as_deref(), Some("Default"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["octopus"]).is_err());
    }
}
