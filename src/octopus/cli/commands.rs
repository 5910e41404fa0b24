//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Merge config file, environment and flags into a `ClientFactory`
//! 3. **Dispatch**: Ask the factory for the right client and call the library
//! 4. **Output Formatting**: Hand results to `print`
//!
//! `config` never touches the network, so it runs before any context is built
//! and works even when no server is configured yet.

use super::init_logging;
use super::print::{print_message, print_server, print_spaces, print_targets, MessageLevel};
use super::setup::{
    AzureWebAppCommands, Cli, Commands, DeploymentTargetCommands, SpaceCommands,
};
use clap::Parser;
use octopus::config::{config_dir, CliConfig, ConfigKey};
use octopus::error::Result;
use octopus::factory::ClientFactory;
use octopus::prompt::{Asker, NoPrompt, TerminalAsker};
use octopus::requester::CommandRequester;
use octopus::targets::{list_targets, TargetQuery, AZURE_WEB_APP};
use octopus::transport::HttpTransport;
use std::sync::Arc;
use tracing::debug;

struct AppContext {
    factory: ClientFactory,
    requester: CommandRequester,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Config { key, value } = &cli.command {
        return handle_config(key.as_deref(), value.as_deref());
    }

    let ctx = init_context(&cli)?;

    match &cli.command {
        Commands::Space(SpaceCommands::List) => handle_space_list(&ctx),
        Commands::DeploymentTarget(DeploymentTargetCommands::AzureWebApp(
            AzureWebAppCommands::List,
        )) => handle_azure_web_app_list(&ctx),
        Commands::Whoami => handle_whoami(&ctx),
        Commands::Config { .. } => Ok(()),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let mut config = CliConfig::load(config_dir()?)?.apply_process_env();
    if let Some(space) = &cli.space {
        config.space = Some(space.clone());
    }
    if cli.no_prompt {
        config.no_prompt = true;
    }
    debug!(config = ?config, "effective configuration");

    let asker: Arc<dyn Asker> = if config.no_prompt {
        Arc::new(NoPrompt)
    } else {
        Arc::new(TerminalAsker::new(true))
    };

    let factory = ClientFactory::new(
        Arc::new(HttpTransport::new()?),
        config.server_url()?,
        config.credential()?,
        config.space_selector(),
        asker,
    )?;

    Ok(AppContext {
        factory,
        requester: CommandRequester::new(cli.command.path()),
    })
}

fn handle_space_list(ctx: &AppContext) -> Result<()> {
    let client = ctx.factory.get_system_client(&ctx.requester)?;
    let spaces = client.spaces().all()?;
    print_spaces(&spaces);
    Ok(())
}

fn handle_azure_web_app_list(ctx: &AppContext) -> Result<()> {
    let client = ctx.factory.get_spaced_client(&ctx.requester)?;
    let page = list_targets(&client, &TargetQuery::of_type(AZURE_WEB_APP))?;
    print_targets(&page);
    Ok(())
}

fn handle_whoami(ctx: &AppContext) -> Result<()> {
    let client = ctx.factory.get_system_client(&ctx.requester)?;
    print_server(client.server_url(), client.root());
    Ok(())
}

fn handle_config(key: Option<&str>, value: Option<&str>) -> Result<()> {
    let dir = config_dir()?;
    let mut config = CliConfig::load(&dir)?;

    match (key, value) {
        (None, _) => {
            for key in ConfigKey::all() {
                let value = config.get(*key).unwrap_or_default();
                println!("{} = {}", key.name(), value);
            }
        }
        (Some(key), None) => {
            let key: ConfigKey = key.parse()?;
            match config.get(key) {
                Some(value) => println!("{}", value),
                None => print_message(MessageLevel::Warning, &format!("{} is not set", key.name())),
            }
        }
        (Some(key), Some(value)) => {
            let key: ConfigKey = key.parse()?;
            config.set(key, value)?;
            config.save(&dir)?;
            debug!(key = key.name(), dir = %dir.display(), "saved configuration");
            print_message(MessageLevel::Success, &format!("{} updated", key.name()));
            if config.api_key.is_some() && config.access_token.is_some() {
                print_message(
                    MessageLevel::Info,
                    "both an API key and an access token are set; clear one with `octopus config <key> \"\"`",
                );
            }
        }
    }
    Ok(())
}
