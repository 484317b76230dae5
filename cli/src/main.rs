mod commands;
mod config;
mod credentials;
mod interactive;
mod output;
mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{config::ConfigCommand, permissions::PermissionsCommand, users::UsersCommand};
use roaya_client::{Client, ClientConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

use crate::credentials::ConfigCredentialStore;
use crate::terminal::{TerminalNavigator, TerminalSink};

#[derive(Parser)]
#[command(name = "roaya")]
#[command(about = "cli for the roaya admin api", long_about = None)]
struct Cli {
    /// Server url (overides config)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Output format (table or json)
    #[arg(long, global = true, value_parser = ["table", "json"])]
    output: Option<String>,

    /// Client settings file (toml or yaml)
    #[arg(long, global = true, value_name = "FILE")]
    client_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    Logout,
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    Permissions {
        #[command(subcommand)]
        command: PermissionsCommand,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

impl Command {
    /// Where the command "is", for the session-expiry redirect hint.
    fn location(&self) -> &'static str {
        match self {
            Command::Login { .. } => "/login",
            Command::Logout => "/logout",
            Command::Users { command } => match command {
                UsersCommand::List => "/users/list",
                UsersCommand::Get { .. } => "/users/get",
                UsersCommand::Delete { .. } => "/users/delete",
            },
            Command::Permissions { command } => match command {
                PermissionsCommand::List => "/permissions/list",
                PermissionsCommand::Get { .. } => "/permissions/get",
            },
            Command::Config { .. } => "/config",
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{}\n{:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Config { command } = &cli.command {
        return command.clone().execute();
    }

    let mut client_cfg =
        ClientConfig::load(cli.client_config.clone()).context("Fail load client config")?;
    // a terminal session only wants warnings unless asked otherwise
    client_cfg.log.get_or_insert_with(|| "WARN".to_string());
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let _ = FmtSubscriber::builder()
        .with_env_filter(log_filter(client_cfg.log_level(), &directives))
        .with_writer(std::io::stderr)
        .try_init();

    let (client, output_format) = setup_client_and_format(&cli, client_cfg)?;

    match cli.command {
        Command::Login { email } => commands::auth::login(&client, email, output_format).await,
        Command::Logout => commands::auth::logout(&client),
        Command::Users { command } => command.execute(&client, output_format).await,
        Command::Permissions { command } => command.execute(&client, output_format).await,
        Command::Config { .. } => unreachable!(),
    }
}

fn setup_client_and_format(
    cli: &Cli,
    mut client_cfg: ClientConfig,
) -> Result<(Client, config::OutputFormat)> {
    let cfg = config::load_config().context("Fail to load config")?;

    client_cfg.base_url = Some(resolve_base_url(
        cli.server.clone(),
        client_cfg.base_url.take(),
        cfg.server_url,
    ));
    let client = Client::from_config(&client_cfg)
        .credentials(Arc::new(ConfigCredentialStore))
        .navigator(Arc::new(TerminalNavigator::new(cli.command.location())))
        .sink(Arc::new(TerminalSink))
        .build();

    let output_format = match cli.output.as_deref() {
        Some(fmt) => commands::config::parse_output_format(fmt)?,
        None => cfg.output_format,
    };

    Ok((client, output_format))
}

/// `RUST_LOG` directives win; otherwise everything at `level` and above.
fn log_filter(level: LevelFilter, directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

/// `--server`, then the client config file or `ROAYA_BASE_URL`, then the
/// url saved with `roaya config set server-url`.
fn resolve_base_url(flag: Option<String>, configured: Option<String>, saved: String) -> String {
    flag.or(configured).unwrap_or(saved)
}
