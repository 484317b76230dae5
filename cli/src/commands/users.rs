use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use roaya_client::Client;

use crate::{config::OutputFormat, interactive, output};

#[derive(Subcommand, Clone)]
pub enum UsersCommand {
    List,
    Get {
        id: String,
    },
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl UsersCommand {
    pub async fn execute(self, client: &Client, output_format: OutputFormat) -> Result<()> {
        match self {
            UsersCommand::List => {
                let users = client.users().list().await.context("Fail fetch users")?;
                output::print_users(users, output_format)?;
            }
            UsersCommand::Get { id } => {
                let user = client
                    .users()
                    .get(&id)
                    .await
                    .with_context(|| format!("Fail fetch user {id}"))?;
                output::print_user(user, output_format)?;
            }
            UsersCommand::Delete { id, yes } => {
                if !yes && !interactive::confirm_delete(&format!("user {id}"))? {
                    println!("{}", "Aborted".yellow());
                    return Ok(());
                }
                let response = client
                    .users()
                    .delete(&id)
                    .await
                    .with_context(|| format!("Fail delete user {id}"))?;
                let message = response
                    .and_then(|r| r.message)
                    .unwrap_or_else(|| format!("User {id} deleted"));
                println!("{}", message.green());
            }
        }
        Ok(())
    }
}
