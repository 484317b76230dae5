use anyhow::{Context, Result};
use clap::Subcommand;
use roaya_client::Client;

use crate::{config::OutputFormat, output};

#[derive(Subcommand, Clone)]
pub enum PermissionsCommand {
    List,
    Get { id: String },
}

impl PermissionsCommand {
    pub async fn execute(self, client: &Client, output_format: OutputFormat) -> Result<()> {
        match self {
            PermissionsCommand::List => {
                let permissions = client
                    .permissions()
                    .list()
                    .await
                    .context("Fail fetch permissions")?;
                output::print_permissions(permissions, output_format)?;
            }
            PermissionsCommand::Get { id } => {
                let permission = client
                    .permissions()
                    .get(&id)
                    .await
                    .with_context(|| format!("Fail fetch permission {id}"))?;
                output::print_permission(permission, output_format)?;
            }
        }
        Ok(())
    }
}
