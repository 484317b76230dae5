use anyhow::{Context, Result};
use colored::Colorize;
use roaya_client::Client;

use crate::{config::OutputFormat, interactive, output};

pub async fn login(client: &Client, email: Option<String>, format: OutputFormat) -> Result<()> {
    let credentials = interactive::prompt_credentials(email)?;
    let response = client
        .auth()
        .login(&credentials)
        .await
        .context("Fail log in")?;
    output::print_admin(&response.admin, format)
}

pub fn logout(client: &Client) -> Result<()> {
    client.auth().logout().context("Fail clear stored token")?;
    println!("{}", "Logged out".green());
    Ok(())
}
