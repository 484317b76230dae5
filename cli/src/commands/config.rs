use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::{load_config, save_config, OutputFormat};

#[derive(Subcommand, Clone)]
pub enum ConfigCommand {
    Show,
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
    Get {
        #[arg(value_enum)]
        key: ConfigKey,
    },
}

#[derive(clap::ValueEnum, Clone)]
pub enum ConfigKey {
    ServerUrl,
    OutputFormat,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let cfg = load_config()?;
                println!("{}", "Current configuration:".blue().bold());
                println!("  server_url: {}", cfg.server_url);
                println!("  output_format: {:?}", cfg.output_format);
                println!(
                    "  token: {}",
                    if cfg.token.is_some() { "stored" } else { "none" }
                );
            }
            ConfigCommand::Set { key, value } => {
                let mut cfg = load_config()?;
                match key {
                    ConfigKey::ServerUrl => {
                        cfg.server_url = value.trim_end_matches('/').to_string();
                        println!("{} server_url = {}", "Set".green(), cfg.server_url);
                    }
                    ConfigKey::OutputFormat => {
                        cfg.output_format = parse_output_format(&value)?;
                        println!("{} output_format = {}", "Set".green(), value);
                    }
                }
                save_config(&cfg)?;
            }
            ConfigCommand::Get { key } => {
                let cfg = load_config()?;
                match key {
                    ConfigKey::ServerUrl => println!("{}", cfg.server_url),
                    ConfigKey::OutputFormat => println!("{:?}", cfg.output_format),
                }
            }
        }
        Ok(())
    }
}

pub fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        _ => anyhow::bail!("Invalid output format. Use 'table' or 'json'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_output_format("table").unwrap(), OutputFormat::Table);
        assert!(parse_output_format("yaml").is_err());
    }
}
