use anyhow::Context;
use colored::Colorize;
use kvgate_server::{KvGateServer, ServerConfig, StorageConfig};

use crate::cli::{Cli, Command, ConfigArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

async fn cmd_serve(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    tracing::info!(
        bind = %config.bind_addr,
        storage = ?config.storage,
        verify_url = %config.verify_url,
        "starting kvgate"
    );
    let server = KvGateServer::new(config).context("building server")?;
    server.serve().await.context("serving requests")
}

fn cmd_check_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    println!("{} Configuration is valid", "✓".green().bold());
    println!("  bind:        {}", config.bind_addr.to_string().bold());
    println!("  storage:     {}", describe_storage(&config.storage));
    println!("  verify url:  {}", config.verify_url);
    println!("  window:      {}ms", config.freshness_window_ms);
    println!("  chunk size:  {} chars", config.chunk_size);
    println!("  key set:     {}", yes_no(!config.key.is_empty()));
    Ok(())
}

/// File first, then flags and environment on top, then validation.
pub fn resolve_config(args: &ConfigArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = &args.data_dir {
        config.storage = StorageConfig::Fs { root: root.clone() };
    }
    if let Some(token) = &args.token {
        config.token = token.clone();
    }
    if let Some(key) = &args.key {
        config.key = key.clone();
    }
    if let Some(url) = &args.verify_url {
        config.verify_url = url.clone();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn describe_storage(storage: &StorageConfig) -> String {
    match storage {
        StorageConfig::Memory => "memory".yellow().to_string(),
        StorageConfig::Fs { root } => format!("fs ({})", root.display()),
    }
}

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag {
        "yes".green()
    } else {
        "no".red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_override_defaults() {
        let args = ConfigArgs {
            token: Some("s3cret".into()),
            data_dir: Some(PathBuf::from("/srv/kv")),
            bind: Some("0.0.0.0:1234".parse().unwrap()),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.token, "s3cret");
        assert_eq!(config.bind_addr.port(), 1234);
        assert_eq!(
            config.storage,
            StorageConfig::Fs {
                root: PathBuf::from("/srv/kv")
            }
        );
    }

    #[test]
    fn missing_secret_fails() {
        assert!(resolve_config(&ConfigArgs::default()).is_err());
    }

    #[test]
    fn missing_config_file_fails() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            token: Some("s".into()),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("here.toml"));
    }
}
