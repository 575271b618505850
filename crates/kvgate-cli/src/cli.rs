use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kvgate",
    about = "Token-gated HTTP front end for a key-value blob store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ConfigArgs),
    /// Load and validate configuration, then print it without secrets
    CheckConfig(ConfigArgs),
}

/// Configuration sources. Flags and environment override the file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "KVGATE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Store entries under this directory instead of in memory
    #[arg(long, env = "KVGATE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Shared secret every verified token must carry
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Key used when asking the verification service to decrypt tokens
    #[arg(long, env = "KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Verification service endpoint
    #[arg(long, env = "KVGATE_VERIFY_URL")]
    pub verify_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "kvgate",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--data-dir",
            "/tmp/kv",
            "--token",
            "s",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.unwrap().port(), 9000);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/kv")));
        assert_eq!(args.token.as_deref(), Some("s"));
    }
}
