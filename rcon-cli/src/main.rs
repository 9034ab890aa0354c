//! rcon-cli entry point.
//!
//! ```text
//! rcon-cli status                   Run one command and print the reply
//! rcon-cli status "bot_add_ct"      Run several, in order
//! echo status | rcon-cli            Read commands from stdin
//! rcon-cli --config <path>          Load a custom config TOML
//! rcon-cli --gen-config             Write default config to stdout
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rcon_cli::config::CliConfig;
use rcon_cli::console;
use rcon_core::{AuthOutcome, RconError, Session};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rcon-cli", version, about = "Remote console client for game servers")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rcon-cli.toml")]
    config: PathBuf,

    /// Server host; overrides the config file.
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Server RCON port; overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// RCON password; overrides the config file.
    #[arg(long, env = "RCON_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    /// Commands to run. Read from stdin when none are given.
    commands: Vec<String>,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        return match CliConfig::default_toml() {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    // Load config.
    let mut config = match CliConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_overrides(cli.host, cli.port, cli.password);

    // Init tracing. Responses go to stdout, logs to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("rcon-cli v{}", env!("CARGO_PKG_VERSION"));

    match run(&config, &cli.commands).await {
        Ok(count) => {
            info!(count, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Connect, authenticate and run the commands. The session is closed on
/// every path once it exists.
async fn run(config: &CliConfig, commands: &[String]) -> rcon_core::Result<usize> {
    let password = config.require_password()?;
    let mut session = Session::new(config.to_session_config()?);

    let result: rcon_core::Result<usize> = async {
        session.connect().await?;
        match session.authenticate(password).await? {
            AuthOutcome::Accepted => {}
            AuthOutcome::Unconfirmed { .. } => return Err(RconError::AuthFailed),
        }

        let mut stdout = tokio::io::stdout();
        if commands.is_empty() {
            let stdin = BufReader::new(tokio::io::stdin());
            console::run_lines(&mut session, stdin, &mut stdout).await
        } else {
            console::run_commands(&mut session, commands, &mut stdout).await
        }
    }
    .await;

    session.close().await;
    result
}
