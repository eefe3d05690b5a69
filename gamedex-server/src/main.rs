//! gamedex CLI
//!
//! Serves search over a Flashpoint-style game database, or runs one-off
//! searches from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gamedex_lib::{ServerConfig, resolve_settings_path};
use gamedex_server::{ServerError, init_logging};

mod commands;

#[derive(Parser)]
#[command(name = "gamedex")]
#[command(about = "Search service for a Flashpoint-style game database", long_about = None)]
struct Cli {
    /// Config file (defaults to ./gamedex.toml, then the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind, overriding the config file (e.g., 0.0.0.0:8986)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Print the active search fields
    Fields,

    /// Run one search and print the JSON result
    Search {
        /// Query parameters as KEY=VALUE (e.g., title=mario any=true)
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

fn load_config(cli_override: Option<PathBuf>) -> Result<ServerConfig, ServerError> {
    let path = resolve_settings_path(cli_override)?;
    Ok(ServerConfig::load(&path)?)
}

fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = load_config(cli.config)?;
    init_logging(&config);

    match cli.command {
        Commands::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            commands::serve::run_serve(config)
        }
        Commands::Fields => commands::fields::run_fields(&config),
        Commands::Search { params } => commands::search::run_search(config, params),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
