pub mod actions;
pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod drilldown;
pub mod event;
pub mod session;
pub mod slot;
pub mod ui;
pub mod view;

use app::App;
use clap::Parser;
use cli::{Cli, CliCommand};
use config::{AppConfig, load_config};
use url::Url;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr; set RUST_LOG to see them.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command {
        None => run_tui(config, None).await,
        Some(CliCommand::Tui { landing_url }) => run_tui(config, landing_url).await,
        Some(CliCommand::Login) => cli::run_login(&config).await,
        // All other subcommands are non-interactive.
        Some(cmd) => cli::run_command(cmd, &config).await,
    }
}

/// Launch the interactive TUI.
async fn run_tui(config: AppConfig, landing_url: Option<Url>) -> color_eyre::Result<()> {
    let api_client = cli::build_api_client(&config)?;
    tracing::info!(base = %api_client.base_url(), "starting dashboard");

    let terminal = ratatui::init();
    let result = App::new(config, api_client, landing_url).run(terminal).await;
    ratatui::restore();
    result
}
