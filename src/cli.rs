use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, eyre};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::actions::share_intent_url;
use crate::api::ApiClient;
use crate::api::types::{EngagementRow, Period};
use crate::auth::callback::await_landing;
use crate::auth::capture_credential;
use crate::config::AppConfig;
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "engagetui", about = "TUI and CLI for the engagement dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui {
        /// Landing URL from a completed sign-in (may carry ?token=)
        #[arg(long)]
        landing_url: Option<Url>,
    },
    /// Sign in through the browser and store the credential
    Login,
    /// Forget the stored credential
    Logout,
    /// Show the signed-in identity (JSONL)
    Whoami,
    /// List team members with engagement counters (JSONL)
    Users {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show your engagement stats (JSONL)
    Stats,
    /// Show the engagement leaderboard (JSONL)
    Leaderboard {
        /// all, quarter, month or week
        #[arg(long, default_value = "all", value_parser = parse_period)]
        period: Period,
    },
    /// List the company post feed (JSONL)
    Posts,
    /// Show engagement detail for one post (JSONL)
    Engagements {
        post_id: String,
    },
    /// List posts suggested for sharing (JSONL)
    Suggestions,
    /// Show advocacy counters and top advocates (JSONL)
    #[command(name = "advocacy-stats")]
    AdvocacyStats,
    /// Show sync history (JSONL)
    #[command(name = "sync-status")]
    SyncStatus,
    /// Run a sync job and wait for it to finish
    Sync,
    /// Publish a post
    Publish {
        text: String,
    },
    /// Record a share of a suggested post and print the share link
    Share {
        post_id: String,
    },
}

fn parse_period(s: &str) -> Result<Period, String> {
    Period::ALL
        .into_iter()
        .find(|p| p.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown period '{s}' (expected all, quarter, month or week)"))
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_line<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print ranked rows as JSONL, each with its 1-based rank and avatar URL.
fn print_rows(client: &ApiClient, rows: &[EngagementRow]) -> eyre::Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        print_line(&serde_json::json!({
            "rank": idx + 1,
            "row": row,
            "total": row.total(),
            "avatar": client.avatar_url(&row.sub),
        }))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Client construction (shared with main.rs TUI path)
// ---------------------------------------------------------------------------

/// Build an `ApiClient` against the configured backend with the stored
/// session.
pub fn build_api_client(config: &AppConfig) -> eyre::Result<ApiClient> {
    let base = Url::parse(&config.api_base)
        .map_err(|e| eyre!("invalid api_base '{}': {e}", config.api_base))?;
    Ok(ApiClient::new(base, SessionStore::open_default()))
}

fn require_session(client: &ApiClient) -> eyre::Result<()> {
    if client.session().current_credential().is_none() {
        return Err(eyre!("not signed in; run `engagetui login` first"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Browser sign-in: open the backend's login page and wait for the landing
/// redirect on the local callback port.
pub async fn run_login(config: &AppConfig) -> eyre::Result<()> {
    let client = build_api_client(config)?;
    let login = client.login_url();

    eprintln!("Opening {login} in your browser...");
    eprintln!(
        "Waiting for the redirect on http://127.0.0.1:{}/ (Ctrl-C to abort)",
        config.callback_port
    );
    if let Err(e) = open::that(&login) {
        eprintln!("Could not open a browser ({e}); visit the URL above manually.");
    }

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.cancel();
        }
    });

    let landing = await_landing(config.callback_port, cancel)
        .await
        .map_err(|e| eyre!("{e}"))?;
    let (credential, _) =
        capture_credential(&landing).ok_or_else(|| eyre!("landing URL carried no token"))?;
    client.session().set_credential(credential);

    let identity = client.get_identity().await.map_err(|e| eyre!("{e}"))?;
    eprintln!("Signed in as {}.", identity.display_name());
    Ok(())
}

pub async fn run_command(cmd: CliCommand, config: &AppConfig) -> eyre::Result<()> {
    let client = build_api_client(config)?;

    match cmd {
        CliCommand::Tui { .. } | CliCommand::Login => {
            unreachable!("tui and login are handled in main")
        }

        CliCommand::Logout => {
            client.session().clear_credential();
            eprintln!("Signed out locally. End the backend session at {}", client.logout_url());
        }

        CliCommand::Whoami => {
            require_session(&client)?;
            let identity = client.get_identity().await.map_err(|e| eyre!("{e}"))?;
            print_line(&serde_json::json!({
                "identity": identity,
                "avatar": client.avatar_url(&identity.sub),
            }))?;
        }

        CliCommand::Users { limit } => {
            require_session(&client)?;
            let rows = client
                .get_team(limit.unwrap_or(config.team_limit))
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_rows(&client, &rows)?;
        }

        CliCommand::Stats => {
            require_session(&client)?;
            let stats = client
                .get_engagement_stats()
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_line(&stats)?;
        }

        CliCommand::Leaderboard { period } => {
            require_session(&client)?;
            let rows = client
                .get_leaderboard(period)
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_rows(&client, &rows)?;
        }

        CliCommand::Posts => {
            require_session(&client)?;
            let posts = client.get_posts().await.map_err(|e| eyre!("{e}"))?;
            for post in &posts {
                print_line(post)?;
            }
        }

        CliCommand::Engagements { post_id } => {
            require_session(&client)?;
            let detail = client
                .get_post_engagements(&post_id)
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_line(&detail)?;
        }

        CliCommand::Suggestions => {
            require_session(&client)?;
            let suggestions = client
                .get_advocacy_suggestions()
                .await
                .map_err(|e| eyre!("{e}"))?;
            for suggestion in &suggestions {
                print_line(suggestion)?;
            }
        }

        CliCommand::AdvocacyStats => {
            require_session(&client)?;
            let stats = client
                .get_advocacy_stats()
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_line(&stats)?;
        }

        CliCommand::SyncStatus => {
            require_session(&client)?;
            let status = client.get_sync_status().await.map_err(|e| eyre!("{e}"))?;
            print_line(&status)?;
        }

        CliCommand::Sync => {
            require_session(&client)?;
            let result = client.trigger_sync().await.map_err(|e| {
                eyre!("{}", e.reason().unwrap_or_else(|| "Sync failed".to_string()))
            })?;
            print_line(&result)?;
        }

        CliCommand::Publish { text } => {
            require_session(&client)?;
            let text = text.trim();
            if text.is_empty() {
                return Err(eyre!("post text is empty"));
            }
            let result = client.publish_post(text).await.map_err(|e| {
                eyre!(
                    "{}",
                    e.reason()
                        .unwrap_or_else(|| "Failed to publish post".to_string())
                )
            })?;
            print_line(&result)?;
        }

        CliCommand::Share { post_id } => {
            require_session(&client)?;
            let suggestions = client
                .get_advocacy_suggestions()
                .await
                .map_err(|e| eyre!("{e}"))?;
            let suggestion = suggestions
                .iter()
                .find(|s| s.post_id == post_id)
                .ok_or_else(|| eyre!("post {post_id} is not in the share suggestions"))?;
            if suggestion.already_shared {
                return Err(eyre!("post {post_id} was already shared"));
            }
            client
                .record_share(&post_id)
                .await
                .map_err(|e| eyre!("{e}"))?;
            print_line(&serde_json::json!({
                "postId": post_id,
                "shareUrl": share_intent_url(&config.share_target_url, &suggestion.text),
            }))?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
