//! Typed backend payloads.
//!
//! Every optional field carries a serde default so a sparse payload decodes
//! to zero/empty values instead of failing at the call site:
//! counters default to `0`, strings to `""`, flags to `false`, lists to
//! empty and timestamps to `None`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The signed-in user, as returned by `GET /api/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, alias = "emailVerified")]
    pub email_verified: bool,
}

impl Identity {
    /// Display name, falling back to given + family name.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Engagement rows and counters
// ---------------------------------------------------------------------------

/// Per-user reaction/comment counters, used by the team list and the
/// leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRow {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, rename = "reactions")]
    pub reaction_count: u64,
    #[serde(default, rename = "comments")]
    pub comment_count: u64,
    #[serde(default, rename = "emailVerified")]
    pub email_verified: bool,
}

impl EngagementRow {
    pub fn total(&self) -> u64 {
        self.reaction_count + self.comment_count
    }
}

/// Summary counters shown in the profile header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementStats {
    #[serde(default, alias = "totalReactions")]
    pub reactions: u64,
    #[serde(default, alias = "totalComments")]
    pub comments: u64,
    #[serde(default, alias = "totalPosts")]
    pub posts: u64,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// Leaderboard time window. Each period's ranking comes from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Quarter,
    Month,
    Week,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::All, Period::Quarter, Period::Month, Period::Week];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Quarter => "quarter",
            Period::Month => "month",
            Period::Week => "week",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::All => "All Time",
            Period::Quarter => "Quarter",
            Period::Month => "Month",
            Period::Week => "Week",
        }
    }

    /// The next period in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reaction_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub source: String,
}

impl Post {
    /// Whether the post was published from this dashboard rather than synced.
    pub fn is_published_here(&self) -> bool {
        self.source == "published"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementType {
    Reaction,
    Comment,
    #[default]
    #[serde(other)]
    Other,
}

/// One member's reaction or comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub engagement_type: EngagementType,
    #[serde(default)]
    pub reaction_type: Option<String>,
    #[serde(default)]
    pub engaged_at: Option<DateTime<Utc>>,
}

impl Engagement {
    /// Badge text: the reaction kind (defaulting to `LIKE`) or `COMMENT`.
    pub fn label(&self) -> &str {
        match self.engagement_type {
            EngagementType::Reaction => self.reaction_type.as_deref().unwrap_or("LIKE"),
            EngagementType::Comment => "COMMENT",
            EngagementType::Other => "OTHER",
        }
    }
}

/// A member data field the backend is permitted to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibleField {
    pub field: String,
    #[serde(default)]
    pub description: String,
}

/// Detailed engagement records for a single post.
///
/// `Default` is the empty-but-valid detail shown when the fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementDetail {
    #[serde(default)]
    pub engagements: Vec<Engagement>,
    #[serde(default)]
    pub accessible_fields: Vec<AccessibleField>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub mock_mode: bool,
}

// ---------------------------------------------------------------------------
// Advocacy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocacySuggestion {
    pub post_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_shares: u64,
    #[serde(default)]
    pub already_shared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAdvocate {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub share_count: u64,
}

/// Aggregate share counters. `top_advocates` arrives ranked by share count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocacyStats {
    #[serde(default)]
    pub total_shares: u64,
    #[serde(default)]
    pub active_advocates: u64,
    #[serde(default)]
    pub posts_available: u64,
    #[serde(default)]
    pub top_advocates: Vec<TopAdvocate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest<'a> {
    pub post_id: &'a str,
}

/// Acknowledgement of a recorded share. The body carries nothing the client
/// depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareReceipt {
    #[serde(default)]
    pub success: Option<bool>,
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Sync log ids are numeric on some backends and strings on others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogId {
    Number(i64),
    Text(String),
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogId::Number(n) => write!(f, "{n}"),
            LogId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Success,
    Failure,
    Running,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    pub id: LogId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub posts_processed: u64,
    #[serde(default)]
    pub engagements_found: u64,
}

impl SyncLog {
    pub fn state(&self) -> SyncState {
        match self.status.as_str() {
            "SUCCESS" => SyncState::Success,
            "FAILURE" => SyncState::Failure,
            "RUNNING" => SyncState::Running,
            _ => SyncState::Other,
        }
    }
}

/// Sync history, newest first, plus the backend's mock-mode flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    #[serde(default)]
    pub logs: Vec<SyncLog>,
    #[serde(default)]
    pub mock_mode: bool,
}

impl SyncStatus {
    pub fn last_sync(&self) -> Option<&SyncLog> {
        self.logs.first()
    }

    /// Up to four runs preceding the last one.
    pub fn earlier(&self) -> impl Iterator<Item = &SyncLog> {
        self.logs.iter().skip(1).take(4)
    }
}

/// Terminal result of a triggered sync job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    #[serde(default)]
    pub posts_processed: u64,
    #[serde(default)]
    pub engagements_found: u64,
    #[serde(default)]
    pub mock_mode: bool,
}

/// Error body the backend sends with failed writes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
