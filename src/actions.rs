//! Write operations: publish a post, record a share, trigger a sync.
//!
//! Each one is issued, awaited, and then either refreshes the read-side
//! datasets it affects (success) or leaves them alone and reports why
//! (failure). Local copies of read-side data are never patched directly.

use std::time::{Duration, Instant};

use crate::api::{ApiClientError, encode_component};
use crate::auth::AuthState;
use crate::event::{ApiResult, Effect, Request};
use crate::slot::{Generation, Tracker};
use crate::view::ViewController;

const SHARE_INTENT_URL: &str = "https://www.linkedin.com/sharing/share-offsite/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// A transient, dismissable notice about a write.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }
}

/// Build the error text: the backend's reason when present, else `fallback`.
fn failure_text(err: &ApiClientError, fallback: &str) -> String {
    err.reason().unwrap_or_else(|| fallback.to_string())
}

fn mock_suffix(mock_mode: bool) -> &'static str {
    if mock_mode { " (mock mode)" } else { "" }
}

/// Outbound share page with the post text pre-filled as the summary.
pub fn share_intent_url(target: &str, summary: &str) -> String {
    format!(
        "{SHARE_INTENT_URL}?url={}&summary={}",
        encode_component(target),
        encode_component(summary),
    )
}

#[derive(Debug)]
pub struct ActionDispatcher {
    /// Compose buffer for the publish tab.
    pub compose: String,
    message: Option<StatusMessage>,
    publish: Tracker,
    share: Tracker,
    sharing: Option<String>,
    sync: Tracker,
    share_target: String,
}

impl ActionDispatcher {
    pub fn new(share_target: impl Into<String>) -> Self {
        Self {
            compose: String::new(),
            message: None,
            publish: Tracker::default(),
            share: Tracker::default(),
            sharing: None,
            sync: Tracker::default(),
            share_target: share_target.into(),
        }
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Show a message that did not come from a write, e.g. a sign-in error.
    pub fn notify(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    /// Drop the message once it is older than `ttl`.
    pub fn expire_message(&mut self, now: Instant, ttl: Duration) {
        if self
            .message
            .as_ref()
            .is_some_and(|m| now.duration_since(m.shown_at) >= ttl)
        {
            self.message = None;
        }
    }

    pub fn is_publishing(&self) -> bool {
        self.publish.is_live()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_live()
    }

    /// Post id of the share being recorded, if any.
    pub fn sharing(&self) -> Option<&str> {
        self.sharing.as_deref()
    }

    /// Publish the compose buffer. Blank text is rejected without a request.
    pub fn publish(&mut self, auth: &AuthState) -> Vec<Effect> {
        let text = self.compose.trim();
        if !auth.is_authenticated() || text.is_empty() || self.publish.is_live() {
            return Vec::new();
        }
        let text = text.to_string();
        self.message = None;
        let generation = self.publish.start();
        vec![Effect::Fetch {
            generation,
            request: Request::Publish { text },
        }]
    }

    /// Record a share of `post_id`; `text` becomes the share summary.
    pub fn share(&mut self, post_id: &str, text: &str, auth: &AuthState) -> Vec<Effect> {
        if !auth.is_authenticated() || self.share.is_live() {
            return Vec::new();
        }
        self.message = None;
        self.sharing = Some(post_id.to_string());
        let generation = self.share.start();
        vec![Effect::Fetch {
            generation,
            request: Request::Share {
                post_id: post_id.to_string(),
                text: text.to_string(),
            },
        }]
    }

    /// Run a sync job and wait for its terminal result.
    pub fn trigger_sync(&mut self, auth: &AuthState) -> Vec<Effect> {
        if !auth.is_authenticated() || self.sync.is_live() {
            return Vec::new();
        }
        self.message = None;
        let generation = self.sync.start();
        vec![Effect::Fetch {
            generation,
            request: Request::TriggerSync,
        }]
    }

    pub fn on_published(
        &mut self,
        generation: Generation,
        result: ApiResult<crate::api::types::PublishResult>,
        view: &mut ViewController,
        auth: &AuthState,
    ) -> Vec<Effect> {
        if !self.publish.finish(generation) {
            return Vec::new();
        }
        match result {
            Ok(published) => {
                self.compose.clear();
                self.message = Some(StatusMessage::success(format!(
                    "Post published{}!",
                    mock_suffix(published.mock_mode)
                )));
                view.posts.invalidate();
                view.pending_fetches(auth)
            }
            Err(e) => {
                tracing::warn!("publish failed: {e}");
                self.message = Some(StatusMessage::error(failure_text(
                    &e,
                    "Failed to publish post",
                )));
                Vec::new()
            }
        }
    }

    pub fn on_shared(
        &mut self,
        generation: Generation,
        text: &str,
        result: ApiResult<crate::api::types::ShareReceipt>,
        view: &mut ViewController,
        auth: &AuthState,
    ) -> Vec<Effect> {
        if !self.share.finish(generation) {
            return Vec::new();
        }
        self.sharing = None;
        match result {
            Ok(_) => {
                self.message = Some(StatusMessage::success("Share recorded"));
                let mut effects = vec![Effect::OpenUrl(share_intent_url(&self.share_target, text))];
                view.suggestions.invalidate();
                view.advocacy_stats.invalidate();
                effects.extend(view.pending_fetches(auth));
                effects
            }
            Err(e) => {
                tracing::warn!("recording share failed: {e}");
                self.message = Some(StatusMessage::error(failure_text(
                    &e,
                    "Failed to record share",
                )));
                Vec::new()
            }
        }
    }

    pub fn on_sync_triggered(
        &mut self,
        generation: Generation,
        result: ApiResult<crate::api::types::SyncResult>,
        view: &mut ViewController,
        auth: &AuthState,
    ) -> Vec<Effect> {
        if !self.sync.finish(generation) {
            return Vec::new();
        }
        match result {
            Ok(done) => {
                self.message = Some(StatusMessage::success(format!(
                    "Sync complete: {} posts, {} engagements{}",
                    done.posts_processed,
                    done.engagements_found,
                    mock_suffix(done.mock_mode)
                )));
                view.sync_status.invalidate();
                view.pending_fetches(auth)
            }
            Err(e) => {
                tracing::warn!("sync failed: {e}");
                self.message = Some(StatusMessage::error(failure_text(&e, "Sync failed")));
                Vec::new()
            }
        }
    }

    /// Forget every in-flight write and the compose buffer.
    pub fn reset(&mut self) {
        self.publish.cancel();
        self.share.cancel();
        self.sync.cancel();
        self.sharing = None;
        self.compose.clear();
        self.message = None;
    }
}
