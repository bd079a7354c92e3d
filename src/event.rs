use color_eyre::eyre::OptionExt;
use crossterm::event::Event as CrosstermEvent;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use crate::api::ApiClientError;
use crate::api::types::{
    AdvocacyStats, AdvocacySuggestion, EngagementDetail, EngagementRow, EngagementStats, Identity,
    Period, Post, PublishResult, ShareReceipt, SyncResult, SyncStatus,
};
use crate::slot::Generation;

/// Representation of all possible events.
#[derive(Clone, Debug)]
pub enum Event {
    /// An event that is emitted on a regular schedule.
    Tick,
    /// Crossterm events from the terminal.
    Crossterm(CrosstermEvent),
    /// Application-level events.
    App(Box<AppEvent>),
}

/// Application events sent from spawned tasks back to the event loop.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Quit,

    /// A backend call finished. `generation` is the stamp it was started
    /// with; the owning slot decides whether it is still current.
    Completed {
        generation: Generation,
        response: Response,
    },

    // -- Sign-in --
    LandingCaptured(Url),
    SignInFailed(String),
}

/// API result type using `Arc` so errors are `Clone`.
pub type ApiResult<T> = Result<T, Arc<ApiClientError>>;

/// A backend call the core wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Identity,
    Team { limit: u32 },
    Stats,
    Leaderboard { period: Period },
    Posts,
    PostDetail { post_id: String },
    Suggestions,
    AdvocacyStats,
    SyncStatus,
    Publish { text: String },
    Share { post_id: String, text: String },
    TriggerSync,
}

/// The outcome of a [`Request`], one variant per request kind.
#[derive(Debug, Clone)]
pub enum Response {
    Identity(ApiResult<Identity>),
    Team(ApiResult<Vec<EngagementRow>>),
    Stats(ApiResult<EngagementStats>),
    Leaderboard {
        period: Period,
        result: ApiResult<Vec<EngagementRow>>,
    },
    Posts(ApiResult<Vec<Post>>),
    PostDetail {
        post_id: String,
        result: ApiResult<EngagementDetail>,
    },
    Suggestions(ApiResult<Vec<AdvocacySuggestion>>),
    AdvocacyStats(ApiResult<AdvocacyStats>),
    SyncStatus(ApiResult<SyncStatus>),
    Published(ApiResult<PublishResult>),
    Shared {
        post_id: String,
        text: String,
        result: ApiResult<ShareReceipt>,
    },
    SyncTriggered(ApiResult<SyncResult>),
}

/// Side effects the core asks the shell to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue a backend call stamped with `generation`.
    Fetch {
        generation: Generation,
        request: Request,
    },
    /// Full-page navigation in the system browser.
    OpenUrl(String),
}

/// Terminal event handler.
///
/// Spawns a background task that emits tick and crossterm events, and exposes
/// an unbounded channel for application events.
#[derive(Debug)]
pub struct EventHandler {
    /// Event sender channel.
    sender: mpsc::UnboundedSender<Event>,
    /// Event receiver channel.
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Constructs a new instance of [`EventHandler`] and spawns the event task.
    pub fn new(tick_rate_fps: f64) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let actor = EventTask::new(sender.clone(), tick_rate_fps);
        tokio::spawn(async { actor.run().await });
        Self { sender, receiver }
    }

    /// Receives the next event, blocking until one is available.
    pub async fn next(&mut self) -> color_eyre::Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_eyre("Failed to receive event")
    }

    /// Queue an app event to be processed by the event loop.
    pub fn send(&self, app_event: AppEvent) {
        let _ = self.sender.send(Event::App(Box::new(app_event)));
    }

    /// Clone the underlying sender for use in spawned async tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

/// Background task that reads crossterm events and emits ticks.
struct EventTask {
    sender: mpsc::UnboundedSender<Event>,
    tick_rate: Duration,
}

impl EventTask {
    fn new(sender: mpsc::UnboundedSender<Event>, tick_rate_fps: f64) -> Self {
        let fps = if tick_rate_fps > 0.0 { tick_rate_fps } else { 30.0 };
        Self {
            sender,
            tick_rate: Duration::from_secs_f64(1.0 / fps),
        }
    }

    async fn run(self) -> color_eyre::Result<()> {
        let mut reader = crossterm::event::EventStream::new();
        let mut tick = tokio::time::interval(self.tick_rate);
        loop {
            let tick_delay = tick.tick();
            let crossterm_event = reader.next().fuse();
            tokio::select! {
                _ = self.sender.closed() => {
                    break;
                }
                _ = tick_delay => {
                    self.send(Event::Tick);
                }
                Some(Ok(evt)) = crossterm_event => {
                    self.send(Event::Crossterm(evt));
                }
            };
        }
        Ok(())
    }

    fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
