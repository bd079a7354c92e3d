use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::actions::MessageKind;
use crate::api::ApiClient;
use crate::auth::callback::{CallbackError, await_landing};
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::event::{AppEvent, Effect, Event, EventHandler, Request, Response};
use crate::slot::Generation;
use crate::ui;
use crate::view::Tab;

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    /// Typing into the publish composer.
    Compose,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,
    pub mode: AppMode,
    pub show_help: bool,

    pub dashboard: Dashboard,
    pub api_client: Arc<ApiClient>,

    /// Landing URL handed over on the command line, consumed at startup.
    landing: Option<Url>,
    /// Running sign-in listener, if any.
    sign_in: Option<CancellationToken>,

    /// Selected row per tab, indexed by [`Tab::index`].
    selection: [usize; 4],
}

impl App {
    pub fn new(config: AppConfig, api_client: ApiClient, landing: Option<Url>) -> Self {
        let dashboard = Dashboard::new(
            api_client.session().clone(),
            api_client.logout_url(),
            config.default_tab,
            config.team_limit,
            config.share_target_url.clone(),
        );

        Self {
            running: true,
            events: EventHandler::new(config.tick_rate_fps),
            config,
            mode: AppMode::Normal,
            show_help: false,
            dashboard,
            api_client: Arc::new(api_client),
            landing,
            sign_in: None,
            selection: [0; 4],
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let landing = self.landing.take();
        self.activate(landing.as_ref());

        while self.running {
            terminal.draw(|frame| ui::draw(frame, &self))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key) = event
                        && key.kind == crossterm::event::KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Event::App(app_event) => self.handle_app_event(*app_event),
            }
        }

        if let Some(token) = self.sign_in.take() {
            token.cancel();
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.dashboard
            .actions
            .expire_message(Instant::now(), self.config.message_ttl());
    }

    fn activate(&mut self, landing: Option<&Url>) {
        self.selection = [0; 4];
        let (stripped, effects) = self.dashboard.activate(landing);
        if let Some(location) = stripped {
            tracing::info!(%location, "signed-in landing");
        }
        self.run_effects(effects);
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.events.send(AppEvent::Quit);
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')) {
                self.show_help = false;
            }
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Compose => self.handle_compose_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let tab = self.dashboard.view.active_tab();
        match key.code {
            KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            KeyCode::Esc => self.dashboard.actions.dismiss_message(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('l') => self.start_sign_in(),
            KeyCode::Char('L') => {
                let effects = self.dashboard.logout();
                self.selection = [0; 4];
                self.run_effects(effects);
            }
            _ if !self.dashboard.auth_state().is_authenticated() => {}

            KeyCode::Tab => self.select_tab(tab.next()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                self.select_tab(Tab::ALL[idx]);
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Char('r') => {
                let effects = self.dashboard.refresh();
                self.run_effects(effects);
            }
            KeyCode::Char('p') if tab == Tab::Leaderboard => {
                self.selection[tab.index()] = 0;
                let effects = self.dashboard.cycle_period();
                self.run_effects(effects);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.open_selected(),
            KeyCode::Char('d') if tab == Tab::Posts => {
                self.dashboard.view.drilldown.toggle_fields();
            }
            KeyCode::Char('i') => {
                if tab != Tab::Publish {
                    self.select_tab(Tab::Publish);
                }
                self.mode = AppMode::Compose;
            }
            KeyCode::Char('S') if tab == Tab::Publish => {
                let effects = self.dashboard.trigger_sync();
                self.run_effects(effects);
            }
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = AppMode::Normal,
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.dashboard.actions.compose.push('\n');
            }
            KeyCode::Enter => {
                let effects = self.dashboard.publish();
                if !effects.is_empty() {
                    self.mode = AppMode::Normal;
                }
                self.run_effects(effects);
            }
            KeyCode::Backspace => {
                self.dashboard.actions.compose.pop();
            }
            KeyCode::Char(c) => self.dashboard.actions.compose.push(c),
            _ => {}
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        let effects = self.dashboard.select_tab(tab);
        self.run_effects(effects);
    }

    // -- Selection helpers --------------------------------------------------

    pub fn selected_index(&self) -> usize {
        let tab = self.dashboard.view.active_tab();
        let count = self.current_item_count();
        self.selection[tab.index()].min(count.saturating_sub(1))
    }

    fn current_item_count(&self) -> usize {
        let view = &self.dashboard.view;
        match view.active_tab() {
            Tab::Leaderboard => view.leaderboard.data().map_or(0, Vec::len),
            Tab::Posts => view.posts.data().map_or(0, Vec::len),
            Tab::Publish => 0,
            Tab::Advocacy => view.suggestions.data().map_or(0, Vec::len),
        }
    }

    fn move_selection_down(&mut self) {
        let count = self.current_item_count();
        let idx = self.selected_index();
        if idx + 1 < count {
            self.selection[self.dashboard.view.active_tab().index()] = idx + 1;
        }
    }

    fn move_selection_up(&mut self) {
        let idx = self.selected_index();
        self.selection[self.dashboard.view.active_tab().index()] = idx.saturating_sub(1);
    }

    fn open_selected(&mut self) {
        let idx = self.selected_index();
        let view = &self.dashboard.view;
        let effects = match view.active_tab() {
            Tab::Posts => {
                let Some(post_id) = view.posts.data().and_then(|p| p.get(idx)).map(|p| p.post_id.clone())
                else {
                    return;
                };
                self.dashboard.toggle_post(&post_id)
            }
            Tab::Advocacy => {
                let Some(post_id) = view
                    .suggestions
                    .data()
                    .and_then(|s| s.get(idx))
                    .map(|s| s.post_id.clone())
                else {
                    return;
                };
                self.dashboard.share(&post_id)
            }
            Tab::Leaderboard | Tab::Publish => return,
        };
        self.run_effects(effects);
    }

    // -- Sign-in ------------------------------------------------------------

    pub fn signing_in(&self) -> bool {
        self.sign_in.is_some()
    }

    /// Open the backend sign-in page and wait for its redirect locally.
    fn start_sign_in(&mut self) {
        if let Some(previous) = self.sign_in.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.sign_in = Some(token.clone());

        let port = self.config.callback_port;
        let sender = self.events.sender();
        tokio::spawn(async move {
            let event = match await_landing(port, token).await {
                Ok(url) => AppEvent::LandingCaptured(url),
                Err(CallbackError::Cancelled) => return,
                Err(e) => AppEvent::SignInFailed(e.to_string()),
            };
            let _ = sender.send(Event::App(Box::new(event)));
        });

        let login = self.api_client.login_url();
        if let Err(e) = open::that(&login) {
            tracing::warn!("failed to open browser: {e}");
            self.dashboard
                .actions
                .notify(MessageKind::Error, format!("Open {login} to sign in"));
        }
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::Completed {
                generation,
                response,
            } => {
                let effects = self.dashboard.complete(generation, response);
                self.run_effects(effects);
            }
            AppEvent::LandingCaptured(url) => {
                self.sign_in = None;
                self.activate(Some(&url));
            }
            AppEvent::SignInFailed(reason) => {
                self.sign_in = None;
                self.dashboard.actions.notify(MessageKind::Error, reason);
            }
        }
    }

    // -- Effects ------------------------------------------------------------

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch {
                    generation,
                    request,
                } => self.dispatch_api_request(generation, request),
                Effect::OpenUrl(url) => {
                    if let Err(e) = open::that(&url) {
                        tracing::warn!(%url, "failed to open browser: {e}");
                    }
                }
            }
        }
    }

    fn dispatch_api_request(&self, generation: Generation, request: Request) {
        let client = Arc::clone(&self.api_client);
        let sender = self.events.sender();

        tokio::spawn(async move {
            let response = execute(&client, request).await;
            let _ = sender.send(Event::App(Box::new(AppEvent::Completed {
                generation,
                response,
            })));
        });
    }
}

/// Perform one backend call and wrap its outcome.
pub async fn execute(client: &ApiClient, request: Request) -> Response {
    match request {
        Request::Identity => Response::Identity(client.get_identity().await.map_err(Arc::new)),
        Request::Team { limit } => Response::Team(client.get_team(limit).await.map_err(Arc::new)),
        Request::Stats => {
            Response::Stats(client.get_engagement_stats().await.map_err(Arc::new))
        }
        Request::Leaderboard { period } => Response::Leaderboard {
            period,
            result: client.get_leaderboard(period).await.map_err(Arc::new),
        },
        Request::Posts => Response::Posts(client.get_posts().await.map_err(Arc::new)),
        Request::PostDetail { post_id } => {
            let result = client.get_post_engagements(&post_id).await.map_err(Arc::new);
            Response::PostDetail { post_id, result }
        }
        Request::Suggestions => {
            Response::Suggestions(client.get_advocacy_suggestions().await.map_err(Arc::new))
        }
        Request::AdvocacyStats => {
            Response::AdvocacyStats(client.get_advocacy_stats().await.map_err(Arc::new))
        }
        Request::SyncStatus => {
            Response::SyncStatus(client.get_sync_status().await.map_err(Arc::new))
        }
        Request::Publish { text } => {
            Response::Published(client.publish_post(&text).await.map_err(Arc::new))
        }
        Request::Share { post_id, text } => {
            let result = client.record_share(&post_id).await.map_err(Arc::new);
            Response::Shared {
                post_id,
                text,
                result,
            }
        }
        Request::TriggerSync => {
            Response::SyncTriggered(client.trigger_sync().await.map_err(Arc::new))
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::types::Period;
    use crate::session::SessionStore;

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory())
    }

    #[tokio::test]
    async fn leaderboard_response_carries_its_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/engagement/leaderboard"))
            .and(query_param("period", "week"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"sub": "a"}])),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = execute(
            &client,
            Request::Leaderboard {
                period: Period::Week,
            },
        )
        .await;
        match response {
            Response::Leaderboard { period, result } => {
                assert_eq!(period, Period::Week);
                assert_eq!(result.unwrap()[0].sub, "a");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn share_response_keeps_text_for_the_intent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/advocacy/share"))
            .and(body_json(serde_json::json!({"postId": "p9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = execute(
            &client,
            Request::Share {
                post_id: "p9".into(),
                text: "Read this".into(),
            },
        )
        .await;
        match response {
            Response::Shared {
                post_id,
                text,
                result,
            } => {
                assert_eq!(post_id, "p9");
                assert_eq!(text, "Read this");
                assert!(result.is_ok());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_call_becomes_error_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        match execute(&client, Request::Identity).await {
            Response::Identity(Err(e)) => assert_eq!(e.status(), Some(401)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
