//! The dashboard core: authentication, views and actions behind one front.
//!
//! Every user intent and every backend completion enters here and comes back
//! out as a list of [`Effect`]s for the shell to run. Nothing in this module
//! performs I/O.

use url::Url;

use crate::actions::ActionDispatcher;
use crate::api::types::Period;
use crate::auth::{AuthController, AuthState};
use crate::event::{Effect, Response};
use crate::session::SessionStore;
use crate::slot::Generation;
use crate::view::{Tab, ViewController};

#[derive(Debug)]
pub struct Dashboard {
    pub auth: AuthController,
    pub view: ViewController,
    pub actions: ActionDispatcher,
}

impl Dashboard {
    pub fn new(
        session: SessionStore,
        logout_url: impl Into<String>,
        initial_tab: Tab,
        team_limit: u32,
        share_target: impl Into<String>,
    ) -> Self {
        Self {
            auth: AuthController::new(session, logout_url),
            view: ViewController::new(initial_tab, team_limit),
            actions: ActionDispatcher::new(share_target),
        }
    }

    pub fn auth_state(&self) -> &AuthState {
        self.auth.state()
    }

    /// Begin a session, consuming a credential from `landing` if present.
    ///
    /// Data fetched under a previous session is dropped.
    pub fn activate(&mut self, landing: Option<&Url>) -> (Option<Url>, Vec<Effect>) {
        self.view.teardown();
        self.actions.reset();
        self.auth.activate(landing)
    }

    pub fn select_tab(&mut self, tab: Tab) -> Vec<Effect> {
        self.view.select_tab(tab, self.auth.state())
    }

    pub fn select_period(&mut self, period: Period) -> Vec<Effect> {
        self.view.select_period(period, self.auth.state())
    }

    pub fn cycle_period(&mut self) -> Vec<Effect> {
        let next = self.view.period().next();
        self.select_period(next)
    }

    pub fn toggle_post(&mut self, post_id: &str) -> Vec<Effect> {
        self.view.toggle_post(post_id, self.auth.state())
    }

    pub fn refresh(&mut self) -> Vec<Effect> {
        self.view.refresh(self.auth.state())
    }

    pub fn publish(&mut self) -> Vec<Effect> {
        self.actions.publish(self.auth.state())
    }

    pub fn share(&mut self, post_id: &str) -> Vec<Effect> {
        let Some(suggestion) = self
            .view
            .suggestions
            .data()
            .and_then(|all| all.iter().find(|s| s.post_id == post_id))
        else {
            return Vec::new();
        };
        if suggestion.already_shared {
            return Vec::new();
        }
        let text = suggestion.text.clone();
        self.actions.share(post_id, &text, self.auth.state())
    }

    pub fn trigger_sync(&mut self) -> Vec<Effect> {
        self.actions.trigger_sync(self.auth.state())
    }

    /// Sign out. All in-flight work is abandoned and loaded data dropped.
    pub fn logout(&mut self) -> Vec<Effect> {
        self.view.teardown();
        self.actions.reset();
        self.auth.logout()
    }

    /// Feed a backend completion through whichever controller owns it.
    pub fn complete(&mut self, generation: Generation, response: Response) -> Vec<Effect> {
        match response {
            Response::Identity(result) => {
                if self.auth.on_identity(generation, result) {
                    self.view.pending_fetches(self.auth.state())
                } else {
                    Vec::new()
                }
            }
            Response::Published(result) => {
                self.actions
                    .on_published(generation, result, &mut self.view, self.auth.state())
            }
            Response::Shared { text, result, .. } => self.actions.on_shared(
                generation,
                &text,
                result,
                &mut self.view,
                self.auth.state(),
            ),
            Response::SyncTriggered(result) => {
                self.actions
                    .on_sync_triggered(generation, result, &mut self.view, self.auth.state())
            }
            read => {
                self.view.apply(generation, read);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClientError;
    use crate::api::types::{AdvocacySuggestion, EngagementStats, Identity};
    use crate::event::Request;
    use crate::session::Credential;

    fn dashboard(tab: Tab) -> Dashboard {
        Dashboard::new(
            SessionStore::in_memory(),
            "http://backend/auth/logout",
            tab,
            50,
            "https://www.linkedin.com",
        )
    }

    fn identity() -> Identity {
        serde_json::from_str(r#"{"sub":"u1","name":"Ann"}"#).unwrap()
    }

    fn take(effects: &[Effect], wanted: &Request) -> Generation {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Fetch {
                    generation,
                    request,
                } if request == wanted => Some(*generation),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no fetch for {wanted:?} in {effects:?}"))
    }

    fn requests(effects: &[Effect]) -> Vec<Request> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn signed_in(tab: Tab) -> (Dashboard, Vec<Effect>) {
        let mut dash = dashboard(tab);
        let landing = Url::parse("http://127.0.0.1:3004/dashboard?token=T").unwrap();
        let (_, effects) = dash.activate(Some(&landing));
        let g = take(&effects, &Request::Identity);
        let effects = dash.complete(g, Response::Identity(Ok(identity())));
        (dash, effects)
    }

    fn suggestion(id: &str, shared: bool) -> AdvocacySuggestion {
        serde_json::from_value(serde_json::json!({
            "postId": id,
            "text": format!("post {id}"),
            "alreadyShared": shared,
        }))
        .unwrap()
    }

    #[test]
    fn nothing_is_fetched_before_identity_resolves() {
        let mut dash = dashboard(Tab::Leaderboard);
        let (_, effects) = dash.activate(None);
        assert_eq!(requests(&effects), vec![Request::Identity]);

        for tab in Tab::ALL {
            assert!(dash.select_tab(tab).is_empty());
        }
        assert!(dash.cycle_period().is_empty());
        assert!(dash.refresh().is_empty());
        assert!(dash.trigger_sync().is_empty());
    }

    #[test]
    fn unauthenticated_identity_loads_nothing() {
        let mut dash = dashboard(Tab::Posts);
        let (_, effects) = dash.activate(None);
        let g = take(&effects, &Request::Identity);
        let err = Arc::new(ApiClientError::Status {
            status: 401,
            body: String::new(),
        });
        assert!(dash.complete(g, Response::Identity(Err(err))).is_empty());
        assert_eq!(dash.auth_state(), &AuthState::Unauthenticated);
        assert!(dash.select_tab(Tab::Advocacy).is_empty());
    }

    #[test]
    fn identity_success_loads_active_tab() {
        let (dash, effects) = signed_in(Tab::Posts);
        assert!(dash.auth_state().is_authenticated());
        assert_eq!(requests(&effects), vec![Request::Stats, Request::Posts]);
        assert_eq!(
            dash.auth.session().current_credential(),
            Some(Credential::new("T"))
        );
    }

    #[test]
    fn period_cycle_walks_the_leaderboard() {
        let (mut dash, _) = signed_in(Tab::Leaderboard);
        let effects = dash.cycle_period();
        assert_eq!(
            requests(&effects),
            vec![Request::Leaderboard {
                period: Period::Quarter
            }]
        );
    }

    #[test]
    fn already_shared_suggestion_is_not_shared_again() {
        let (mut dash, effects) = signed_in(Tab::Advocacy);
        let g = take(&effects, &Request::Suggestions);
        dash.complete(
            g,
            Response::Suggestions(Ok(vec![suggestion("a", true), suggestion("b", false)])),
        );

        assert!(dash.share("a").is_empty());
        assert!(dash.share("missing").is_empty());
        assert_eq!(
            requests(&dash.share("b")),
            vec![Request::Share {
                post_id: "b".into(),
                text: "post b".into()
            }]
        );
    }

    #[test]
    fn logout_drops_everything_in_flight() {
        let (mut dash, effects) = signed_in(Tab::Leaderboard);
        let stats = take(&effects, &Request::Stats);
        let out = dash.logout();
        assert_eq!(
            out,
            vec![Effect::OpenUrl("http://backend/auth/logout".into())]
        );
        assert!(dash.auth.session().current_credential().is_none());

        dash.complete(stats, Response::Stats(Ok(EngagementStats::default())));
        assert!(dash.view.stats.data().is_none());
        assert!(dash.select_tab(Tab::Posts).is_empty());
    }

    #[test]
    fn write_completion_is_routed_to_actions() {
        let (mut dash, _) = signed_in(Tab::Publish);
        dash.actions.compose = "hello".into();
        let effects = dash.publish();
        let g = take(
            &effects,
            &Request::Publish {
                text: "hello".into(),
            },
        );
        dash.complete(g, Response::Published(Ok(Default::default())));
        assert_eq!(dash.actions.message().unwrap().text, "Post published!");
    }
}
