//! Tab selection and the lazily loaded dataset behind each tab.
//!
//! A dataset is fetched only while the client is authenticated, its tab is
//! active, and it is not loaded yet (or its parameter changed). Leaving a
//! tab abandons that tab's in-flight fetches but keeps whatever had already
//! loaded, so coming back shows it without a new request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::types::{
    AdvocacyStats, AdvocacySuggestion, EngagementRow, EngagementStats, Period, Post, SyncStatus,
};
use crate::auth::AuthState;
use crate::drilldown::DrillDown;
use crate::event::{Effect, Request, Response};
use crate::slot::{Generation, Slot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Leaderboard,
    Posts,
    Publish,
    Advocacy,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Leaderboard, Tab::Posts, Tab::Publish, Tab::Advocacy];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Leaderboard => "Leaderboard",
            Tab::Posts => "Posts",
            Tab::Publish => "Publish",
            Tab::Advocacy => "Advocacy",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Leaderboard => 0,
            Tab::Posts => 1,
            Tab::Publish => 2,
            Tab::Advocacy => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Owns the active tab and every read-side dataset.
#[derive(Debug)]
pub struct ViewController {
    active: Tab,
    period: Period,
    team_limit: u32,

    // Header, loaded on any tab.
    pub stats: Slot<(), EngagementStats>,

    // Leaderboard tab.
    pub leaderboard: Slot<Period, Vec<EngagementRow>>,
    pub team: Slot<(), Vec<EngagementRow>>,

    // Posts tab.
    pub posts: Slot<(), Vec<Post>>,
    pub drilldown: DrillDown,

    // Publish tab.
    pub sync_status: Slot<(), SyncStatus>,

    // Advocacy tab.
    pub suggestions: Slot<(), Vec<AdvocacySuggestion>>,
    pub advocacy_stats: Slot<(), AdvocacyStats>,
}

fn fetch(generation: Generation, request: Request) -> Effect {
    Effect::Fetch {
        generation,
        request,
    }
}

impl ViewController {
    pub fn new(initial: Tab, team_limit: u32) -> Self {
        Self {
            active: initial,
            period: Period::default(),
            team_limit,
            stats: Slot::default(),
            leaderboard: Slot::default(),
            team: Slot::default(),
            posts: Slot::default(),
            drilldown: DrillDown::default(),
            sync_status: Slot::default(),
            suggestions: Slot::default(),
            advocacy_stats: Slot::default(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Start every fetch the current state calls for.
    pub fn pending_fetches(&mut self, auth: &AuthState) -> Vec<Effect> {
        if !auth.is_authenticated() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.stats.needs_load(&()) {
            effects.push(fetch(self.stats.begin(()), Request::Stats));
        }

        match self.active {
            Tab::Leaderboard => {
                let period = self.period;
                if self.leaderboard.needs_load(&period) {
                    effects.push(fetch(
                        self.leaderboard.begin(period),
                        Request::Leaderboard { period },
                    ));
                }
                if self.team.needs_load(&()) {
                    effects.push(fetch(
                        self.team.begin(()),
                        Request::Team {
                            limit: self.team_limit,
                        },
                    ));
                }
            }
            Tab::Posts => {
                if self.posts.needs_load(&()) {
                    effects.push(fetch(self.posts.begin(()), Request::Posts));
                }
                effects.extend(self.drilldown.resume());
            }
            Tab::Publish => {
                if self.sync_status.needs_load(&()) {
                    effects.push(fetch(self.sync_status.begin(()), Request::SyncStatus));
                }
            }
            Tab::Advocacy => {
                if self.suggestions.needs_load(&()) {
                    effects.push(fetch(self.suggestions.begin(()), Request::Suggestions));
                }
                if self.advocacy_stats.needs_load(&()) {
                    effects.push(fetch(
                        self.advocacy_stats.begin(()),
                        Request::AdvocacyStats,
                    ));
                }
            }
        }
        effects
    }

    pub fn select_tab(&mut self, tab: Tab, auth: &AuthState) -> Vec<Effect> {
        if tab != self.active {
            self.suspend(self.active);
            self.active = tab;
        }
        self.pending_fetches(auth)
    }

    /// Change the leaderboard period. The previous period's fetch, if still
    /// in flight, is superseded.
    pub fn select_period(&mut self, period: Period, auth: &AuthState) -> Vec<Effect> {
        self.period = period;
        if self.active != Tab::Leaderboard {
            self.leaderboard.cancel();
        }
        self.pending_fetches(auth)
    }

    /// Expand or collapse a post in the feed.
    pub fn toggle_post(&mut self, post_id: &str, auth: &AuthState) -> Vec<Effect> {
        if !auth.is_authenticated() || self.active != Tab::Posts {
            return Vec::new();
        }
        self.drilldown.toggle(post_id).into_iter().collect()
    }

    /// Drop the active tab's datasets and the header stats, then reload them.
    pub fn refresh(&mut self, auth: &AuthState) -> Vec<Effect> {
        self.stats.invalidate();
        match self.active {
            Tab::Leaderboard => {
                self.leaderboard.invalidate();
                self.team.invalidate();
            }
            Tab::Posts => {
                self.posts.invalidate();
                self.drilldown.invalidate_detail();
            }
            Tab::Publish => self.sync_status.invalidate(),
            Tab::Advocacy => {
                self.suggestions.invalidate();
                self.advocacy_stats.invalidate();
            }
        }
        self.pending_fetches(auth)
    }

    /// Abandon everything: in-flight fetches are ignored on arrival and all
    /// loaded data is dropped.
    pub fn teardown(&mut self) {
        self.stats.invalidate();
        self.leaderboard.invalidate();
        self.team.invalidate();
        self.posts.invalidate();
        self.drilldown.collapse();
        self.sync_status.invalidate();
        self.suggestions.invalidate();
        self.advocacy_stats.invalidate();
    }

    /// Route a read-side completion to its slot. Returns true if applied.
    ///
    /// Write-side responses are not handled here.
    pub fn apply(&mut self, generation: Generation, response: Response) -> bool {
        let applied = match response {
            Response::Stats(result) => self.stats.resolve(generation, log_failure("stats", result)),
            Response::Team(result) => self.team.resolve(generation, log_failure("team", result)),
            Response::Leaderboard { period, result } => {
                tracing::debug!(%period, "leaderboard response");
                self.leaderboard
                    .resolve(generation, log_failure("leaderboard", result))
            }
            Response::Posts(result) => self.posts.resolve(generation, log_failure("posts", result)),
            Response::PostDetail { result, .. } => self.drilldown.apply(generation, result),
            Response::Suggestions(result) => self
                .suggestions
                .resolve(generation, log_failure("suggestions", result)),
            Response::AdvocacyStats(result) => self
                .advocacy_stats
                .resolve(generation, log_failure("advocacy stats", result)),
            Response::SyncStatus(result) => self
                .sync_status
                .resolve(generation, log_failure("sync status", result)),
            Response::Identity(_)
            | Response::Published(_)
            | Response::Shared { .. }
            | Response::SyncTriggered(_) => return false,
        };
        if !applied {
            tracing::debug!(generation = generation.value(), "dropping stale response");
        }
        applied
    }

    fn suspend(&mut self, tab: Tab) {
        match tab {
            Tab::Leaderboard => {
                self.leaderboard.cancel();
                self.team.cancel();
            }
            Tab::Posts => {
                self.posts.cancel();
                self.drilldown.suspend();
            }
            Tab::Publish => self.sync_status.cancel(),
            Tab::Advocacy => {
                self.suggestions.cancel();
                self.advocacy_stats.cancel();
            }
        }
    }
}

fn log_failure<T, E: fmt::Display>(what: &str, result: Result<T, E>) -> Result<T, E> {
    if let Err(ref e) = result {
        tracing::warn!("failed to load {what}: {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClientError;
    use crate::api::types::Identity;

    fn signed_in() -> AuthState {
        AuthState::Authenticated(serde_json::from_str::<Identity>(r#"{"sub":"me"}"#).unwrap())
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

    fn generation_for(effects: &[Effect], wanted: &Request) -> Generation {
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

    fn row(sub: &str, reactions: u64) -> EngagementRow {
        serde_json::from_value(serde_json::json!({"sub": sub, "reactions": reactions})).unwrap()
    }

    fn post(id: &str) -> Post {
        serde_json::from_value(serde_json::json!({"postId": id})).unwrap()
    }

    #[test]
    fn no_fetch_until_authenticated() {
        let mut view = ViewController::new(Tab::Leaderboard, 50);
        assert!(view.pending_fetches(&AuthState::Unresolved).is_empty());
        assert!(view.pending_fetches(&AuthState::Unauthenticated).is_empty());
        for tab in Tab::ALL {
            assert!(view.select_tab(tab, &AuthState::Unresolved).is_empty());
        }
        assert!(
            view.select_period(Period::Week, &AuthState::Unauthenticated)
                .is_empty()
        );
        assert!(view.toggle_post("p", &AuthState::Unresolved).is_empty());
        assert!(view.refresh(&AuthState::Unauthenticated).is_empty());
    }

    #[test]
    fn authenticated_leaderboard_loads_header_rows_and_team() {
        let mut view = ViewController::new(Tab::Leaderboard, 25);
        let effects = view.pending_fetches(&signed_in());
        assert_eq!(
            requests(&effects),
            vec![
                Request::Stats,
                Request::Leaderboard {
                    period: Period::All
                },
                Request::Team { limit: 25 },
            ]
        );
        // Nothing new while those are in flight.
        assert!(view.pending_fetches(&signed_in()).is_empty());
    }

    #[test]
    fn period_switch_issues_one_fetch_and_replaces_rows() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Leaderboard, 50);
        let effects = view.pending_fetches(&auth);
        let all = generation_for(
            &effects,
            &Request::Leaderboard {
                period: Period::All,
            },
        );
        assert!(view.apply(
            all,
            Response::Leaderboard {
                period: Period::All,
                result: Ok(vec![row("a", 1)]),
            }
        ));

        let effects = view.select_period(Period::Month, &auth);
        assert_eq!(
            requests(&effects),
            vec![Request::Leaderboard {
                period: Period::Month
            }]
        );
        assert!(view.leaderboard.data().is_none(), "old rows hidden while loading");

        let month = generation_for(
            &effects,
            &Request::Leaderboard {
                period: Period::Month,
            },
        );
        view.apply(
            month,
            Response::Leaderboard {
                period: Period::Month,
                result: Ok(vec![row("b", 2), row("c", 2)]),
            },
        );
        let subs: Vec<&str> = view
            .leaderboard
            .data()
            .unwrap()
            .iter()
            .map(|r| r.sub.as_str())
            .collect();
        assert_eq!(subs, ["b", "c"]);
    }

    #[test]
    fn superseded_period_response_never_overwrites() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Leaderboard, 50);
        let first = view.pending_fetches(&auth);
        let all = generation_for(
            &first,
            &Request::Leaderboard {
                period: Period::All,
            },
        );
        let second = view.select_period(Period::Week, &auth);
        let week = generation_for(
            &second,
            &Request::Leaderboard {
                period: Period::Week,
            },
        );

        assert!(view.apply(
            week,
            Response::Leaderboard {
                period: Period::Week,
                result: Ok(vec![row("w", 1)]),
            }
        ));
        assert!(!view.apply(
            all,
            Response::Leaderboard {
                period: Period::All,
                result: Ok(vec![row("a", 9)]),
            }
        ));
        assert_eq!(view.leaderboard.data().unwrap()[0].sub, "w");
        assert_eq!(view.leaderboard.key(), Some(&Period::Week));
    }

    #[test]
    fn reentering_a_tab_reuses_loaded_data() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Posts, 50);
        let effects = view.pending_fetches(&auth);
        let g = generation_for(&effects, &Request::Posts);
        view.apply(g, Response::Posts(Ok(vec![post("p1")])));

        view.select_tab(Tab::Advocacy, &auth);
        let back = view.select_tab(Tab::Posts, &auth);
        assert!(back.is_empty());
        assert_eq!(view.posts.data().unwrap().len(), 1);
    }

    #[test]
    fn leaving_a_tab_discards_its_inflight_result() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Advocacy, 50);
        let effects = view.pending_fetches(&auth);
        let g = generation_for(&effects, &Request::Suggestions);

        view.select_tab(Tab::Posts, &auth);
        assert!(!view.apply(g, Response::Suggestions(Ok(vec![]))));
        assert!(view.suggestions.data().is_none());

        let again = view.select_tab(Tab::Advocacy, &auth);
        assert!(requests(&again).contains(&Request::Suggestions));
    }

    #[test]
    fn load_error_shows_empty_state_without_retry_loop() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Posts, 50);
        let effects = view.pending_fetches(&auth);
        let g = generation_for(&effects, &Request::Posts);
        let err = Arc::new(ApiClientError::Status {
            status: 500,
            body: String::new(),
        });
        assert!(view.apply(g, Response::Posts(Err(err))));
        assert!(view.posts.data().is_none());
        assert!(view.pending_fetches(&auth).is_empty());

        let retried = view.refresh(&auth);
        assert!(requests(&retried).contains(&Request::Posts));
    }

    #[test]
    fn posts_tab_resumes_suspended_detail() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Posts, 50);
        view.pending_fetches(&auth);
        let toggle = view.toggle_post("p1", &auth);
        assert_eq!(
            requests(&toggle),
            vec![Request::PostDetail {
                post_id: "p1".into()
            }]
        );

        view.select_tab(Tab::Publish, &auth);
        let back = view.select_tab(Tab::Posts, &auth);
        assert!(requests(&back).contains(&Request::PostDetail {
            post_id: "p1".into()
        }));
    }

    #[test]
    fn teardown_drops_everything() {
        let auth = signed_in();
        let mut view = ViewController::new(Tab::Leaderboard, 50);
        let effects = view.pending_fetches(&auth);
        let stats = generation_for(&effects, &Request::Stats);
        view.teardown();
        assert!(!view.apply(stats, Response::Stats(Ok(EngagementStats::default()))));
        assert!(view.stats.data().is_none());
    }
}
