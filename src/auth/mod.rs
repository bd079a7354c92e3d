//! Authentication state for the dashboard.
//!
//! The backend completes the identity-provider handshake and redirects to
//! the dashboard with `?token=<credential>`. This module consumes that token
//! once, resolves the signed-in identity and classifies the client as
//! unresolved, authenticated or unauthenticated.

pub mod callback;

use url::Url;

use crate::api::types::Identity;
use crate::event::{ApiResult, Effect, Request};
use crate::session::{Credential, SessionStore};
use crate::slot::{Generation, Tracker};

/// Query parameter carrying the one-time credential on the landing URL.
pub const TOKEN_PARAM: &str = "token";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Identity resolution has not finished yet.
    Unresolved,
    Authenticated(Identity),
    /// Not signed in, whatever the cause. Treated as "go sign in".
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Split a landing URL into its credential and the URL without it.
///
/// Returns `None` when the URL carries no (non-empty) token, so feeding the
/// stripped URL back in is a no-op.
pub fn capture_credential(landing: &Url) -> Option<(Credential, Url)> {
    let token = landing
        .query_pairs()
        .find(|(k, v)| k == TOKEN_PARAM && !v.is_empty())
        .map(|(_, v)| v.into_owned())?;

    let remaining: Vec<(String, String)> = landing
        .query_pairs()
        .filter(|(k, _)| k != TOKEN_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = landing.clone();
    if remaining.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(remaining);
    }

    Some((Credential::new(token), stripped))
}

/// Owns the authentication state machine.
#[derive(Debug)]
pub struct AuthController {
    state: AuthState,
    session: SessionStore,
    identity_fetch: Tracker,
    logout_url: String,
}

impl AuthController {
    pub fn new(session: SessionStore, logout_url: impl Into<String>) -> Self {
        Self {
            state: AuthState::Unresolved,
            session,
            identity_fetch: Tracker::default(),
            logout_url: logout_url.into(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Start a session activation.
    ///
    /// Consumes a credential from `landing` if it has one, then asks for the
    /// identity fetch. Returns the landing URL with the token removed (if one
    /// was captured) alongside the effects.
    pub fn activate(&mut self, landing: Option<&Url>) -> (Option<Url>, Vec<Effect>) {
        let stripped = landing.and_then(capture_credential).map(|(credential, url)| {
            tracing::info!("captured credential from landing URL");
            self.session.set_credential(credential);
            url
        });

        self.state = AuthState::Unresolved;
        let generation = self.identity_fetch.start();
        let effects = vec![Effect::Fetch {
            generation,
            request: Request::Identity,
        }];
        (stripped, effects)
    }

    /// Apply the identity fetch result. Returns false for a stale result.
    ///
    /// A failure leaves the stored credential alone; it may only have been a
    /// transient error.
    pub fn on_identity(&mut self, generation: Generation, result: ApiResult<Identity>) -> bool {
        if !self.identity_fetch.finish(generation) {
            tracing::debug!(generation = generation.value(), "dropping stale identity");
            return false;
        }
        self.state = match result {
            Ok(identity) => {
                tracing::info!(sub = %identity.sub, "authenticated");
                AuthState::Authenticated(identity)
            }
            Err(e) => {
                tracing::debug!("identity unresolved: {e}");
                AuthState::Unauthenticated
            }
        };
        true
    }

    /// Clear the credential and hand session termination to the backend.
    pub fn logout(&mut self) -> Vec<Effect> {
        self.session.clear_credential();
        self.identity_fetch.cancel();
        self.state = AuthState::Unauthenticated;
        tracing::info!("logged out");
        vec![Effect::OpenUrl(self.logout_url.clone())]
    }
}
