//! Navigation guard.
//!
//! Runs once per navigation: the login page always passes, users without a
//! valid session are sent to login, and signed-in users are checked against
//! the menus fetched for their groups. A denial redirects to the fallback page
//! with a notice for the UI to display.

use mes_common::MenuNode;

use super::paths::{AllowedPathSet, extract_forest, normalize_path};
use super::resolver::{AccessDecision, PathAccessResolver};

/// What the session lookup preceding a navigation returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated { username: String },
    /// No user is signed in.
    Anonymous,
    /// The server rejected the session (HTTP 401).
    Expired,
    /// The session or menu lookup failed for another reason.
    Unavailable,
}

/// What the UI shell should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect { to: String, notice: Option<String> },
}

impl GuardOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GuardOutcome::Proceed)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    resolver: PathAccessResolver,
    login_path: String,
    fallback_path: String,
    denied_notice: String,
}

impl NavigationGuard {
    pub fn new(
        resolver: PathAccessResolver,
        login_path: &str,
        fallback_path: &str,
        denied_notice: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            login_path: normalize_path(login_path),
            fallback_path: normalize_path(fallback_path),
            denied_notice: denied_notice.into(),
        }
    }

    pub fn resolver(&self) -> &PathAccessResolver {
        &self.resolver
    }

    /// Gate a navigation to `target`.
    ///
    /// `menus` is the tree fetched for the user; `None` (not fetched, or the
    /// fetch failed) is treated as an empty permission set.
    pub fn evaluate(
        &self,
        target: &str,
        session: &SessionState,
        menus: Option<&[MenuNode]>,
    ) -> GuardOutcome {
        let target = normalize_path(target);
        if target == self.login_path {
            return GuardOutcome::Proceed;
        }

        let username = match session {
            SessionState::Anonymous | SessionState::Expired => {
                tracing::debug!(path = %target, ?session, "No session, redirecting to login");
                return self.to_login();
            }
            SessionState::Authenticated { username } => username.as_str(),
            SessionState::Unavailable => "",
        };

        let allowed = menus.map(extract_forest).unwrap_or_else(AllowedPathSet::new);
        match self.resolver.decide(&target, &allowed) {
            AccessDecision::Allowed(_) => GuardOutcome::Proceed,
            AccessDecision::Denied => {
                tracing::warn!(
                    user = username,
                    path = %target,
                    allowed = allowed.len(),
                    "Navigation denied"
                );
                if target == self.fallback_path {
                    // Redirecting to the page being denied would loop
                    return self.to_login();
                }
                GuardOutcome::Redirect {
                    to: self.fallback_path.clone(),
                    notice: Some(self.denied_notice.clone()),
                }
            }
        }
    }

    fn to_login(&self) -> GuardOutcome {
        GuardOutcome::Redirect {
            to: self.login_path.clone(),
            notice: None,
        }
    }
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(
            PathAccessResolver::default(),
            "/login",
            "/welcome",
            "无权限访问该页面",
        )
    }
}
