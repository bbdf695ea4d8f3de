//! The authorization decision taken for a single route evaluation.

use kenko_auth::{Role, SessionState};

use crate::paths;

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Signed-out visitors only; a session is sent to its landing page.
    Guest,
    /// Any signed-in role.
    Authenticated,
    /// Signed-in sessions whose role is in the set.
    Roles(RoleSet),
    /// Forwards a session to its own landing page.
    RoleRedirect,
}

/// A non-empty, ordered set of roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// Returns `None` when `roles` is empty.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Option<Self> {
        let mut roles: Vec<Role> = roles.into_iter().collect();
        roles.sort_unstable();
        roles.dedup();
        (!roles.is_empty()).then_some(Self(roles))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.binary_search(&role).is_ok()
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The session is still being determined; show nothing yet.
    Pending,
    Render,
    RedirectLogin,
    RedirectUnauthorized,
    Redirect(&'static str),
}

impl Decision {
    pub fn target(self) -> Option<&'static str> {
        match self {
            Decision::Pending | Decision::Render => None,
            Decision::RedirectLogin => Some(paths::LOGIN),
            Decision::RedirectUnauthorized => Some(paths::UNAUTHORIZED),
            Decision::Redirect(path) => Some(path),
        }
    }
}

pub fn evaluate(state: &SessionState, access: &Access) -> Decision {
    if matches!(access, Access::Public) {
        return Decision::Render;
    }

    if state.is_loading() {
        return Decision::Pending;
    }

    let session = state.session();

    match (access, session) {
        (Access::Public, _) => Decision::Render,
        (Access::Guest, None) => Decision::Render,
        (Access::Guest, Some(session)) | (Access::RoleRedirect, Some(session)) => {
            Decision::Redirect(session.landing_path())
        }
        (Access::Authenticated, Some(_)) => Decision::Render,
        (Access::Roles(allowed), Some(session)) if allowed.contains(session.role()) => {
            Decision::Render
        }
        (Access::Roles(_), Some(_)) => Decision::RedirectUnauthorized,
        (Access::Authenticated, None) | (Access::Roles(_), None) | (Access::RoleRedirect, None) => {
            Decision::RedirectLogin
        }
    }
}
