use std::collections::BTreeMap;
use std::sync::Arc;

use kenko_auth::SessionStore;
use thiserror::Error;
use tracing::{debug, info};

use crate::guard::{evaluate, Decision};
use crate::navigator::Navigator;
use crate::table::RouteTable;

const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("too many redirects while opening {0}")]
    TooManyRedirects(String),
}

/// Where a navigation request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub requested: String,
    pub location: String,
    pub pattern: String,
    pub params: BTreeMap<String, String>,
    pub redirects: Vec<String>,
}

impl Visit {
    pub fn redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Route table, session and navigator wired together.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(table: RouteTable, session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            table: Arc::new(table),
            session,
            navigator,
        }
    }

    /// Decide for `path` using the session as it is right now.
    pub fn resolve(&self, path: &str) -> Decision {
        let matched = self.table.resolve(path);
        evaluate(&self.session.state(), matched.access)
    }

    /// Open `path`, waiting out a loading session and following redirects.
    pub async fn visit(&self, path: &str) -> Result<Visit, RoutingError> {
        let mut location = path.to_string();
        let mut redirects = Vec::new();

        loop {
            let state = self.session.settled().await;
            let matched = self.table.resolve(&location);
            let decision = evaluate(&state, matched.access);

            let Some(target) = decision.target() else {
                self.navigator.navigate(&location);
                info!(requested = path, location = %location, "route rendered");
                return Ok(Visit {
                    requested: path.to_string(),
                    location,
                    pattern: matched.pattern.to_string(),
                    params: matched.params,
                    redirects,
                });
            };

            if redirects.len() >= MAX_REDIRECTS {
                return Err(RoutingError::TooManyRedirects(path.to_string()));
            }

            debug!(from = %location, to = target, ?decision, "guard redirect");
            redirects.push(target.to_string());
            location = target.to_string();
        }
    }
}
