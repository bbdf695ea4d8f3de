use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::role::Role;
use crate::session::{Profile, Session};
use crate::storage::{MemoryStorage, SessionStorage, StorageError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("refusing to store a session without a token")]
    EmptyToken,
    #[error("failed to encode profile: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where the client currently stands with respect to authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted state has not been read yet.
    Loading,
    /// Restored from storage and trusted until the backend says otherwise.
    Pending(Session),
    Verified(Session),
    Anonymous,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Pending(session) | SessionState::Verified(session) => Some(session),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(Session::role)
    }
}

/// Confirms a restored session against the backend.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, session: &Session) -> anyhow::Result<Profile>;
}

/// Handle on a background revalidation started by [`SessionStore::restore`].
pub struct Revalidation {
    handle: JoinHandle<bool>,
}

impl Revalidation {
    /// Wait for the backend check. Returns `true` when the session survived.
    pub async fn finished(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Single owner of the current session.
///
/// Cloning yields another handle to the same store. State changes are only
/// made through [`restore`](Self::restore), [`save`](Self::save),
/// [`clear`](Self::clear), [`revoke`](Self::revoke) and
/// [`revoke_anonymous`](Self::revoke_anonymous); everybody else reads
/// or subscribes.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    mutation: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                mutation: Mutex::new(()),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .session()
            .map(|session| session.token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Resolve once the state has left [`SessionState::Loading`].
    pub async fn settled(&self) -> SessionState {
        let mut receiver = self.subscribe();
        let settled = match receiver.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Rehydrate from storage.
    ///
    /// A persisted session becomes [`SessionState::Pending`] right away and is
    /// checked in the background; any verification failure logs the user
    /// out. Incomplete or unreadable storage is erased.
    pub fn restore(&self, verifier: Arc<dyn IdentityVerifier>) -> Option<Revalidation> {
        let guard = self.inner.mutation.lock();
        let Some(session) = self.load_persisted() else {
            self.inner.state.send_replace(SessionState::Anonymous);
            debug!("no persisted session");
            return None;
        };

        info!(
            user_id = session.profile.id,
            role = %session.role(),
            "restored persisted session, revalidating"
        );
        self.inner
            .state
            .send_replace(SessionState::Pending(session.clone()));
        drop(guard);

        let store = self.clone();
        let handle = tokio::spawn(async move {
            match verifier.verify(&session).await {
                Ok(profile) => store.confirm(&session.token, profile),
                Err(error) => {
                    warn!(%error, "session revalidation failed, signing out");
                    store.revoke(&session.token);
                    false
                }
            }
        });

        Some(Revalidation { handle })
    }

    /// Store a freshly issued session and return the role's landing path.
    pub fn save(
        &self,
        token: impl Into<String>,
        profile: Profile,
    ) -> Result<&'static str, SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let user = serde_json::to_string(&profile)?;

        let _guard = self.inner.mutation.lock();
        self.inner.storage.write(&token, &user)?;

        let landing = profile.role.landing_path();
        info!(user_id = profile.id, role = %profile.role, "session saved");
        self.inner
            .state
            .send_replace(SessionState::Verified(Session::new(token, profile)));

        Ok(landing)
    }

    /// Forget the session. Memory is cleared even when storage fails.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.inner.mutation.lock();
        let previous = self.inner.state.send_replace(SessionState::Anonymous);
        if let Some(session) = previous.session() {
            info!(user_id = session.profile.id, "session cleared");
        }
        self.inner.storage.erase()?;
        Ok(())
    }

    /// Forget the session only while it still carries `token`.
    ///
    /// Returns `false` when a different session (or none) is current.
    pub fn revoke(&self, token: &str) -> bool {
        let _guard = self.inner.mutation.lock();

        if self.current_token().as_deref() != Some(token) {
            debug!("token already replaced, nothing to revoke");
            return false;
        }

        info!("session revoked");
        self.inner.state.send_replace(SessionState::Anonymous);
        self.discard_persisted();
        true
    }

    /// Settle an unauthenticated rejection: sign out only while no session
    /// is current. Returns `false` when a login landed in the meantime.
    pub fn revoke_anonymous(&self) -> bool {
        let _guard = self.inner.mutation.lock();

        if self.current_token().is_some() {
            debug!("session established meanwhile, keeping it");
            return false;
        }

        self.inner.state.send_replace(SessionState::Anonymous);
        self.discard_persisted();
        true
    }

    fn load_persisted(&self) -> Option<Session> {
        let entries = match self.inner.storage.read() {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "unable to read persisted session, discarding");
                self.discard_persisted();
                return None;
            }
        };

        match (entries.token, entries.user) {
            (None, None) => None,
            (Some(token), Some(user)) if !token.is_empty() => {
                match serde_json::from_str::<Profile>(&user) {
                    Ok(profile) => Some(Session::new(token, profile)),
                    Err(error) => {
                        warn!(%error, "persisted profile is unreadable, discarding");
                        self.discard_persisted();
                        None
                    }
                }
            }
            _ => {
                warn!("persisted session is incomplete, discarding");
                self.discard_persisted();
                None
            }
        }
    }

    fn discard_persisted(&self) {
        if let Err(error) = self.inner.storage.erase() {
            warn!(%error, "failed to erase persisted session");
        }
    }

    fn current_token(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .session()
            .map(|session| session.token.clone())
    }

    fn confirm(&self, token: &str, profile: Profile) -> bool {
        let _guard = self.inner.mutation.lock();

        let pending = match &*self.inner.state.borrow() {
            SessionState::Pending(session) if session.token == token => Some(session.clone()),
            _ => None,
        };

        let Some(pending) = pending else {
            debug!("session changed during revalidation, ignoring result");
            return false;
        };

        if pending.profile != profile {
            match serde_json::to_string(&profile) {
                Ok(user) => {
                    if let Err(error) = self.inner.storage.write(token, &user) {
                        warn!(%error, "failed to persist refreshed profile");
                    }
                }
                Err(error) => warn!(%error, "failed to encode refreshed profile"),
            }
        }

        info!(user_id = profile.id, role = %profile.role, "session verified");
        self.inner
            .state
            .send_replace(SessionState::Verified(Session::new(token, profile)));
        true
    }
}
