use std::sync::Arc;

use anyhow::{Context, Result};
use kenko_auth::{FileStorage, Revalidation, SessionError, SessionState, SessionStorage, SessionStore};
use kenko_config::{ApiConfig, AppConfig};
use kenko_gateway::api::auth::{Credentials, OrganizationRegistration};
use kenko_gateway::{ApiClient, ApiError, Notifier};
use kenko_routing::{paths, Navigator, RouteTable, Router, RoutingError, Visit};
use thiserror::Error;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global subscriber. `RUST_LOG` overrides `default_directive`.
    pub fn init_tracing(default_directive: &str) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// The client-side services of the portal, wired around one session.
#[derive(Clone)]
pub struct Portal {
    pub session: SessionStore,
    pub client: ApiClient,
    pub router: Router,
    navigator: Arc<dyn Navigator>,
}

impl Portal {
    /// Build the services from configuration, persisting the session to the
    /// configured file.
    pub fn initialise(
        config: &AppConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage.session_file));
        Self::with_storage(&config.api, storage, navigator, notifier)
    }

    pub fn with_storage(
        config: &ApiConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = SessionStore::new(storage);
        let client = ApiClient::new(config, session.clone(), navigator.clone(), notifier)
            .context("failed to build api client")?;
        let router = Router::new(RouteTable::kenko(), session.clone(), navigator.clone());

        Ok(Self {
            session,
            client,
            router,
            navigator,
        })
    }

    /// Restore the persisted session and start checking it with `/auth/me`.
    pub fn start(&self) -> Option<Revalidation> {
        self.session.restore(Arc::new(self.client.clone()))
    }

    /// Like [`start`](Self::start), but wait for the backend's verdict.
    pub async fn start_verified(&self) -> SessionState {
        if let Some(revalidation) = self.start() {
            revalidation.finished().await;
        }
        self.session.state()
    }

    /// Sign in and move to the role's landing page.
    pub async fn login(&self, email: &str, password: &str) -> Result<&'static str, PortalError> {
        let credentials = Credentials::new(email, password);
        let session = self.client.auth().login(&credentials).await?;
        self.enter(session)
    }

    /// Create a clinic with its administrator and sign that administrator in.
    pub async fn register_organization(
        &self,
        registration: &OrganizationRegistration,
    ) -> Result<&'static str, PortalError> {
        let session = self
            .client
            .auth()
            .register_organization(registration)
            .await?;
        self.enter(session)
    }

    pub fn logout(&self) -> Result<(), PortalError> {
        let result = self.session.clear();
        self.navigator.navigate(paths::LOGIN);
        info!("signed out");
        Ok(result?)
    }

    pub async fn visit(&self, path: &str) -> Result<Visit, PortalError> {
        Ok(self.router.visit(path).await?)
    }

    fn enter(&self, session: kenko_auth::Session) -> Result<&'static str, PortalError> {
        let landing = self.session.save(session.token, session.profile)?;
        self.navigator.navigate(landing);
        Ok(landing)
    }
}
