use std::sync::Arc;
use std::time::Duration;

use kenko_auth::SessionStore;
use kenko_config::ApiConfig;
use kenko_routing::{paths, Navigator};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::envelope;
use crate::error::{ApiError, ApiResult};
use crate::notify::{Notice, Notifier};
use crate::validation::Validate;

/// HTTP client for the clinic backend.
///
/// Attaches the current session's bearer token, unwraps `{"data": ...}`
/// envelopes and maps failure statuses to [`ApiError`]. A 401 signs the user
/// out and sends the navigator to the login page.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    patients_path: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ApiError::Client)?;

        debug!(base_url = %config.base_url, timeout = config.timeout_seconds, "api client ready");

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            patients_path: config.patients_path.clone(),
            session,
            navigator,
            notifier,
        })
    }

    pub(crate) fn patients_path(&self) -> &str {
        &self.patients_path
    }

    /// Send `body` (if any) to `path` and decode the unwrapped response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let value = self
            .send(method, path, body, None::<&()>, self.session.token())
            .await?;
        decode(value)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let value = self
            .send(Method::GET, path, None::<&()>, Some(query), self.session.token())
            .await?;
        decode(value)
    }

    /// GET a collection, accepting paginated, bare and empty payloads.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let value = self
            .send(Method::GET, path, None::<&()>, None::<&()>, self.session.token())
            .await?;
        envelope::into_list(value)
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        self.send_validated(Method::POST, path, body).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::POST, path, None).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        self.send_validated(Method::PUT, path, body).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        self.send_validated(Method::PATCH, path, body).await
    }

    /// DELETE `path`; whatever the backend answers on success is discarded.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, None::<&()>, None::<&()>, self.session.token())
            .await
            .map(|_| ())
    }

    /// GET with an explicit token instead of the session's.
    pub(crate) async fn get_as<T: DeserializeOwned>(&self, path: &str, token: &str) -> ApiResult<T> {
        let value = self
            .send(
                Method::GET,
                path,
                None::<&()>,
                None::<&()>,
                Some(token.to_string()),
            )
            .await?;
        decode(value)
    }

    async fn send_validated<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        body.validate()?;
        let value = self
            .send(method, path, Some(body), None::<&()>, self.session.token())
            .await?;
        decode(value)
    }

    async fn send<B, Q>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Q>,
        token: Option<String>,
    ) -> ApiResult<Value>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, path, authenticated = token.is_some(), "api request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|error| self.network_failure(&method, path, error))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| self.network_failure(&method, path, error))?;

        if !status.is_success() {
            return Err(self.failure(&method, path, status, &bytes, token.as_deref()));
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(envelope::normalize(body))
    }

    fn failure(
        &self,
        method: &Method,
        path: &str,
        status: StatusCode,
        body: &[u8],
        token: Option<&str>,
    ) -> ApiError {
        let error = ApiError::from_status(status, envelope::error_message(body));
        warn!(%method, path, status = status.as_u16(), %error, "api request failed");

        match &error {
            ApiError::Unauthorized => self.expire_session(token),
            ApiError::Forbidden { .. } => self.notifier.notify(Notice::Forbidden),
            ApiError::NotFound { .. } => self.notifier.notify(Notice::NotFound),
            ApiError::ServerError { status: 500, .. } => self.notifier.notify(Notice::ServerError),
            _ => {}
        }

        error
    }

    fn network_failure(&self, method: &Method, path: &str, error: reqwest::Error) -> ApiError {
        warn!(%method, path, %error, "no response from api");
        self.notifier.notify(Notice::Network);
        ApiError::Network(error)
    }

    fn expire_session(&self, token: Option<&str>) {
        let signed_out = match token {
            Some(token) => self.session.revoke(token),
            None => self.session.revoke_anonymous(),
        };

        if signed_out {
            info!("authentication rejected, returning to login");
            self.navigator.navigate(paths::LOGIN);
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(value)?)
}
