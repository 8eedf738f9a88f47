// File: src/client/core.rs
use crate::client::auth::{UnauthorizedHook, UnauthorizedLayer, UnauthorizedService};
use crate::client::middleware::{BearerAuthLayer, BearerAuthService};
use crate::error::ApiError;
use crate::model::{
    Credentials, LoginResponse, NewTask, ProfileFields, ProfileUpdate, Registration, Task,
    TaskPage, TaskUpdate, UserProfile,
};
use crate::session::SharedSession;

use http::{Method, Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::{ServiceBuilder, ServiceExt};

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

/// Full outbound stack: 401 handling wraps token injection wraps the raw client.
pub type ApiService = UnauthorizedService<BearerAuthService<HttpsClient>>;

fn user_agent() -> String {
    format!("taskboard/{}", env!("CARGO_PKG_VERSION"))
}

// Ids end up in the path, so only allow characters that need no escaping.
fn is_path_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    session: SharedSession,
    service: ApiService,
}

impl ApiClient {
    /// Builds the client for `base_url` (scheme and host required, optional path prefix).
    pub fn new(
        base_url: &str,
        session: SharedSession,
        on_unauthorized: UnauthorizedHook,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let uri: Uri = base_url
            .parse()
            .map_err(|e: http::uri::InvalidUri| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ApiError::InvalidUrl(format!(
                "{}: expected something like https://host/api",
                base_url
            )));
        }

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            // Plain http:// still works; https:// will fail per request.
            log::warn!("No valid system certificates found");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client: HttpsClient = Client::builder(TokioExecutor::new()).build(https_connector);
        let service = ServiceBuilder::new()
            .layer(UnauthorizedLayer::new(session.clone(), on_unauthorized))
            .layer(BearerAuthLayer::new(session.clone()))
            .service(http_client);

        Ok(Self {
            base_url,
            session,
            service,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn endpoint(&self, path_and_query: &str) -> Result<Uri, ApiError> {
        let full = format!("{}{}", self.base_url, path_and_query);
        full.parse()
            .map_err(|e: http::uri::InvalidUri| ApiError::InvalidUrl(format!("{}: {}", full, e)))
    }

    fn task_path(id: &str) -> Result<String, ApiError> {
        if !is_path_safe(id) {
            return Err(ApiError::InvalidUrl(format!("bad task id {:?}", id)));
        }
        Ok(format!("/tasks/{}", id))
    }

    /// Sends one request through the middleware stack and returns the body of a 2xx.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(self.endpoint(path)?)
            .header(header::USER_AGENT, user_agent())
            .header(header::ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let req = builder
            .body(body.unwrap_or_default())
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        log::debug!("{} {}", method, path);
        let response = self.service.clone().oneshot(req).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            log::debug!("{} {} -> {}", method, path, status);
            Err(ApiError::from_status(status, &bytes))
        }
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let json = serde_json::to_string(body)?;
        self.send(method, path, Some(json)).await
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    // --- AUTH ---

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/auth/register", registration)
            .await?;
        Ok(())
    }

    /// Exchanges credentials for a token. Does not store it; see [`ApiClient::sign_in`].
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let bytes = self
            .send_json(Method::POST, "/auth/login", credentials)
            .await?;
        let res: LoginResponse = Self::decode(&bytes)?;
        if res.token.is_empty() {
            return Err(ApiError::Decode("login response has an empty token".to_string()));
        }
        Ok(res.token)
    }

    /// Logs in and stores the token, so every following call is authenticated.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let token = self.login(credentials).await?;
        self.session
            .set(&token)
            .map_err(|e| ApiError::Session(format!("{:#}", e)))?;
        log::info!("Signed in as {}", credentials.email);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.session
            .clear()
            .map_err(|e| ApiError::Session(format!("{:#}", e)))
    }

    // --- TASKS ---

    pub async fn list_tasks(&self, page: u32, limit: u32) -> Result<TaskPage, ApiError> {
        let bytes = self
            .send(
                Method::GET,
                &format!("/tasks?page={}&limit={}", page, limit),
                None,
            )
            .await?;
        Self::decode(&bytes)
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let bytes = self.send_json(Method::POST, "/tasks", task).await?;
        Self::decode(&bytes)
    }

    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, ApiError> {
        let path = Self::task_path(id)?;
        let bytes = self.send_json(Method::PUT, &path, update).await?;
        Self::decode(&bytes)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let path = Self::task_path(id)?;
        self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }

    // --- PROFILE ---

    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let bytes = self.send(Method::GET, "/users/me", None).await?;
        Self::decode(&bytes)
    }

    /// Returns the fields the server echoed back; an empty or unexpected body yields none.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileFields, ApiError> {
        let bytes = self.send_json(Method::PUT, "/users/me", update).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ProfileFields::default());
        }
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::debug!("Ignoring unexpected profile update body: {}", e);
            ProfileFields::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    #[test]
    fn rejects_base_url_without_host() {
        let err = ApiClient::new(
            "not a url",
            MemorySessionStore::shared(),
            UnauthorizedHook::noop(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = ApiClient::new("/api", MemorySessionStore::shared(), UnauthorizedHook::noop())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn path_safe_ids() {
        assert!(is_path_safe("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(is_path_safe("task-1_v2"));
        assert!(!is_path_safe(""));
        assert!(!is_path_safe("../users/me"));
        assert!(!is_path_safe("a b"));
    }
}
