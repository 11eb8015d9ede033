use crate::infrastructure::config::GoogleConfig;
use crate::infrastructure::repositories::BackendError;
use google_cloud_auth::credentials::{service_account, CacheableResource, Credentials};
use http::Extensions;
use reqwest::RequestBuilder;
use std::path::Path;
use std::sync::Arc;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// A parsed service-account key file. Read once, shared by every credential session built from it.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    json: Arc<serde_json::Value>,
    client_email: String,
}

impl ServiceAccountKey {
    pub async fn load(path: &Path) -> Result<Self, BackendError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            BackendError::Auth(format!("cannot read service account file {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, BackendError> {
        let json: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| BackendError::Auth(format!("invalid service account file: {}", e)))?;

        let key_type = json.get("type").and_then(|v| v.as_str()).unwrap_or("unknown");
        if key_type != "service_account" {
            return Err(BackendError::Auth(format!(
                "unsupported credential type '{}', expected 'service_account'",
                key_type
            )));
        }

        let client_email = json
            .get("client_email")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BackendError::Auth("service account file has no client_email".to_string()))?
            .to_string();

        Ok(Self {
            json: Arc::new(json),
            client_email,
        })
    }

    /// Load the key named by `GOOGLE_CLOUD_SERVICE_ACCOUNT_FILE`, if any. Unusable keys are logged and skipped.
    pub async fn load_configured(google: &GoogleConfig) -> Option<Self> {
        let path = google.service_account_file.as_ref()?;
        match Self::load(path).await {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Service account credentials unusable, falling back"
                );
                None
            }
        }
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

/// One credential session: its own token cache, refreshed by the auth library before expiry.
pub struct ServiceAccountSession {
    client_email: String,
    credentials: Credentials,
}

impl ServiceAccountSession {
    pub fn new(key: &ServiceAccountKey) -> Result<Self, BackendError> {
        let credentials = service_account::Builder::new(key.json.as_ref().clone())
            .with_access_specifier(service_account::AccessSpecifier::from_scopes(vec![
                CLOUD_PLATFORM_SCOPE.to_string(),
            ]))
            .build()
            .map_err(|e| BackendError::Auth(format!("invalid service account key: {}", e)))?;

        Ok(Self {
            client_email: key.client_email.clone(),
            credentials,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub async fn access_token(&self) -> Result<String, BackendError> {
        let headers = self
            .credentials
            .headers(Extensions::new())
            .await
            .map_err(|e| {
                tracing::error!(client_email = %self.client_email, error = %e, "Failed to fetch access token");
                if e.is_transient() {
                    BackendError::Transport(format!("access token: {}", e))
                } else {
                    BackendError::Auth(format!("failed to fetch access token: {}", e))
                }
            })?;

        let header_map = match headers {
            CacheableResource::New { data, .. } => data,
            CacheableResource::NotModified => {
                return Err(BackendError::Auth(
                    "credentials returned no headers".to_string(),
                ))
            }
        };

        let value = header_map
            .get(http::header::AUTHORIZATION)
            .ok_or_else(|| BackendError::Auth("no Authorization header in credentials".to_string()))?
            .to_str()
            .map_err(|e| BackendError::Auth(format!("invalid Authorization header: {}", e)))?;

        value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| BackendError::Auth("Authorization header is not a Bearer token".to_string()))
    }
}

/// How outgoing Google API requests are authenticated.
pub enum GoogleAuth {
    ServiceAccount(ServiceAccountSession),
    /// Key sent as a `key=` query parameter; never refreshed.
    ApiKey(String),
    Anonymous,
}

impl GoogleAuth {
    /// Service account first, then API key, then nothing. Each call starts a fresh session.
    pub fn new(google: &GoogleConfig, key: Option<&ServiceAccountKey>) -> Self {
        if let Some(key) = key {
            match ServiceAccountSession::new(key) {
                Ok(session) => {
                    tracing::info!(
                        client_email = %session.client_email(),
                        "Using service account credentials"
                    );
                    return GoogleAuth::ServiceAccount(session);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Service account credentials unusable, falling back");
                }
            }
        }

        match &google.api_key {
            Some(key) => {
                tracing::info!("Using API key credentials");
                GoogleAuth::ApiKey(key.clone())
            }
            None => {
                tracing::warn!("No Google credentials configured, requests will be unauthenticated");
                GoogleAuth::Anonymous
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            GoogleAuth::ServiceAccount(_) => "service_account",
            GoogleAuth::ApiKey(_) => "api_key",
            GoogleAuth::Anonymous => "anonymous",
        }
    }

    pub fn is_service_account(&self) -> bool {
        matches!(self, GoogleAuth::ServiceAccount(_))
    }

    /// Attach credentials to a request.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        match self {
            GoogleAuth::ServiceAccount(session) => {
                Ok(request.bearer_auth(session.access_token().await?))
            }
            GoogleAuth::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            GoogleAuth::Anonymous => Ok(request),
        }
    }
}
