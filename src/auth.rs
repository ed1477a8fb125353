use crate::config::AppConfig;
use crate::error::{google_error_message, remote_error, Error};
use crate::http::HttpClient;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Target principal plus the scope set requested for one token mint. Scopes
/// are deduplicated on construction, preserving first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpersonationRequest {
    target_principal: String,
    scopes: Vec<String>,
}

impl ImpersonationRequest {
    pub fn new<I, S>(target_principal: &str, scopes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if target_principal.is_empty() {
            return Err(Error::invalid("target principal must not be empty"));
        }
        let mut deduped: Vec<String> = Vec::new();
        for scope in scopes {
            let scope = scope.into();
            if scope.is_empty() {
                return Err(Error::invalid("scope strings must not be empty"));
            }
            if !deduped.contains(&scope) {
                deduped.push(scope);
            }
        }
        if deduped.is_empty() {
            return Err(Error::invalid("at least one scope is required"));
        }
        Ok(Self {
            target_principal: target_principal.to_string(),
            scopes: deduped,
        })
    }

    pub fn target_principal(&self) -> &str {
        &self.target_principal
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

/// Short-lived token asserting the target principal's identity. Used once to
/// build one speech client, never cached.
#[derive(Debug, Clone)]
pub struct ImpersonatedToken {
    pub access_token: String,
    pub expire_time: Option<String>,
}

/// Service account key fields we need from the ambient credential JSON.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

enum AmbientCredential {
    AccessToken(String),
    ServiceAccount(ServiceAccountKey),
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: usize,
    iat: usize,
}

#[derive(Serialize)]
struct GenerateAccessTokenRequest<'a> {
    scope: &'a [String],
    lifetime: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expire_time: Option<String>,
}

/// Exchanges the ambient credential for a short-lived token asserting the
/// target service account, restricted to the requested scopes. The ambient
/// identity must carry a pre-authorized delegation grant on the target.
pub struct CredentialBroker {
    http: HttpClient,
    iam_endpoint: String,
    ambient: AmbientCredential,
}

impl CredentialBroker {
    pub fn with_access_token(
        http: HttpClient,
        iam_endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            iam_endpoint: iam_endpoint.into(),
            ambient: AmbientCredential::AccessToken(token.into()),
        }
    }

    pub fn from_config(http: HttpClient, cfg: &AppConfig) -> Result<Self, Error> {
        let ambient = if let Some(token) = &cfg.access_token {
            AmbientCredential::AccessToken(token.clone())
        } else if let Some(json) = &cfg.credentials_json {
            let key: ServiceAccountKey = serde_json::from_str(json)
                .map_err(|e| Error::auth_unavailable(format!("invalid credentials json: {e}")))?;
            AmbientCredential::ServiceAccount(key)
        } else {
            return Err(Error::auth_unavailable(
                "set GOOGLE_ACCESS_TOKEN or GOOGLE_APPLICATION_CREDENTIALS",
            ));
        };
        Ok(Self {
            http,
            iam_endpoint: cfg.iam_endpoint.clone(),
            ambient,
        })
    }

    /// Mints one impersonated token. One network round-trip to the identity
    /// provider per call (two when the ambient key must first be exchanged).
    pub async fn mint(&self, request: &ImpersonationRequest) -> Result<ImpersonatedToken, Error> {
        let bearer = self.ambient_bearer().await?;
        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:generateAccessToken",
            self.iam_endpoint,
            request.target_principal()
        );
        debug!(
            "minting impersonated token for {} with {} scope(s)",
            request.target_principal(),
            request.scopes().len()
        );

        let body = serde_json::to_string(&GenerateAccessTokenRequest {
            scope: request.scopes(),
            lifetime: "3600s",
        })
        .map_err(|e| Error::internal(format!("serialize token request: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bearer}"))
                .map_err(|e| Error::internal(format!("invalid auth header: {e}")))?,
        );

        let (status, text) = self.http.post_json(&url, headers, body).await?;
        if status.as_u16() == 403 {
            return Err(Error::permission_denied(google_error_message(&text)));
        }
        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &text));
        }

        let resp: GenerateAccessTokenResponse = serde_json::from_str(&text)
            .map_err(|e| Error::internal(format!("parse token response: {e}")))?;
        Ok(ImpersonatedToken {
            access_token: resp.access_token,
            expire_time: resp.expire_time,
        })
    }

    async fn ambient_bearer(&self) -> Result<String, Error> {
        match &self.ambient {
            AmbientCredential::AccessToken(token) => Ok(token.clone()),
            AmbientCredential::ServiceAccount(key) => self.exchange_key(key).await,
        }
    }

    /// Self-signed JWT grant for the ambient service account key.
    async fn exchange_key(&self, key: &ServiceAccountKey) -> Result<String, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::internal(format!("clock error: {e}")))?
            .as_secs() as usize;
        let claims = Claims {
            iss: &key.client_email,
            scope: crate::config::CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            exp: now + 3600,
            iat: now,
        };
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::auth_unavailable(format!("bad private key: {e}")))?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| Error::auth_unavailable(format!("jwt signing failed: {e}")))?;

        let (status, text) = self
            .http
            .post_form(
                &key.token_uri,
                &[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", &jwt),
                ],
            )
            .await?;
        if !status.is_success() {
            return Err(Error::auth_unavailable(format!(
                "token exchange failed with http {}: {}",
                status.as_u16(),
                google_error_message(&text)
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }
        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| Error::internal(format!("parse exchange response: {e}")))?;
        Ok(token.access_token)
    }
}
