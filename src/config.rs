use crate::error::Error;

pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iamcredentials.googleapis.com";

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const STORAGE_READ_WRITE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Environment-driven configuration. Credentials are resolved here so the
/// broker never touches the environment itself.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub speech_endpoint: String,
    pub iam_endpoint: String,
    pub timeout_secs: u64,
    pub log_level: Option<String>,
    /// Service account to impersonate for the speech call.
    pub target_principal: Option<String>,
    /// Pre-issued ambient bearer token, if any. Takes precedence over the key.
    pub access_token: Option<String>,
    /// Service account key JSON (the ambient credential), if any.
    pub credentials_json: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, Error> {
        let timeout_secs = std::env::var("SPEECH_PROVIDER_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        let speech_endpoint = std::env::var("SPEECH_PROVIDER_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_SPEECH_ENDPOINT.to_string());
        let iam_endpoint = std::env::var("SPEECH_IAM_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_IAM_ENDPOINT.to_string());
        let log_level = std::env::var("SPEECH_PROVIDER_LOG_LEVEL").ok();
        let target_principal = std::env::var("SPEECH_IMPERSONATE_SERVICE_ACCOUNT").ok();
        let access_token = std::env::var("GOOGLE_ACCESS_TOKEN").ok();

        // GOOGLE_APPLICATION_CREDENTIALS may hold a path or the key JSON itself.
        let credentials_json = match std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            Ok(path_or_json) => {
                if std::path::Path::new(&path_or_json).exists() {
                    Some(std::fs::read_to_string(&path_or_json).map_err(|e| {
                        Error::auth_unavailable(format!("cannot read credentials file: {e}"))
                    })?)
                } else {
                    Some(path_or_json)
                }
            }
            Err(_) => None,
        };

        Ok(Self {
            speech_endpoint,
            iam_endpoint,
            timeout_secs,
            log_level,
            target_principal,
            access_token,
            credentials_json,
        })
    }
}
