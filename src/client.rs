use crate::auth::ImpersonatedToken;
use crate::error::{remote_error, Error};
use crate::http::HttpClient;
use crate::mapping::{Operation, SpeechRecognitionResult};
use crate::request::LongRunningRecognizeRequest;
use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Opaque reference to a submitted remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    name: String,
}

impl OperationHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of one submission: the recognition results when waiting, or the
/// unresolved handle when not.
#[derive(Debug)]
pub enum Submission {
    Completed(Vec<SpeechRecognitionResult>),
    Pending(OperationHandle),
}

/// Submits long-running recognition jobs with one brokered token. The token is
/// owned by this client for a single submission and is not reused across
/// invocations.
pub struct SpeechClient {
    http: HttpClient,
    endpoint: String,
    token: String,
    poll_interval: Duration,
}

impl SpeechClient {
    pub fn new(http: HttpClient, endpoint: impl Into<String>, token: ImpersonatedToken) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.access_token,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|e| Error::internal(format!("invalid auth header: {e}")))?,
        );
        Ok(headers)
    }

    /// Submits the job and returns the operation handle without waiting.
    pub async fn long_running_recognize(
        &self,
        request: &LongRunningRecognizeRequest,
    ) -> Result<OperationHandle, Error> {
        let url = format!("{}/v1/speech:longrunningrecognize", self.endpoint);
        let body = serde_json::to_string(request)
            .map_err(|e| Error::internal(format!("serialize recognize request: {e}")))?;
        let (status, text) = self.http.post_json(&url, self.headers()?, body).await?;
        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &text));
        }

        #[derive(Deserialize)]
        struct SubmittedOperation {
            name: String,
        }
        let op: SubmittedOperation = serde_json::from_str(&text)
            .map_err(|e| Error::internal(format!("parse operation: {e}")))?;
        debug!("submitted operation {}", op.name);
        Ok(OperationHandle { name: op.name })
    }

    /// One poll of the remote operation. No local state changes.
    pub async fn get_operation(&self, handle: &OperationHandle) -> Result<Operation, Error> {
        let url = format!("{}/v1/operations/{}", self.endpoint, handle.name());
        let (status, text) = self.http.get(&url, self.headers()?).await?;
        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| Error::internal(format!("parse operation: {e}")))
    }

    /// Polls until the operation finishes or `timeout` elapses. A timeout is
    /// local abandonment only: no cancel request is sent, and the remote job
    /// continues running and writing to the output URI out-of-band.
    pub async fn wait(
        &self,
        handle: &OperationHandle,
        timeout: Duration,
    ) -> Result<Vec<SpeechRecognitionResult>, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            let op = self.get_operation(handle).await?;
            if op.done {
                if let Some(err) = op.error {
                    // Failed jobs surface the provider status verbatim.
                    return Err(Error::RemoteService {
                        code: err.code as u16,
                        status: String::new(),
                        message: err.message,
                    });
                }
                return Ok(op.response.map(|r| r.results).unwrap_or_default());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout { waited: timeout });
            }
            let pause = self.poll_interval.min(deadline - now);
            trace!("operation {} pending, next poll in {pause:?}", handle.name());
            tokio::time::sleep(pause).await;
        }
    }

    /// Single entry point for both modes: submit once, then either block on the
    /// result within `timeout` or hand back the unresolved handle immediately.
    pub async fn submit(
        &self,
        request: &LongRunningRecognizeRequest,
        wait: bool,
        timeout: Duration,
    ) -> Result<Submission, Error> {
        let handle = self.long_running_recognize(request).await?;
        if !wait {
            return Ok(Submission::Pending(handle));
        }
        let results = self.wait(&handle, timeout).await?;
        Ok(Submission::Completed(results))
    }
}
