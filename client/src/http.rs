//! `reqwest`-backed implementation of [`ElectionApi`].

use std::time::Duration;

use ballot_types::{
    Candidate, Election, ErrorBody, LoginRequest, LoginResponse, NewCandidate, NewElection,
    RegisterRequest, VoteRequest,
};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::ElectionApi;
use crate::error::ClientError;

/// Default whole-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the election backend.
///
/// Wraps `reqwest::Client` with the backend's base URL (e.g.
/// `http://localhost:5000`) and exposes one typed method per API call.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client with the default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeouts(base_url, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        decode(check(response).await?).await
    }

    async fn post(
        &self,
        segments: &[&str],
        body: &impl Serialize,
    ) -> Result<Response, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        check(response).await
    }
}

/// Turn a non-2xx response into [`ClientError::Status`].
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

impl ElectionApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self.post(&["api", "auth", "login"], request).await?;
        decode(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        self.post(&["api", "auth", "register"], request).await?;
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>, ClientError> {
        self.get_json(&["api", "candidates", "getcandidates"]).await
    }

    async fn add_candidate(&self, candidate: &NewCandidate) -> Result<(), ClientError> {
        self.post(&["api", "candidates", "addcandidate"], candidate)
            .await?;
        Ok(())
    }

    async fn list_elections(&self) -> Result<Vec<Election>, ClientError> {
        self.get_json(&["api", "elections", "getelections"]).await
    }

    async fn add_election(&self, election: &NewElection) -> Result<(), ClientError> {
        self.post(&["api", "elections", "addelection"], election)
            .await?;
        Ok(())
    }

    async fn cast_vote(&self, election_id: &str, candidate_name: &str) -> Result<(), ClientError> {
        let body = VoteRequest {
            candidate_name: candidate_name.to_string(),
        };
        self.post(&["api", "elections", election_id, "vote"], &body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_segments() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        let url = client.endpoint(&["api", "elections", "getelections"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/elections/getelections");
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_ids() {
        let client = ApiClient::new("http://example.org/ballot/").unwrap();
        let url = client
            .endpoint(&["api", "elections", "E 1/x", "vote"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.org/ballot/api/elections/E%201%2Fx/vote"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:admin@example.org"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client = ApiClient::with_timeouts(
            "http://127.0.0.1:1",
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.list_elections().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
