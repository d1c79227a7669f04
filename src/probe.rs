use crate::constants::NEGATIVE_PROBE_PATH;
use crate::errors::ScanError;
use crate::model::Candidate;
use reqwest::header::{CACHE_CONTROL, SERVER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Outcome of probing one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    Rejected,
}

/// Connection prober: runs the verification protocol against a single
/// candidate. Performs network I/O only and returns a verdict; shared
/// scan state is never touched from here.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    base_timeout: Duration,
    max_attempts: u32,
}

impl Prober {
    pub fn new(base_timeout_ms: u64, max_attempts: u32) -> Result<Self, ScanError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_timeout: Duration::from_millis(base_timeout_ms),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Timeout ladder: base × 2^attempt
    fn attempt_timeout(&self, attempt: u32) -> Duration {
        self.base_timeout * 2u32.saturating_pow(attempt)
    }

    /// Probe a candidate end to end: stream request first, then the
    /// negative control against a path that must not exist. An absent
    /// candidate (a queue race handing a worker an empty pop) is rejected
    /// without error.
    pub async fn probe(&self, candidate: Option<&Candidate>) -> Verdict {
        let Some(candidate) = candidate else {
            return Verdict::Rejected;
        };

        if !self.stream_responds(candidate).await {
            return Verdict::Rejected;
        }

        self.negative_control(candidate).await
    }

    /// Primary probe: GET the type's stream path with the candidate's
    /// credentials. True only for a 200 that also carries the vendor
    /// marker when the type declares one.
    async fn stream_responds(&self, candidate: &Candidate) -> bool {
        let url = format!(
            "http://{}:{}/{}",
            candidate.host.ip, candidate.port, candidate.camera_type.stream_path
        );

        let mut attempt = 0u32;
        loop {
            let request = self
                .client
                .get(&url)
                .basic_auth(&candidate.username, Some(&candidate.password))
                .header(CACHE_CONTROL, "no-cache")
                .timeout(self.attempt_timeout(attempt));

            match request.send().await {
                Ok(response) => {
                    if response.status() != StatusCode::OK {
                        return false;
                    }

                    // Some devices don't send a Server header at all;
                    // unreadable counts the same as absent
                    if let Some(marker) = &candidate.camera_type.server_header_marker {
                        let matched = response
                            .headers()
                            .get(SERVER)
                            .and_then(|value| value.to_str().ok())
                            .map(|value| value.to_lowercase().contains(marker))
                            .unwrap_or(false);
                        if !matched {
                            return false;
                        }
                    }

                    return true;
                }
                Err(err) => {
                    // 401/403: the default credentials don't work here,
                    // and no retry will change that
                    if matches!(
                        err.status(),
                        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
                    ) {
                        return false;
                    }

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return false;
                    }
                }
            }
        }
    }

    /// Negative control: request a path no camera serves. Catch-all
    /// servers answer 200 for anything, which makes the primary pass
    /// untrustworthy; only a 404 confirms the hit.
    async fn negative_control(&self, candidate: &Candidate) -> Verdict {
        let url = format!(
            "http://{}:{}/{}",
            candidate.host.ip, candidate.port, NEGATIVE_PROBE_PATH
        );

        let mut attempt = 0u32;
        loop {
            let request = self
                .client
                .get(&url)
                .header(CACHE_CONTROL, "no-cache")
                .timeout(self.attempt_timeout(attempt));

            match request.send().await {
                // Anything other than a clean 404 fails closed
                Ok(response) => {
                    return match response.status() {
                        StatusCode::NOT_FOUND => Verdict::Confirmed,
                        _ => Verdict::Rejected,
                    };
                }
                Err(err) => {
                    if err.status() == Some(StatusCode::NOT_FOUND) {
                        return Verdict::Confirmed;
                    }

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Verdict::Rejected;
                    }
                }
            }
        }
    }
}
