use crate::config::Config;
use crate::error::TrackerError;
use crate::models::sample::{BridgeResponse, Sample};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Total attempts, counting the first request.
pub const MAX_ATTEMPTS: u32 = 5;
pub const BASE_BACKOFF: Duration = Duration::from_millis(100);

const RETRYABLE_STATUSES: &[u16] = &[500, 502, 503, 504];

/// Doubling backoff between retries, with a little jitter on top.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    pub max_attempts: u32,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        ExponentialBackoff { base, max_attempts }
    }

    /// Delay before the retry following `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(1u32 << (attempt - 1).min(16))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let spread = (delay.as_millis() as u64 / 4).max(1);
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..spread))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoff::new(BASE_BACKOFF, MAX_ATTEMPTS)
    }
}

/// What a single request attempt came back as. Retryable outcomes carry a
/// message for the exhaustion error; fatal ones are never retried.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Sample),
    Retry(String),
    Fatal(TrackerError),
}

/// Classification of a non-2xx HTTP status per the fetch contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Auth,
    BadQuery,
    Retryable,
    Other,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        401 => StatusClass::Auth,
        400 => StatusClass::BadQuery,
        s if RETRYABLE_STATUSES.contains(&s) => StatusClass::Retryable,
        _ => StatusClass::Other,
    }
}

/// Drive `attempt` until success, a fatal outcome, or the retry budget runs
/// out.
pub async fn fetch_with_retry<F, Fut>(
    backoff: &ExponentialBackoff,
    mut attempt: F,
) -> Result<Sample, TrackerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    let mut last_failure = String::new();
    for n in 1..=backoff.max_attempts {
        match attempt().await {
            AttemptOutcome::Success(sample) => return Ok(sample),
            AttemptOutcome::Fatal(err) => return Err(err),
            AttemptOutcome::Retry(msg) => {
                last_failure = msg;
                if n < backoff.max_attempts {
                    let delay = backoff.jittered(backoff.delay_for(n));
                    log::warn!(
                        "attempt {}/{} failed ({}), retrying in {:?}",
                        n,
                        backoff.max_attempts,
                        last_failure,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(TrackerError::Transient(format!(
        "retries exhausted after {} attempts: {}",
        backoff.max_attempts, last_failure
    )))
}

/// HTTP fetcher for the stats endpoint with bounded retry on transient
/// server errors.
pub struct Fetcher {
    client: reqwest::Client,
    url: String,
    redacted_url: String,
    backoff: ExponentialBackoff,
}

impl Fetcher {
    pub fn new(endpoint: &str, cfg: &Config) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| TrackerError::Config(format!("failed to build HTTP client: {}", e)))?;
        let query = |auth: &str| {
            format!(
                "{}?auth={}&player={}&platform={}&merge=true",
                endpoint, auth, cfg.user, cfg.platform
            )
        };
        Ok(Fetcher {
            client,
            url: query(&cfg.api_key),
            redacted_url: query("<hidden>"),
            backoff: ExponentialBackoff::default(),
        })
    }

    pub async fn fetch(&self) -> Result<Sample, TrackerError> {
        fetch_with_retry(&self.backoff, || self.attempt()).await
    }

    async fn attempt(&self) -> AttemptOutcome {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            // Connection-level failures are as transient as a 503
            Err(e) => return AttemptOutcome::Retry(format!("request failed: {}", e)),
        };
        let status = resp.status();
        if status.is_success() {
            return match resp.json::<BridgeResponse>().await {
                Ok(body) => AttemptOutcome::Success(Sample::from(body)),
                Err(e) => AttemptOutcome::Fatal(TrackerError::MalformedResponse(e.to_string())),
            };
        }
        match classify_status(status.as_u16()) {
            StatusClass::Auth => {
                AttemptOutcome::Fatal(TrackerError::Auth(server_error_message(resp).await))
            }
            StatusClass::BadQuery => AttemptOutcome::Fatal(TrackerError::InvalidQuery {
                message: server_error_message(resp).await,
                redacted_url: self.redacted_url.clone(),
            }),
            StatusClass::Retryable => AttemptOutcome::Retry(format!("server returned {}", status)),
            StatusClass::Other => AttemptOutcome::Fatal(TrackerError::Transient(format!(
                "unexpected status {}",
                status
            ))),
        }
    }
}

/// The API reports failures as `{"Error": "..."}`.
async fn server_error_message(resp: reqwest::Response) -> String {
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("Error")
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => "no error detail from server".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_backoff() -> ExponentialBackoff {
        ExponentialBackoff::new(Duration::from_millis(1), MAX_ATTEMPTS)
    }

    fn test_sample() -> Sample {
        Sample {
            total_lp: 16300,
            rank_name: "Platinum".into(),
            is_online: true,
            state_text: "In match".into(),
            legend_name: "Pathfinder".into(),
        }
    }

    /// Scripted attempt sequence standing in for the HTTP transport.
    fn scripted(
        outcomes: Vec<u16>,
        attempts: std::rc::Rc<std::cell::Cell<u32>>,
    ) -> impl FnMut() -> std::future::Ready<AttemptOutcome> {
        let mut remaining = outcomes.into_iter();
        move || {
            attempts.set(attempts.get() + 1);
            let outcome = match remaining.next() {
                Some(200) => AttemptOutcome::Success(test_sample()),
                Some(401) => AttemptOutcome::Fatal(TrackerError::Auth("bad key".into())),
                Some(status) => AttemptOutcome::Retry(format!("server returned {}", status)),
                None => panic!("ran out of scripted outcomes"),
            };
            std::future::ready(outcome)
        }
    }

    #[tokio::test]
    async fn test_recovers_within_retry_budget() {
        let attempts = std::rc::Rc::new(std::cell::Cell::new(0));
        let result = fetch_with_retry(
            &fast_backoff(),
            scripted(vec![503, 503, 503, 200], attempts.clone()),
        )
        .await;
        assert_eq!(result.unwrap(), test_sample());
        assert_eq!(attempts.get(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_transient_failure() {
        let attempts = std::rc::Rc::new(std::cell::Cell::new(0));
        let result = fetch_with_retry(
            &fast_backoff(),
            scripted(vec![503, 503, 503, 503, 503, 503], attempts.clone()),
        )
        .await;
        assert!(matches!(result, Err(TrackerError::Transient(_))));
        assert_eq!(attempts.get(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_auth_failure_is_never_retried() {
        let attempts = std::rc::Rc::new(std::cell::Cell::new(0));
        let result = fetch_with_retry(&fast_backoff(), scripted(vec![401], attempts.clone())).await;
        assert!(matches!(result, Err(TrackerError::Auth(_))));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(401), StatusClass::Auth);
        assert_eq!(classify_status(400), StatusClass::BadQuery);
        for status in [500, 502, 503, 504] {
            assert_eq!(classify_status(status), StatusClass::Retryable);
        }
        assert_eq!(classify_status(404), StatusClass::Other);
        assert_eq!(classify_status(429), StatusClass::Other);
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(400));
        assert_eq!(backoff.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_credential_is_redacted_in_echoed_url() {
        let cfg = Config {
            new: false,
            api_key: "super-secret".into(),
            user: "player1".into(),
            platform: "PC".into(),
            root: String::new(),
            poll_interval_minutes: 1,
        };
        let fetcher = Fetcher::new("https://example.test/bridge", &cfg).unwrap();
        assert!(!fetcher.redacted_url.contains("super-secret"));
        assert!(fetcher.redacted_url.contains("auth=<hidden>"));
        assert!(fetcher.url.contains("auth=super-secret"));
    }
}
