use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use quiz_core::model::Nickname;

use crate::error::LeaderboardError;

/// Destination for a finished attempt's score.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Record `score` under `nickname`.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` when the score could not be recorded; the
    /// caller may retry.
    async fn submit(&self, nickname: &Nickname, score: u32) -> Result<(), LeaderboardError>;
}

#[derive(Clone, Debug)]
pub struct LeaderboardConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl LeaderboardConfig {
    /// Read `QUIZ_LEADERBOARD_URL` and the optional `QUIZ_LEADERBOARD_TOKEN`.
    ///
    /// Returns `None` when the URL is unset, blank, or not a valid URL.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let raw = env::var("QUIZ_LEADERBOARD_URL").ok()?;
        let base_url = match Url::parse(raw.trim()) {
            Ok(url) => url,
            Err(err) => {
                if !raw.trim().is_empty() {
                    warn!(error = %err, "ignoring invalid QUIZ_LEADERBOARD_URL");
                }
                return None;
            }
        };
        let token = env::var("QUIZ_LEADERBOARD_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Some(Self { base_url, token })
    }

    #[must_use]
    pub fn scores_endpoint(&self) -> String {
        format!("{}/scores", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// HTTP leaderboard: `POST {base_url}/scores` with `{nickname, score}`.
#[derive(Clone)]
pub struct LeaderboardClient {
    client: Client,
    config: Option<LeaderboardConfig>,
}

impl LeaderboardClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LeaderboardConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<LeaderboardConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl ScoreSink for LeaderboardClient {
    async fn submit(&self, nickname: &Nickname, score: u32) -> Result<(), LeaderboardError> {
        let config = self.config.as_ref().ok_or(LeaderboardError::Disabled)?;

        let mut request = self
            .client
            .post(config.scores_endpoint())
            .json(&ScoreRequest { nickname, score });
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeaderboardError::Rejected {
                status,
                reason: rejection_reason(status, &body),
            });
        }

        info!(%nickname, score, "score submitted to leaderboard");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    nickname: &'a Nickname,
    score: u32,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    #[serde(alias = "error", alias = "message")]
    reason: String,
}

fn rejection_reason(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RejectionBody>(body) {
        return parsed.reason;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

// ─── once-only submission ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    AlreadySubmitted,
}

/// One attempt's score on its way to a [`ScoreSink`].
///
/// Success is recorded once; after that the sink is never called again.
/// Failures leave the submission pending so it can be retried.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    nickname: Nickname,
    score: u32,
    status: SubmissionStatus,
    attempts: u32,
}

impl ScoreSubmission {
    #[must_use]
    pub fn new(nickname: Nickname, score: u32) -> Self {
        Self {
            nickname,
            score,
            status: SubmissionStatus::Pending,
            attempts: 0,
        }
    }

    /// Validate what the player typed and prepare their score for sending.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Nickname` for a blank or over-long name.
    pub fn for_player(raw_nickname: &str, score: u32) -> Result<Self, LeaderboardError> {
        Ok(Self::new(Nickname::parse(raw_nickname)?, score))
    }

    #[must_use]
    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Send the score unless it has already been accepted.
    ///
    /// # Errors
    ///
    /// Returns the sink's error; the submission stays pending.
    pub async fn submit(&mut self, sink: &dyn ScoreSink) -> Result<SubmitOutcome, LeaderboardError> {
        if self.status == SubmissionStatus::Submitted {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        self.attempts += 1;
        match sink.submit(&self.nickname, self.score).await {
            Ok(()) => {
                self.status = SubmissionStatus::Submitted;
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(attempt = self.attempts, error = %err, "score submission failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakySink {
        failures_left: Mutex<u32>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl FlakySink {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Mutex::new(times),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScoreSink for FlakySink {
        async fn submit(&self, nickname: &Nickname, score: u32) -> Result<(), LeaderboardError> {
            self.calls
                .lock()
                .unwrap()
                .push((nickname.as_str().to_string(), score));
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(LeaderboardError::Rejected {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    reason: "try later".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn success_is_reported_once() {
        let sink = FlakySink::failing(0);
        let mut submission = ScoreSubmission::new(Nickname::parse("ada").unwrap(), 141);

        assert_eq!(submission.submit(&sink).await.unwrap(), SubmitOutcome::Submitted);
        assert_eq!(
            submission.submit(&sink).await.unwrap(),
            SubmitOutcome::AlreadySubmitted
        );
        assert_eq!(sink.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_can_be_retried() {
        let sink = FlakySink::failing(1);
        let mut submission = ScoreSubmission::new(Nickname::parse("ada").unwrap(), 90);

        let err = submission.submit(&sink).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Rejected { .. }));
        assert_eq!(submission.status(), SubmissionStatus::Pending);

        assert_eq!(submission.submit(&sink).await.unwrap(), SubmitOutcome::Submitted);
        assert_eq!(submission.attempts(), 2);
        assert_eq!(
            sink.calls.lock().unwrap().as_slice(),
            &[("ada".to_string(), 90), ("ada".to_string(), 90)]
        );
    }

    #[test]
    fn player_nickname_is_validated_before_sending() {
        let submission = ScoreSubmission::for_player("  ada  ", 120).unwrap();
        assert_eq!(submission.nickname().as_str(), "ada");
        assert_eq!(submission.status(), SubmissionStatus::Pending);

        let err = ScoreSubmission::for_player("   ", 120).unwrap_err();
        assert!(matches!(err, LeaderboardError::Nickname(_)));
        let err = ScoreSubmission::for_player(&"x".repeat(21), 120).unwrap_err();
        assert!(matches!(err, LeaderboardError::Nickname(_)));
    }

    #[tokio::test]
    async fn unconfigured_client_is_disabled() {
        let client = LeaderboardClient::new(None);
        assert!(!client.enabled());
        let err = client
            .submit(&Nickname::parse("ada").unwrap(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::Disabled));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = LeaderboardConfig {
            base_url: Url::parse("https://scores.example.com/api/").unwrap(),
            token: None,
        };
        assert_eq!(config.scores_endpoint(), "https://scores.example.com/api/scores");
    }

    #[test]
    fn rejection_reason_prefers_json_body() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(rejection_reason(status, r#"{"error":"nickname taken"}"#), "nickname taken");
        assert_eq!(rejection_reason(status, "plain text"), "plain text");
        assert_eq!(rejection_reason(status, ""), "Bad Request");
    }
}
