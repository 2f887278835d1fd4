//! Poll-until-terminal for remote tasks (video generation, LoRA training).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use serde_json::Value;
use tokio::time::{Instant, sleep_until, timeout_at};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    generate::http::{json_or_error, str_at},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOpts {
    pub interval: Duration,
    /// Wall-clock bound on the whole poll, status requests included.
    pub timeout: Duration,
    pub max_consecutive_failures: u32,
}

impl Default for PollOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
            max_consecutive_failures: 5,
        }
    }
}

/// State a remote task reports on one status query.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskState {
    Pending { detail: Option<String> },
    Completed(Value),
    Failed(String),
}

/// One remote task's status endpoint. An `Err` from `check` counts as transient.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    async fn check(&self) -> CarouselResult<TaskState>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum PollPhase {
    Pending,
    Polling { attempt: u32, failures: u32 },
    Succeeded(Value),
    Failed(String),
    TimedOut(String),
    Exhausted(String),
}

impl PollPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Polling { .. })
    }

    fn into_result(self) -> CarouselResult<Value> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(reason) => Err(CarouselError::generation_failed(reason)),
            Self::TimedOut(msg) | Self::Exhausted(msg) => Err(CarouselError::polling_exhausted(msg)),
            Self::Pending | Self::Polling { .. } => Err(CarouselError::polling_exhausted(
                "poll stopped before reaching a terminal state",
            )),
        }
    }
}

async fn advance(
    phase: PollPhase,
    source: &dyn TaskStatusSource,
    opts: &PollOpts,
    deadline: Instant,
) -> PollPhase {
    let (attempt, failures) = match phase {
        PollPhase::Pending => return PollPhase::Polling { attempt: 0, failures: 0 },
        PollPhase::Polling { attempt, failures } => (attempt, failures),
        terminal => return terminal,
    };

    sleep_until((Instant::now() + opts.interval).min(deadline)).await;
    let timed_out = || PollPhase::TimedOut(format!("no terminal state after {:?}", opts.timeout));
    if Instant::now() >= deadline {
        return timed_out();
    }

    match timeout_at(deadline, source.check()).await {
        Err(_) => timed_out(),
        Ok(Ok(TaskState::Pending { detail })) => {
            tracing::debug!(attempt, detail = detail.as_deref().unwrap_or("-"), "task pending");
            PollPhase::Polling {
                attempt: attempt + 1,
                failures: 0,
            }
        }
        Ok(Ok(TaskState::Completed(value))) => PollPhase::Succeeded(value),
        Ok(Ok(TaskState::Failed(reason))) => PollPhase::Failed(reason),
        Ok(Err(err)) => {
            let failures = failures + 1;
            tracing::warn!(attempt, failures, error = %err, "status check failed");
            if failures >= opts.max_consecutive_failures {
                PollPhase::Exhausted(format!(
                    "{failures} consecutive status failures, last: {err}"
                ))
            } else {
                PollPhase::Polling {
                    attempt: attempt + 1,
                    failures,
                }
            }
        }
    }
}

/// Query `source` every `opts.interval` until it completes, fails, or the bounds run out.
///
/// `Completed` yields the result payload. `Failed` is terminal and never retried. Transient
/// errors are retried until `max_consecutive_failures` in a row; a success resets the count.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn poll_until_terminal(
    source: &dyn TaskStatusSource,
    opts: PollOpts,
) -> CarouselResult<Value> {
    let deadline = Instant::now() + opts.timeout;
    let mut phase = PollPhase::Pending;
    while !phase.is_terminal() {
        phase = advance(phase, source, &opts, deadline).await;
    }
    phase.into_result()
}

/// A request on the fal.ai queue, as returned by a queue submit.
#[derive(Clone, Debug)]
pub struct FalQueueTask {
    http: Client,
    key: String,
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
}

impl FalQueueTask {
    pub fn from_submit(http: Client, key: &str, submit: &Value) -> CarouselResult<Self> {
        Ok(Self {
            http,
            key: key.to_string(),
            request_id: str_at("fal", submit, "/request_id")?.to_string(),
            status_url: str_at("fal", submit, "/status_url")?.to_string(),
            response_url: str_at("fal", submit, "/response_url")?.to_string(),
        })
    }

    async fn get(&self, url: &str) -> CarouselResult<Value> {
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Key {}", self.key))
            .send()
            .await?;
        json_or_error("fal", resp).await
    }
}

fn error_text(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl TaskStatusSource for FalQueueTask {
    async fn check(&self) -> CarouselResult<TaskState> {
        let status = self.get(&self.status_url).await?;
        let state = status.get("status").and_then(Value::as_str).unwrap_or("");
        match state {
            "COMPLETED" => {
                if let Some(reason) = error_text(&status) {
                    return Ok(TaskState::Failed(reason));
                }
                match status.get("response") {
                    Some(resp) if !resp.is_null() => Ok(TaskState::Completed(resp.clone())),
                    _ => Ok(TaskState::Completed(self.get(&self.response_url).await?)),
                }
            }
            "FAILED" | "ERROR" => {
                let reason = error_text(&status).unwrap_or_else(|| {
                    let raw = status.to_string();
                    raw.chars().take(300).collect()
                });
                Ok(TaskState::Failed(reason))
            }
            other => Ok(TaskState::Pending {
                detail: Some(match status.get("queue_position").and_then(Value::as_u64) {
                    Some(pos) => format!("{other} (queue position {pos})"),
                    None => other.to_string(),
                }),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/poll.rs"]
mod tests;
