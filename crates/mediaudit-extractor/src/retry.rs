//! Retry/backoff engine around the generative endpoint
//!
//! Drives one logical extraction request across a ladder of credentials
//! and model variants. Failure classification and the backoff schedule
//! are pure functions so the ladder's behavior can be asserted without
//! real network failures or real time passing; the side-effecting loop
//! lives in [`generate_coerced_with_retry`] and [`run_ladder`].
//!
//! Attempts are strictly serialized: one in-flight call at a time, so a
//! rate-limited endpoint never sees amplified load from this client.

use crate::cancel::RunToken;
use crate::coerce::{coerce_object, Coerced};
use crate::error::ExtractorError;
use crate::json::parse_model_json;
use mediaudit_llm::{GenerateRequest, GenerativeModel, LlmError};
use rand::Rng;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Progress callback for truthful retry status in the UI.
pub type StatusFn = dyn Fn(&str) + Send + Sync;

/// Instruction suffix applied when retrying after invalid model output.
pub const JSON_ONLY_REMINDER: &str =
    "\nATTENTION: The previous attempt failed. Make sure to return ONLY valid JSON.";

/// Temperature used on an invalid-output retry, to escape a bad mode.
pub const RETRY_TEMPERATURE: f32 = 0.2;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Quota exhaustion; worth waiting out
    RateLimited,
    /// Endpoint briefly down; worth waiting out
    Unavailable,
    /// Transport succeeded but the payload is unusable; worth re-asking
    InvalidOutput,
    /// The model id itself is wrong; never retried
    Permanent,
    /// Anything else; never retried
    Other,
}

/// Classify a failure into a retry decision, by variant first and by
/// textual markers for errors that only carry a message.
pub fn classify(error: &LlmError) -> FailureKind {
    match error {
        LlmError::RateLimited(_) => FailureKind::RateLimited,
        LlmError::Unavailable(_) => FailureKind::Unavailable,
        LlmError::ModelNotFound(_) => FailureKind::Permanent,
        LlmError::EmptyResponse | LlmError::InvalidResponse(_) => FailureKind::InvalidOutput,
        LlmError::Configuration(_) => FailureKind::Other,
        LlmError::Http { status, message } => match status {
            429 => FailureKind::RateLimited,
            404 => FailureKind::Permanent,
            502 | 503 | 504 => FailureKind::Unavailable,
            _ => classify_message(message),
        },
        LlmError::Communication(message) => classify_message(message),
    }
}

fn classify_message(message: &str) -> FailureKind {
    let m = message.to_lowercase();
    if m.contains("429") || m.contains("resource_exhausted") || m.contains("resource exhausted")
        || m.contains("too many requests")
    {
        FailureKind::RateLimited
    } else if m.contains("502")
        || m.contains("503")
        || m.contains("504")
        || m.contains("unavailable")
        || m.contains("deadline exceeded")
        || m.contains("timeout")
    {
        FailureKind::Unavailable
    } else {
        FailureKind::Other
    }
}

/// Retry budget and delays.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per (credential, model) pair for transient failures
    pub max_attempts: u32,
    /// Attempts per pair for invalid model output
    pub invalid_output_attempts: u32,
    /// First backoff delay
    pub base_delay: Duration,
    /// Backoff ceiling
    pub max_delay: Duration,
    /// Fixed delay before an invalid-output retry
    pub invalid_output_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            invalid_output_attempts: 2,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(20),
            invalid_output_delay: Duration::from_millis(900),
        }
    }
}

/// Deterministic part of the backoff schedule:
/// `min(max, base * 2^(attempt-1))`.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(max)
}

/// Random jitter of up to 15% of `delay`, with the jitter band clamped
/// to 50-250 ms.
pub fn jitter_for(delay: Duration) -> Duration {
    let band_ms = ((delay.as_millis() as u64 * 15) / 100).clamp(50, 250);
    Duration::from_millis(rand::thread_rng().gen_range(0..band_ms))
}

fn status_line(kind: FailureKind, attempt: u32, max_attempts: u32, delay: Duration) -> String {
    let secs = (delay.as_millis() as f64 / 1000.0).round().max(1.0) as u64;
    match kind {
        FailureKind::RateLimited => format!(
            "Rate limit reached. Attempt {attempt}/{max_attempts}. Waiting {secs}s..."
        ),
        FailureKind::InvalidOutput => format!(
            "Revalidating the AI response. Attempt {attempt}/{max_attempts}. Waiting {secs}s..."
        ),
        _ => format!(
            "Service temporarily unavailable. Attempt {attempt}/{max_attempts}. Waiting {secs}s..."
        ),
    }
}

/// One transport call plus output validation, no retries.
async fn attempt_once<P: GenerativeModel + ?Sized>(
    provider: &P,
    credential: &str,
    model: &str,
    request: &GenerateRequest,
    plausible: &dyn Fn(&Value) -> bool,
) -> Result<Map<String, Value>, LlmError> {
    let text = provider.generate(credential, model, request).await?;
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    let value = parse_model_json(&text).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    match coerce_object(value, plausible) {
        Coerced::Found(map) => Ok(map),
        Coerced::NotFound => Err(LlmError::InvalidResponse(
            "response is not the expected JSON object shape".to_string(),
        )),
    }
}

/// Retry one (credential, model) pair to completion.
///
/// Rate-limited and unavailable failures are retried with exponential
/// backoff; invalid output is retried once with a reframed prompt and a
/// slightly raised temperature; a 404 aborts immediately naming the
/// model; everything else fails fast. The run token is checked after
/// every suspension point so a superseded run never reports a result.
#[allow(clippy::too_many_arguments)]
pub async fn generate_coerced_with_retry<P: GenerativeModel + ?Sized>(
    provider: &P,
    credential: &str,
    model: &str,
    request: &GenerateRequest,
    plausible: &dyn Fn(&Value) -> bool,
    policy: &RetryPolicy,
    on_status: Option<&StatusFn>,
    run: &RunToken,
) -> Result<Map<String, Value>, ExtractorError> {
    let mut attempt = 1u32;
    let mut reframe = false;

    loop {
        let active_request = if reframe {
            let mut adjusted = request.clone();
            adjusted.system_instruction.push_str(JSON_ONLY_REMINDER);
            adjusted.temperature = RETRY_TEMPERATURE;
            adjusted
        } else {
            request.clone()
        };

        let outcome = attempt_once(provider, credential, model, &active_request, plausible).await;
        run.ensure_current()?;

        let error = match outcome {
            Ok(map) => return Ok(map),
            Err(error) => error,
        };

        let kind = classify(&error);
        debug!(model, attempt, ?kind, error = %error, "extraction attempt failed");

        if kind == FailureKind::Permanent {
            return Err(ExtractorError::InvalidModel(model.to_string()));
        }

        let attempt_limit = if kind == FailureKind::InvalidOutput {
            policy.invalid_output_attempts
        } else {
            policy.max_attempts
        };
        let retryable = matches!(
            kind,
            FailureKind::RateLimited | FailureKind::Unavailable | FailureKind::InvalidOutput
        );

        if !retryable || attempt >= attempt_limit {
            return Err(ExtractorError::Llm(error.to_string()));
        }

        let delay = if kind == FailureKind::InvalidOutput {
            reframe = true;
            policy.invalid_output_delay
        } else {
            let base = backoff_delay(attempt, policy.base_delay, policy.max_delay);
            (base + jitter_for(base)).min(policy.max_delay)
        };

        if let Some(status) = on_status {
            status(&status_line(kind, attempt, attempt_limit, delay));
        }

        tokio::time::sleep(delay).await;
        run.ensure_current()?;
        attempt += 1;
    }
}

/// Walk the full credential x model ladder for one logical request.
///
/// Credentials iterate outer, models inner. A superseded run and an
/// invalid model id abort the whole ladder; any other failure moves to
/// the next rung. Exhausting every rung yields an aggregate error
/// carrying the last underlying message.
#[allow(clippy::too_many_arguments)]
pub async fn run_ladder<P: GenerativeModel + ?Sized>(
    provider: &P,
    credentials: &[String],
    models: &[String],
    request: &GenerateRequest,
    plausible: &dyn Fn(&Value) -> bool,
    policy: &RetryPolicy,
    on_status: Option<&StatusFn>,
    run: &RunToken,
) -> Result<Map<String, Value>, ExtractorError> {
    if credentials.is_empty() {
        return Err(ExtractorError::Configuration(
            "No API credentials available".to_string(),
        ));
    }
    if models.is_empty() {
        return Err(ExtractorError::Configuration(
            "No model identifiers configured".to_string(),
        ));
    }

    let mut last_error = String::new();
    for credential in credentials {
        for model in models {
            if let Some(status) = on_status {
                status(&format!("Analyzing via {model}..."));
            }
            match generate_coerced_with_retry(
                provider, credential, model, request, plausible, policy, on_status, run,
            )
            .await
            {
                Ok(map) => return Ok(map),
                Err(err @ (ExtractorError::Stale | ExtractorError::InvalidModel(_))) => {
                    return Err(err)
                }
                Err(err) => {
                    warn!(model, error = %err, "ladder rung exhausted, moving on");
                    last_error = err.to_string();
                }
            }
        }
    }

    Err(ExtractorError::Exhausted(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_variant() {
        assert_eq!(
            classify(&LlmError::RateLimited("quota".into())),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify(&LlmError::Unavailable("down".into())),
            FailureKind::Unavailable
        );
        assert_eq!(
            classify(&LlmError::ModelNotFound("m".into())),
            FailureKind::Permanent
        );
        assert_eq!(classify(&LlmError::EmptyResponse), FailureKind::InvalidOutput);
        assert_eq!(
            classify(&LlmError::InvalidResponse("not json".into())),
            FailureKind::InvalidOutput
        );
        assert_eq!(
            classify(&LlmError::Configuration("no keys".into())),
            FailureKind::Other
        );
    }

    #[test]
    fn test_classify_by_status_code() {
        let http = |status| LlmError::Http {
            status,
            message: "".into(),
        };
        assert_eq!(classify(&http(429)), FailureKind::RateLimited);
        assert_eq!(classify(&http(404)), FailureKind::Permanent);
        assert_eq!(classify(&http(503)), FailureKind::Unavailable);
        assert_eq!(classify(&http(400)), FailureKind::Other);
    }

    #[test]
    fn test_classify_by_textual_marker() {
        let comm = |m: &str| LlmError::Communication(m.to_string());
        assert_eq!(
            classify(&comm("RESOURCE_EXHAUSTED: slow down")),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify(&comm("deadline exceeded while waiting")),
            FailureKind::Unavailable
        );
        assert_eq!(classify(&comm("connection reset")), FailureKind::Other);
    }

    #[test]
    fn test_backoff_schedule_doubles_and_caps() {
        let base = Duration::from_millis(1500);
        let max = Duration::from_secs(20);
        assert_eq!(backoff_delay(1, base, max), Duration::from_millis(1500));
        assert_eq!(backoff_delay(2, base, max), Duration::from_millis(3000));
        assert_eq!(backoff_delay(3, base, max), Duration::from_millis(6000));
        assert_eq!(backoff_delay(4, base, max), Duration::from_millis(12000));
        assert_eq!(backoff_delay(5, base, max), Duration::from_secs(20));
        assert_eq!(backoff_delay(10, base, max), Duration::from_secs(20));
    }

    #[test]
    fn test_jitter_stays_inside_band() {
        for _ in 0..100 {
            let jitter = jitter_for(Duration::from_secs(20));
            assert!(jitter < Duration::from_millis(250));
        }
        for _ in 0..100 {
            // 15% of 100ms is below the band floor, so the floor applies
            let jitter = jitter_for(Duration::from_millis(100));
            assert!(jitter < Duration::from_millis(50));
        }
    }

    #[test]
    fn test_status_lines_distinguish_failure_kinds() {
        let delay = Duration::from_secs(3);
        let rate = status_line(FailureKind::RateLimited, 2, 5, delay);
        let invalid = status_line(FailureKind::InvalidOutput, 1, 2, delay);
        let down = status_line(FailureKind::Unavailable, 4, 5, delay);

        assert!(rate.contains("Rate limit"));
        assert!(rate.contains("2/5"));
        assert!(rate.contains("3s"));
        assert!(invalid.contains("Revalidating"));
        assert!(invalid.contains("1/2"));
        assert!(down.contains("unavailable"));
        assert!(down.contains("4/5"));
    }

    #[test]
    fn test_status_line_reports_at_least_one_second() {
        let line = status_line(FailureKind::InvalidOutput, 1, 2, Duration::from_millis(900));
        assert!(line.contains("1s"));
    }
}
