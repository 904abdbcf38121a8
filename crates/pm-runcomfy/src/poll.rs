use std::time::Duration;
use tracing::{debug, info, warn};
use pm_core::{GenerationRequest, GenerationResult, Job, JobStatus};
use crate::api::GenerationApi;
use crate::error::ClientError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Fixed-interval polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl PollConfig {
    /// Upper bound on the time spent waiting between checks
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Poll `job_id` until it completes, then fetch its outputs.
///
/// Sleeps `config.interval` after every non-terminal check. A failed or
/// cancelled job, or any error from the status call, ends the loop.
pub async fn poll_until_complete<A>(
    api: &A,
    job_id: &str,
    request: &GenerationRequest,
    config: PollConfig,
) -> Result<GenerationResult, ClientError>
where
    A: GenerationApi + ?Sized,
{
    let mut job = Job::new(job_id);

    for attempt in 1..=config.max_attempts {
        let report = api.poll_status(job_id).await?;
        job.observe(report.status, report.queue_position);

        match job.status {
            JobStatus::Completed => {
                info!(job_id, attempt, "generation completed");
                let outputs = api.fetch_result(job_id).await?;
                return Ok(GenerationResult::new(job_id, request, outputs));
            }
            status if status.is_failure() => {
                warn!(job_id, attempt, status = status.as_str(), "generation ended without output");
                return Err(ClientError::GenerationFailed { status, message: None });
            }
            status => {
                debug!(job_id, attempt, status = status.as_str(), queue_position = ?job.queue_position, "generation pending");
            }
        }

        tokio::time::sleep(config.interval).await;
    }

    warn!(job_id, attempts = config.max_attempts, "generation timed out");
    Err(ClientError::Timeout { attempts: config.max_attempts })
}
