use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use pm_core::{GenerationOutputs, GenerationRequest, GenerationResult, Job, JobStatus};
use pm_runcomfy::{GenerationApi, PollConfig, poll_until_complete};
use crate::error::AppError;
use crate::ledger::{CreditHold, CreditLedger};
use crate::storage::{ObjectStore, Upload, store_upload};

/// Settled jobs are remembered this many poll windows before being forgotten
const SETTLED_RETENTION_FACTOR: u32 = 10;

/// A submitted job whose credits are not settled yet
#[derive(Debug)]
struct PendingJob {
    request: GenerationRequest,
    hold: CreditHold,
    job: Job,
    submitted_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Charged,
    Refunded,
}

#[derive(Debug)]
enum JobSlot {
    Pending(PendingJob),
    Settled { settlement: Settlement, at: Instant },
}

impl JobSlot {
    fn settled(settlement: Settlement) -> Self {
        Self::Settled { settlement, at: Instant::now() }
    }
}

/// Result of a single status check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub job_id: String,
    pub status: JobStatus,
    pub queue_position: Option<u32>,
    pub outputs: Option<GenerationOutputs>,
}

/// Owns the credit ledger, the session history and the jobs it submitted.
///
/// Every credit movement goes through a [`CreditHold`]. A job slot moves
/// from pending to settled exactly once, under the table lock, and the hold
/// is committed (charged) or dropped (refunded) by whoever made that move.
/// Refunded jobs never hand out outputs.
pub struct Studio {
    api: Arc<dyn GenerationApi>,
    store: Arc<dyn ObjectStore>,
    ledger: Arc<CreditLedger>,
    poll: PollConfig,
    history: RwLock<Vec<GenerationResult>>,
    jobs: Mutex<HashMap<String, JobSlot>>,
}

impl Studio {
    pub fn new(
        api: Arc<dyn GenerationApi>,
        store: Arc<dyn ObjectStore>,
        ledger: CreditLedger,
        poll: PollConfig,
    ) -> Self {
        Self {
            api,
            store,
            ledger: Arc::new(ledger),
            poll,
            history: RwLock::new(Vec::new()),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn credits(&self) -> u64 {
        self.ledger.balance()
    }

    /// Outstanding holds are not refunded after a reset
    pub fn reset_credits(&self) {
        self.ledger.reset();
        info!(balance = self.ledger.balance(), "credits reset");
    }

    /// Newest first
    pub async fn history(&self) -> Vec<GenerationResult> {
        self.history.read().await.clone()
    }

    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    async fn record(&self, result: GenerationResult) {
        self.history.write().await.insert(0, result);
    }

    fn hold_credits(&self, amount: u64) -> Result<CreditHold, AppError> {
        self.ledger.hold(amount).ok_or_else(|| AppError::InsufficientCredits {
            required: amount,
            available: self.ledger.balance(),
        })
    }

    pub async fn upload(&self, upload: Upload) -> Result<String, AppError> {
        Ok(store_upload(self.store.as_ref(), upload).await?)
    }

    /// Debit credits, upload the image and submit the job.
    ///
    /// The job stays pending until [`Studio::check`] observes its end, it is
    /// cancelled, or [`Studio::expire_stale`] gives up on it.
    pub async fn submit(&self, request: GenerationRequest, upload: Upload) -> Result<String, AppError> {
        let hold = self.hold_credits(request.cost())?;
        let image_url = self.upload(upload).await?;
        let job_id = self.api.submit(&image_url, &request).await?;

        info!(
            job_id = %job_id,
            kind = request.kind.as_str(),
            style = %request.style,
            cost = hold.amount(),
            "generation submitted"
        );

        let pending = PendingJob {
            request,
            hold,
            job: Job::new(job_id.clone()),
            submitted_at: Instant::now(),
        };
        self.jobs.lock().await.insert(job_id.clone(), JobSlot::Pending(pending));

        Ok(job_id)
    }

    /// Run the whole submit, poll and fetch chain for one request
    pub async fn generate(&self, request: GenerationRequest, upload: Upload) -> Result<GenerationResult, AppError> {
        let hold = self.hold_credits(request.cost())?;
        let image_url = self.upload(upload).await?;
        let job_id = self.api.submit(&image_url, &request).await?;
        info!(job_id = %job_id, kind = request.kind.as_str(), "generation submitted, waiting for completion");

        let result = poll_until_complete(self.api.as_ref(), &job_id, &request, self.poll).await?;

        hold.commit();
        self.record(result.clone()).await;
        Ok(result)
    }

    /// Move a pending slot to settled, handing back the pending job
    async fn settle(&self, job_id: &str, settlement: Settlement) -> Option<PendingJob> {
        let mut jobs = self.jobs.lock().await;
        let slot = jobs.get_mut(job_id)?;
        if !matches!(slot, JobSlot::Pending(_)) {
            return None;
        }

        match std::mem::replace(slot, JobSlot::settled(settlement)) {
            JobSlot::Pending(pending) => Some(pending),
            JobSlot::Settled { .. } => None,
        }
    }

    async fn settlement(&self, job_id: &str) -> Result<Option<Settlement>, AppError> {
        match self.jobs.lock().await.get(job_id) {
            Some(JobSlot::Pending(_)) => Ok(None),
            Some(JobSlot::Settled { settlement, .. }) => Ok(Some(*settlement)),
            None => Err(AppError::UnknownJob(job_id.to_string())),
        }
    }

    /// Settle a pending job as failed, refunding its credits
    async fn abandon(&self, job_id: &str, reason: &str) {
        if let Some(pending) = self.settle(job_id, Settlement::Refunded).await {
            warn!(job_id, reason, refund = pending.hold.amount(), "generation abandoned");
        }
    }

    /// One status check. Settles the credits of a pending job once it
    /// reaches a terminal status; any client error refunds it.
    pub async fn check(&self, job_id: &str) -> Result<CheckOutcome, AppError> {
        if self.settlement(job_id).await? == Some(Settlement::Refunded) {
            return Err(AppError::JobSettled(job_id.to_string()));
        }

        let report = match self.api.poll_status(job_id).await {
            Ok(report) => report,
            Err(e) => {
                self.abandon(job_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        let (status, queue_position) = {
            let mut jobs = self.jobs.lock().await;
            match jobs.get_mut(job_id) {
                Some(JobSlot::Pending(p)) => {
                    p.job.observe(report.status, report.queue_position);
                    (p.job.status, p.job.queue_position)
                }
                _ => (report.status, report.queue_position),
            }
        };

        let mut outcome = CheckOutcome {
            job_id: job_id.to_string(),
            status,
            queue_position,
            outputs: None,
        };

        match status {
            JobStatus::Completed => {
                let outputs = match self.api.fetch_result(job_id).await {
                    Ok(outputs) => outputs,
                    Err(e) => {
                        self.abandon(job_id, &e.to_string()).await;
                        return Err(e.into());
                    }
                };

                if let Some(pending) = self.settle(job_id, Settlement::Charged).await {
                    let PendingJob { request, hold, .. } = pending;
                    hold.commit();
                    self.record(GenerationResult::new(job_id, &request, outputs.clone())).await;
                    info!(job_id, outputs = outputs.len(), "generation completed");
                } else if self.settlement(job_id).await? == Some(Settlement::Refunded) {
                    // Refunded while the result was being fetched
                    return Err(AppError::JobSettled(job_id.to_string()));
                }
                outcome.outputs = Some(outputs);
            }
            s if s.is_failure() => {
                self.abandon(job_id, s.as_str()).await;
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Cancel a pending job remotely and refund it
    pub async fn cancel(&self, job_id: &str) -> Result<(), AppError> {
        if self.settlement(job_id).await?.is_some() {
            return Err(AppError::JobSettled(job_id.to_string()));
        }
        let Some(pending) = self.settle(job_id, Settlement::Refunded).await else {
            return Err(AppError::JobSettled(job_id.to_string()));
        };

        if let Err(e) = self.api.cancel(job_id).await {
            self.jobs.lock().await.insert(job_id.to_string(), JobSlot::Pending(pending));
            return Err(e.into());
        }

        warn!(job_id, refund = pending.hold.amount(), "generation cancelled by user");
        Ok(())
    }

    /// Refund and cancel pending jobs older than the poll window, and forget
    /// settled jobs past their retention. Returns how many jobs expired.
    pub async fn expire_stale(&self) -> usize {
        let max_age = self.poll.max_wait();
        let retention = max_age * SETTLED_RETENTION_FACTOR;

        let expired: Vec<(String, PendingJob)> = {
            let mut jobs = self.jobs.lock().await;
            jobs.retain(|_, slot| match slot {
                JobSlot::Settled { at, .. } => at.elapsed() < retention,
                JobSlot::Pending(_) => true,
            });

            let stale: Vec<String> = jobs
                .iter()
                .filter_map(|(id, slot)| match slot {
                    JobSlot::Pending(p) if p.submitted_at.elapsed() >= max_age => Some(id.clone()),
                    _ => None,
                })
                .collect();

            stale
                .into_iter()
                .filter_map(|id| match jobs.insert(id.clone(), JobSlot::settled(Settlement::Refunded)) {
                    Some(JobSlot::Pending(pending)) => Some((id, pending)),
                    _ => None,
                })
                .collect()
        };

        for (job_id, pending) in &expired {
            if let Err(e) = self.api.cancel(job_id).await {
                debug!(job_id = %job_id, error = %e, "remote cancel of expired job failed");
            }
            warn!(job_id = %job_id, refund = pending.hold.amount(), "pending generation expired");
        }

        expired.len()
    }

    /// Run [`Studio::expire_stale`] once per poll window
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let studio = Arc::clone(self);
        let period = studio.poll.max_wait().max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                studio.expire_stale().await;
            }
        })
    }
}
