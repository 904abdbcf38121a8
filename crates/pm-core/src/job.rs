use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Failed and cancelled jobs both end the attempt without output
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Completed | Self::Cancelled | Self::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` respects queued -> running -> terminal.
    /// Repeating the same status is allowed; leaving a terminal status is not.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// Locally observed view of a remote job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub queue_position: Option<u32>,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            queue_position: None,
        }
    }

    /// Record a status reported by the remote service.
    ///
    /// Backward transitions are dropped and logged; returns whether the
    /// observation was applied.
    pub fn observe(&mut self, status: JobStatus, queue_position: Option<u32>) -> bool {
        if !self.status.can_transition_to(status) {
            warn!(
                job_id = %self.id,
                from = self.status.as_str(),
                to = status.as_str(),
                "ignoring backward job status transition"
            );
            return false;
        }

        self.status = status;
        self.queue_position = if status == JobStatus::Queued { queue_position } else { None };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let mut job = Job::new("req-1");
        assert!(job.observe(JobStatus::Queued, Some(3)));
        assert_eq!(job.queue_position, Some(3));
        assert!(job.observe(JobStatus::Running, None));
        assert!(job.observe(JobStatus::Completed, None));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.queue_position, None);
    }

    #[test]
    fn test_queued_can_jump_to_terminal() {
        let mut job = Job::new("req-2");
        assert!(job.observe(JobStatus::Failed, None));
        assert!(job.status.is_failure());
    }

    #[test]
    fn test_backward_transitions_are_ignored() {
        let mut job = Job::new("req-3");
        job.observe(JobStatus::Running, None);
        assert!(!job.observe(JobStatus::Queued, Some(1)));
        assert_eq!(job.status, JobStatus::Running);

        job.observe(JobStatus::Cancelled, None);
        assert!(!job.observe(JobStatus::Running, None));
        assert!(!job.observe(JobStatus::Completed, None));
        assert_eq!(job.status, JobStatus::Cancelled);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Queued.is_active());
        assert!(JobStatus::Running.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Completed.is_failure());
        assert!(JobStatus::Cancelled.is_failure());
    }
}
