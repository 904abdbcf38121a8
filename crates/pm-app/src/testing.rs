//! Fakes shared by the studio and route tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use async_trait::async_trait;
use pm_core::{GenerationOutputs, GenerationRequest, JobStatus};
use pm_runcomfy::{ClientError, GenerationApi, StatusReport};
use crate::storage::{ObjectStore, StorageError};

/// PNG signature followed by the start of an IHDR chunk
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01";

/// Generation service replaying scripted statuses; the last status repeats
pub struct FakeApi {
    pub fail_submit: bool,
    pub fail_status: bool,
    /// Number of leading status checks that fail before the script plays
    pub status_failures: AtomicU32,
    pub fail_cancel: bool,
    pub outputs: GenerationOutputs,
    pub statuses: Mutex<VecDeque<JobStatus>>,
    pub submits: AtomicU32,
    pub cancels: AtomicU32,
    pub last_image_url: Mutex<Option<String>>,
}

impl FakeApi {
    pub fn new(statuses: &[JobStatus]) -> Self {
        Self {
            fail_submit: false,
            fail_status: false,
            status_failures: AtomicU32::new(0),
            fail_cancel: false,
            outputs: GenerationOutputs {
                images: vec!["https://cdn.example.com/out.png".into()],
                videos: vec![],
            },
            statuses: Mutex::new(statuses.iter().copied().collect()),
            submits: AtomicU32::new(0),
            cancels: AtomicU32::new(0),
            last_image_url: Mutex::new(None),
        }
    }

    pub fn completing() -> Self {
        Self::new(&[JobStatus::Queued, JobStatus::Running, JobStatus::Completed])
    }

    pub fn submits(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> u32 {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn last_image_url(&self) -> Option<String> {
        self.last_image_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationApi for FakeApi {
    async fn submit(&self, image_url: &str, _request: &GenerationRequest) -> Result<String, ClientError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_image_url.lock().unwrap() = Some(image_url.to_string());
        if self.fail_submit {
            return Err(ClientError::Submission("HTTP 500 Internal Server Error: overloaded".into()));
        }
        Ok(format!("req-{n}"))
    }

    async fn poll_status(&self, _job_id: &str) -> Result<StatusReport, ClientError> {
        let scripted_failure = self
            .status_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if self.fail_status || scripted_failure {
            return Err(ClientError::Status("HTTP 503 Service Unavailable: ".into()));
        }

        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            *statuses.front().unwrap()
        };
        let queue_position = (status == JobStatus::Queued).then_some(1);
        Ok(StatusReport { status, queue_position })
    }

    async fn fetch_result(&self, _job_id: &str) -> Result<GenerationOutputs, ClientError> {
        if self.outputs.is_empty() {
            return Err(ClientError::EmptyResult);
        }
        Ok(self.outputs.clone())
    }

    async fn cancel(&self, _job_id: &str) -> Result<(), ClientError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.fail_cancel {
            return Err(ClientError::Cancel("HTTP 409 Conflict: already running".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub fail: bool,
    pub keys: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Rejected("HTTP 403 Forbidden: ".into()));
        }
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("https://storage.example.com/{key}"))
    }
}
