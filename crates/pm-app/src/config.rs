use std::env;
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, anyhow};
use pm_core::INITIAL_CREDITS;
use pm_runcomfy::{DEFAULT_API_URL, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, PollConfig, RunComfyConfig};
use crate::storage::StorageConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub runcomfy: RunComfyConfig,
    pub storage: StorageConfig,
    pub initial_credits: u64,
    pub poll: PollConfig,
}

impl AppConfig {
    /// Read `.env` if present, then the process environment
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&var, "PORT", DEFAULT_PORT)?;
        let timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?);

        let api_token = var("RUNCOMFY_API_TOKEN")
            .ok_or_else(|| anyhow!("RUNCOMFY_API_TOKEN must be set"))?;
        let runcomfy = RunComfyConfig {
            base_url: var("RUNCOMFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_token,
            timeout,
        };

        let endpoint = var("STORAGE_ENDPOINT")
            .ok_or_else(|| anyhow!("STORAGE_ENDPOINT must be set"))?;
        let storage = StorageConfig {
            public_url: var("STORAGE_PUBLIC_URL").unwrap_or_else(|| endpoint.clone()),
            endpoint,
            token: var("STORAGE_TOKEN"),
            timeout,
        };

        let poll = PollConfig {
            max_attempts: parse_or(&var, "POLL_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            interval: Duration::from_millis(parse_or(&var, "POLL_INTERVAL_MS", DEFAULT_INTERVAL.as_millis() as u64)?),
        };
        if poll.max_attempts == 0 {
            return Err(anyhow!("POLL_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            port,
            runcomfy,
            storage,
            initial_credits: parse_or(&var, "INITIAL_CREDITS", INITIAL_CREDITS)?,
            poll,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
