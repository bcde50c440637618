//! Periodic self-ping that keeps an idle hosted instance from being shut down

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// URL to request on every tick; no target disables the scheduler
    pub target_url: Option<String>,

    /// Seconds between pings
    pub interval_secs: u64,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            target_url: None,
            interval_secs: 14 * 60,
            timeout_seconds: 30,
            user_agent: "video-summarizer-ping-bot".to_string(),
        }
    }
}

/// Outcome of a single ping
#[derive(Debug, Clone, PartialEq)]
pub enum PingOutcome {
    Alive,
    UnexpectedStatus(u16),
    Failed(String),
}

/// Handle to a running keep-alive task
#[derive(Debug)]
pub struct KeepAliveHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl KeepAliveHandle {
    /// Stop the scheduler and wait for the task to exit
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            warn!("Keep-alive task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct KeepAlive;

impl KeepAlive {
    /// Spawn the ping loop. Returns `None` when no target is configured.
    pub fn start(config: &KeepAliveConfig) -> Result<Option<KeepAliveHandle>> {
        let Some(target) = config.target_url.clone() else {
            info!("Keep-alive disabled (no target URL configured)");
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        let period = Duration::from_secs(config.interval_secs.max(1));
        let (tx, mut rx) = oneshot::channel();

        info!("Keep-alive pinging {} every {}s", target, period.as_secs());

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the server is not up yet.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut rx => {
                        debug!("Keep-alive received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        ping(&client, &target).await;
                    }
                }
            }
        });

        Ok(Some(KeepAliveHandle {
            shutdown: Some(tx),
            task,
        }))
    }
}

/// Issue one ping and log the result
pub async fn ping(client: &reqwest::Client, target: &str) -> PingOutcome {
    match client.get(target).send().await {
        Ok(response) if response.status() == reqwest::StatusCode::OK => {
            info!("Successfully pinged {}", target);
            PingOutcome::Alive
        }
        Ok(response) => {
            let status = response.status().as_u16();
            warn!("Ping to {} failed with status code {}", target, status);
            PingOutcome::UnexpectedStatus(status)
        }
        Err(e) => {
            warn!("Error while pinging {}: {}", target, e);
            PingOutcome::Failed(e.to_string())
        }
    }
}
