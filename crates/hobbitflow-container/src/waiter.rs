//! ワークロード待機モジュール（固定間隔ポーリング）
//!
//! タスク／コンテナの状態を一定間隔で問い合わせ、終端状態になるまで待機します。
//! バックオフもジッターも入れない。タイムアウトは [`PollConfig::timeout`] で指定し、
//! `None` の場合は終端状態まで無制限に待つ。

use crate::error::{ContainerError, Result};
use crate::gateway::StatusSource;
use hobbitflow_core::{Normalized, PollTarget, ServiceHandle};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// ポーリング設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }
}

/// ワークロードが終端状態になるまで待機
///
/// # Returns
/// * `Ok(Normalized)` - 終端状態かつ成功
/// * `Err(WorkloadFailed)` - 終端状態だが失敗（詳細はエンジンの報告そのまま）
/// * `Err(Timeout)` - `timeout` を超過
pub async fn await_terminal<S>(
    source: &S,
    handle: &ServiceHandle,
    target: PollTarget,
    config: &PollConfig,
) -> Result<Normalized>
where
    S: StatusSource + ?Sized,
{
    let started = Instant::now();
    let mut attempt: u64 = 0;

    loop {
        sleep(config.interval).await;
        attempt += 1;

        let status = source.workload_status(handle).await?;
        let normalized = status.normalize(target);
        debug!(
            "poll #{} {} ({:?}): {:?}",
            attempt,
            handle.name(),
            target,
            normalized
        );

        if normalized.terminal {
            if normalized.success {
                return Ok(normalized);
            }
            return Err(ContainerError::WorkloadFailed {
                name: handle.name().to_string(),
                detail: normalized.detail,
            });
        }

        if let Some(timeout) = config.timeout
            && started.elapsed() >= timeout
        {
            return Err(ContainerError::Timeout {
                name: handle.name().to_string(),
                waited_secs: started.elapsed().as_secs(),
            });
        }
    }
}
