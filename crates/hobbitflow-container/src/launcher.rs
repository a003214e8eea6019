//! サービスランチャー
//!
//! 記述子をそのままバックエンドへ投入する。準備完了の待機はしない（ポーラーの役割）。
//! リトライもしない。失敗はパイプラインの該当ステップをそのまま中断させる。

use crate::error::{ContainerError, Result};
use crate::gateway::ContainerGateway;
use hobbitflow_core::{ServiceHandle, WorkloadDescriptor};
use tracing::info;

pub async fn launch(
    gateway: &dyn ContainerGateway,
    descriptor: &WorkloadDescriptor,
) -> Result<ServiceHandle> {
    info!(
        "launching {} ({}) on {}",
        descriptor.name,
        descriptor.image,
        gateway.backend()
    );

    match gateway.start_workload(descriptor).await {
        Ok(handle) => {
            info!("launched {}", handle);
            Ok(handle)
        }
        Err(err @ ContainerError::LaunchFailed { .. }) => Err(err),
        Err(err) => Err(ContainerError::LaunchFailed {
            name: descriptor.name.clone(),
            message: err.to_string(),
        }),
    }
}
