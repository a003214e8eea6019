//! ボリュームフィラー
//!
//! 設定バンドルから使い捨てイメージをビルドし、対象ボリュームをマウントして一度だけ実行する。
//! Keycloak / Virtuoso / Redis の 3 ストアで共通のルーチン。

use crate::error::{DeployError, Result};
use hobbitflow_build::ContextBuilder;
use hobbitflow_container::{
    ContainerError, ContainerGateway, PollConfig, await_terminal, launch, name_from_image,
};
use hobbitflow_core::platform::FILLER_MOUNT_TARGET;
use hobbitflow_core::{MountSpec, PollTarget, RestartPolicy, VolumeRef, WorkloadDescriptor};
use std::path::Path;
use tracing::{debug, info};

/// フィラー起動時のパラメータ
#[derive(Debug, Clone)]
pub struct FillerLaunch {
    pub project: String,
    pub owner: String,
}

/// バンドルの内容を `volume` にコピーする
///
/// フィラーが終了し成功を報告するまでブロックする。
pub async fn fill(
    gateway: &dyn ContainerGateway,
    bundle_path: &Path,
    tag: &str,
    volume: &VolumeRef,
    params: &FillerLaunch,
    poll: &PollConfig,
) -> Result<WorkloadDescriptor> {
    let build_failed = |message: String| DeployError::BuildFailed {
        tag: tag.to_string(),
        message,
    };

    let context =
        ContextBuilder::create_context(bundle_path).map_err(|e| build_failed(e.user_message()))?;

    let log_line = |line: &str| debug!("BUILD-LOG: {}", line);
    let built = gateway
        .build_image(context, tag, &log_line)
        .await
        .map_err(|e| build_failed(e.to_string()))?;
    debug!(
        "built volume fill image {} ({} log lines)",
        built.image,
        built.log.len()
    );

    let name = name_from_image(&built.image);
    let descriptor = WorkloadDescriptor::new(&built.image, &name, &params.project, &params.owner)
        .restart(RestartPolicy::Never)
        .mount(MountSpec::volume(&volume.name, FILLER_MOUNT_TARGET));

    let handle = launch(gateway, &descriptor).await?;
    debug!("started filler: {}", handle);

    match await_terminal(gateway, &handle, PollTarget::Completion, poll).await {
        Ok(_) => {
            info!("config volume {} filled by {}", volume.name, name);
            Ok(descriptor)
        }
        Err(ContainerError::WorkloadFailed { detail, .. }) => Err(DeployError::FillFailed {
            volume: volume.name.clone(),
            detail,
        }),
        Err(err) => Err(err.into()),
    }
}
