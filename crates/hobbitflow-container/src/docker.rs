//! bollard を使ったゲートウェイ実装
//!
//! Swarm モードではサービス／タスク、単一ホストモードではコンテナを直接扱う。

// Bollard 0.19 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::auth::RegistryAuth;
use crate::converter;
use crate::error::{ContainerError, Result};
use crate::executor::encode_frame;
use crate::gateway::{ContainerGateway, OutputStream, StatusSource};
use crate::naming::split_image_tag;
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::models::{LocalNodeState, NetworkConnectRequest, NetworkCreateRequest, Task};
use futures_util::stream::{self, StreamExt};
use hobbitflow_build::{BuiltImage, ImageBuilder};
use hobbitflow_core::{
    BackendMode, ServiceHandle, VolumeRef, WorkloadDescriptor, WorkloadStatus,
};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct DockerGateway {
    docker: Docker,
    backend: BackendMode,
    auth: RegistryAuth,
}

impl DockerGateway {
    pub fn new(docker: Docker, backend: BackendMode) -> Self {
        Self {
            docker,
            backend,
            auth: RegistryAuth::new(),
        }
    }

    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// エンジンの Swarm 状態からバックエンドモードを判定
    pub async fn detect_backend(docker: &Docker) -> Result<BackendMode> {
        let info = docker.info().await?;
        let active = info
            .swarm
            .and_then(|s| s.local_node_state)
            .is_some_and(|state| state == LocalNodeState::ACTIVE);
        Ok(if active {
            BackendMode::Swarm
        } else {
            BackendMode::Single
        })
    }

    async fn list_service_tasks(&self, service: &str) -> Result<Vec<Task>> {
        let mut filters = HashMap::new();
        filters.insert("service".to_string(), vec![service.to_string()]);
        let options = bollard::query_parameters::ListTasksOptions {
            filters: Some(filters),
            ..Default::default()
        };
        Ok(self.docker.list_tasks(Some(options)).await?)
    }

    /// イメージをpull（HOBBIT レジストリは回答の認証情報を使う）
    async fn pull_image(&self, image: &str) -> Result<()> {
        let (image_name, tag) = split_image_tag(image);
        info!("pulling image {}", image);

        let options = bollard::image::CreateImageOptions {
            from_image: image_name,
            tag: tag.unwrap_or("latest"),
            ..Default::default()
        };
        let credentials = self.auth.credentials_for(image);
        let mut stream = self.docker.create_image(Some(options), None, credentials);

        while let Some(info) = stream.next().await {
            match info {
                Ok(bollard::models::CreateImageInfo {
                    status: Some(status),
                    ..
                }) => debug!("pull {}: {}", image, status),
                Ok(_) => {}
                Err(e) => {
                    return Err(ContainerError::ImagePullFailed {
                        image: image.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn start_container(&self, descriptor: &WorkloadDescriptor) -> Result<ServiceHandle> {
        let (config, options) = converter::to_container_config(descriptor);

        let response = match self
            .docker
            .create_container(Some(options.clone()), config.clone())
            .await
        {
            Ok(response) => response,
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                // イメージがない場合は一度だけpullして再作成
                self.pull_image(&descriptor.image).await?;
                self.docker
                    .create_container(Some(options), config)
                    .await
                    .map_err(|e| launch_failed(descriptor, e))?
            }
            Err(e) => return Err(launch_failed(descriptor, e)),
        };
        debug!("container created: {}", response.id);

        for network in descriptor.networks.iter().skip(1) {
            let request = NetworkConnectRequest {
                container: Some(response.id.clone()),
                ..Default::default()
            };
            self.docker
                .connect_network(network, request)
                .await
                .map_err(|e| launch_failed(descriptor, e))?;
        }

        self.docker
            .start_container(
                &response.id,
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(|e| launch_failed(descriptor, e))?;

        Ok(ServiceHandle::Container {
            id: response.id,
            name: descriptor.name.clone(),
        })
    }

    async fn start_service(&self, descriptor: &WorkloadDescriptor) -> Result<ServiceHandle> {
        let spec = converter::to_service_spec(descriptor);
        let credentials = self.auth.credentials_for(&descriptor.image);

        let response = self
            .docker
            .create_service(spec, credentials)
            .await
            .map_err(|e| launch_failed(descriptor, e))?;

        Ok(ServiceHandle::Service {
            id: response.id.unwrap_or_else(|| descriptor.name.clone()),
            name: descriptor.name.clone(),
        })
    }
}

fn launch_failed(descriptor: &WorkloadDescriptor, err: bollard::errors::Error) -> ContainerError {
    ContainerError::LaunchFailed {
        name: descriptor.name.clone(),
        message: err.to_string(),
    }
}

/// LogOutput をエンジンの多重化フレームに戻す
fn frame_log_output(output: LogOutput) -> bytes::Bytes {
    match output {
        LogOutput::StdIn { message } => encode_frame(0, &message),
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            encode_frame(1, &message)
        }
        LogOutput::StdErr { message } => encode_frame(2, &message),
    }
}

#[async_trait]
impl StatusSource for DockerGateway {
    async fn workload_status(&self, handle: &ServiceHandle) -> Result<WorkloadStatus> {
        match handle {
            ServiceHandle::Service { name, .. } => {
                let tasks = self.list_service_tasks(name).await?;
                let task = converter::latest_task(tasks);
                debug!("got task for {}: {:?}", name, task.as_ref().map(|t| &t.status));
                Ok(WorkloadStatus::Task(converter::task_status(task.as_ref())))
            }
            ServiceHandle::Container { id, name } => {
                let inspect = self
                    .docker
                    .inspect_container(id, None::<bollard::query_parameters::InspectContainerOptions>)
                    .await?;
                let state = inspect
                    .state
                    .ok_or_else(|| ContainerError::WorkloadNotFound { name: name.clone() })?;
                Ok(WorkloadStatus::Container(converter::container_status(&state)))
            }
        }
    }
}

/// 既存ネットワークとの名前衝突か
///
/// Swarm は 409、古いエンジンは 500 + "already exists" を返す。
fn network_exists(err: &bollard::errors::Error) -> bool {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 409, ..
        } => true,
        bollard::errors::Error::DockerResponseServerError { message, .. } => {
            message.contains("already exists")
        }
        _ => false,
    }
}

#[async_trait]
impl ContainerGateway for DockerGateway {
    fn backend(&self) -> BackendMode {
        self.backend
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        let request = NetworkCreateRequest {
            name: name.to_string(),
            driver: Some(
                if self.backend.is_clustered() {
                    "overlay"
                } else {
                    "bridge"
                }
                .to_string(),
            ),
            attachable: Some(self.backend.is_clustered()),
            ..Default::default()
        };

        match self.docker.create_network(request).await {
            Ok(_) => {
                info!("network created: {}", name);
                Ok(())
            }
            Err(e) if network_exists(&e) => {
                debug!("network already exists: {}", name);
                Ok(())
            }
            Err(e) => Err(ContainerError::NetworkFailed {
                network: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn create_volume(&self, name: &str) -> Result<VolumeRef> {
        let options = bollard::models::VolumeCreateOptions {
            name: Some(name.to_string()),
            ..Default::default()
        };
        let volume = self
            .docker
            .create_volume(options)
            .await
            .map_err(|e| ContainerError::VolumeFailed {
                volume: name.to_string(),
                message: e.to_string(),
            })?;

        debug!("volume created: {:?}", volume);
        Ok(VolumeRef {
            name: volume.name,
            id: volume.mountpoint,
        })
    }

    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        log_line: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<BuiltImage> {
        let builder = ImageBuilder::new(self.docker.clone());
        Ok(builder.build_image(context, tag, log_line).await?)
    }

    async fn start_workload(&self, descriptor: &WorkloadDescriptor) -> Result<ServiceHandle> {
        match self.backend {
            BackendMode::Swarm => self.start_service(descriptor).await,
            BackendMode::Single => self.start_container(descriptor).await,
        }
    }

    async fn exec_target(&self, handle: &ServiceHandle) -> Result<String> {
        match handle {
            ServiceHandle::Container { id, .. } => Ok(id.clone()),
            ServiceHandle::Service { name, .. } => {
                let tasks = self.list_service_tasks(name).await?;
                converter::latest_task(tasks)
                    .and_then(|t| t.status)
                    .and_then(|s| s.container_status)
                    .and_then(|c| c.container_id)
                    .ok_or_else(|| ContainerError::WorkloadNotFound { name: name.clone() })
            }
        }
    }

    async fn exec(&self, target: &str, command: &[String]) -> Result<OutputStream> {
        let exec_config = CreateExecOptions {
            cmd: Some(command.to_vec()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let message = self
            .docker
            .create_exec(target, exec_config)
            .await
            .map_err(|e| ContainerError::ExecFailed {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        let start_config = StartExecOptions {
            ..Default::default()
        };
        match self.docker.start_exec(&message.id, Some(start_config)).await? {
            StartExecResults::Attached { output, .. } => Ok(output
                .map(|item| item.map(frame_log_output).map_err(ContainerError::from))
                .boxed()),
            StartExecResults::Detached => Ok(stream::empty().boxed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::errors::Error;

    fn server_error(status_code: u16, message: &str) -> Error {
        Error::DockerResponseServerError {
            status_code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_network_exists_on_conflict() {
        assert!(network_exists(&server_error(
            409,
            "network with name hobbit already exists"
        )));
        assert!(network_exists(&server_error(409, "")));
    }

    #[test]
    fn test_network_exists_on_legacy_message() {
        assert!(network_exists(&server_error(
            500,
            "network with name hobbit-core already exists"
        )));
    }

    #[test]
    fn test_other_errors_are_not_existing_network() {
        assert!(!network_exists(&server_error(500, "permission denied")));
        assert!(!network_exists(&server_error(404, "plugin not found")));
        assert!(!network_exists(&Error::RequestTimeoutError));
    }
}
