//! WorkloadDescriptor から Docker API パラメータへの変換

use bollard::models::{
    ContainerCreateBody, ContainerStateStatusEnum, HostConfig, Mount, MountTypeEnum,
    NetworkAttachmentConfig, RestartPolicy as DockerRestartPolicy, RestartPolicyNameEnum,
    ServiceSpec, Task, TaskSpec, TaskSpecContainerSpec, TaskSpecRestartPolicy,
    TaskSpecRestartPolicyConditionEnum, TaskState as DockerTaskState,
};
use bollard::query_parameters::CreateContainerOptions;
use hobbitflow_core::{
    ContainerState, ContainerStatus, MountKind, RestartPolicy, TaskState, TaskStatus,
    WorkloadDescriptor,
};
use std::collections::HashMap;

/// 全ワークロードに付与するラベルを生成
pub fn descriptor_labels(descriptor: &WorkloadDescriptor) -> HashMap<String, String> {
    let mut labels: HashMap<String, String> = descriptor
        .labels
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    // docker compose 互換のグループ化
    labels.insert(
        "com.docker.compose.project".to_string(),
        descriptor.project.clone(),
    );
    labels.insert("hobbitflow.project".to_string(), descriptor.project.clone());
    labels.insert("hobbitflow.owner".to_string(), descriptor.owner.clone());
    labels.insert("hobbitflow.deployment".to_string(), descriptor.name.clone());
    labels
}

/// マウント定義を変換
pub fn to_mounts(descriptor: &WorkloadDescriptor) -> Vec<Mount> {
    descriptor
        .mounts
        .iter()
        .map(|m| Mount {
            typ: Some(match m.kind {
                MountKind::Volume => MountTypeEnum::VOLUME,
                MountKind::Bind => MountTypeEnum::BIND,
            }),
            source: Some(m.source.clone()),
            target: Some(m.target.clone()),
            ..Default::default()
        })
        .collect()
}

/// 単一ホスト用のコンテナ設定に変換
///
/// プライマリネットワーク（先頭）は `network_mode` で指定し、
/// 残りのネットワークは作成後に接続する。
pub fn to_container_config(
    descriptor: &WorkloadDescriptor,
) -> (ContainerCreateBody, CreateContainerOptions) {
    let restart_name = match descriptor.restart {
        RestartPolicy::Never => RestartPolicyNameEnum::NO,
        RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
        RestartPolicy::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
        RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
    };

    let host_config = HostConfig {
        mounts: Some(to_mounts(descriptor)),
        restart_policy: Some(DockerRestartPolicy {
            name: Some(restart_name),
            ..Default::default()
        }),
        network_mode: descriptor.networks.first().cloned(),
        ..Default::default()
    };

    let config = ContainerCreateBody {
        image: Some(descriptor.image.clone()),
        hostname: Some(descriptor.hostname.clone()),
        env: Some(descriptor.env.clone()),
        labels: Some(descriptor_labels(descriptor)),
        cmd: descriptor.command.clone(),
        host_config: Some(host_config),
        ..Default::default()
    };

    let options = CreateContainerOptions {
        name: Some(descriptor.name.clone()),
        ..Default::default()
    };

    (config, options)
}

/// Swarm 用のサービス定義に変換
pub fn to_service_spec(descriptor: &WorkloadDescriptor) -> ServiceSpec {
    let condition = match descriptor.restart {
        RestartPolicy::Never => TaskSpecRestartPolicyConditionEnum::NONE,
        RestartPolicy::OnFailure => TaskSpecRestartPolicyConditionEnum::ON_FAILURE,
        RestartPolicy::Always | RestartPolicy::UnlessStopped => {
            TaskSpecRestartPolicyConditionEnum::ANY
        }
    };

    let networks: Vec<NetworkAttachmentConfig> = descriptor
        .networks
        .iter()
        .map(|n| NetworkAttachmentConfig {
            target: Some(n.clone()),
            aliases: Some(vec![descriptor.hostname.clone()]),
            ..Default::default()
        })
        .collect();

    let labels = descriptor_labels(descriptor);

    ServiceSpec {
        name: Some(descriptor.name.clone()),
        labels: Some(labels.clone()),
        task_template: Some(TaskSpec {
            container_spec: Some(TaskSpecContainerSpec {
                image: Some(descriptor.image.clone()),
                hostname: Some(descriptor.hostname.clone()),
                env: Some(descriptor.env.clone()),
                labels: Some(labels),
                command: descriptor.command.clone(),
                mounts: Some(to_mounts(descriptor)),
                ..Default::default()
            }),
            restart_policy: Some(TaskSpecRestartPolicy {
                condition: Some(condition),
                ..Default::default()
            }),
            networks: Some(networks),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// タスク一覧から最新のものを選ぶ
pub fn latest_task(tasks: Vec<Task>) -> Option<Task> {
    tasks
        .into_iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
}

/// Swarm タスクの状態を変換（タスクがまだなければ pending）
pub fn task_status(task: Option<&Task>) -> TaskStatus {
    let Some(status) = task.and_then(|t| t.status.as_ref()) else {
        return TaskStatus {
            state: TaskState::Pending,
            message: None,
            error: None,
        };
    };

    let state = match status.state {
        Some(DockerTaskState::RUNNING) => TaskState::Running,
        Some(DockerTaskState::COMPLETE) => TaskState::Complete,
        Some(
            DockerTaskState::FAILED
            | DockerTaskState::REJECTED
            | DockerTaskState::SHUTDOWN
            | DockerTaskState::ORPHANED
            | DockerTaskState::REMOVE,
        ) => TaskState::Failed,
        Some(
            DockerTaskState::ASSIGNED
            | DockerTaskState::ACCEPTED
            | DockerTaskState::PREPARING
            | DockerTaskState::READY
            | DockerTaskState::STARTING,
        ) => TaskState::Assigned,
        _ => TaskState::Pending,
    };

    TaskStatus {
        state,
        message: status.message.clone(),
        error: status.err.clone(),
    }
}

/// コンテナの inspect 結果を変換
pub fn container_status(state: &bollard::models::ContainerState) -> ContainerStatus {
    let mapped = match state.status {
        Some(ContainerStateStatusEnum::RUNNING) => ContainerState::Running,
        Some(ContainerStateStatusEnum::EXITED | ContainerStateStatusEnum::DEAD) => {
            ContainerState::Exited
        }
        _ => ContainerState::Created,
    };

    ContainerStatus {
        state: mapped,
        exit_code: state.exit_code.unwrap_or_default(),
        error: state.error.clone().filter(|e| !e.is_empty()),
    }
}
